use crate::{
    BasicPayload, CarouselPayload, NotificationContent, PayloadBase, PayloadError, TemplateType,
    TimerPayload, TitleBodyPayload,
};
use aep_notification_config::PayloadPolicy;
use url::Url;

/// A successfully parsed rich template
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePayload {
    Basic(BasicPayload),
    Carousel(CarouselPayload),
    Timer(TimerPayload),
}

impl TemplatePayload {
    /// Pick the template named by `adb_template_type` and parse it.
    ///
    /// `reference_time` is the delivery time in epoch seconds, used by the timer.
    /// Any error means the caller shows [`TemplatePayload::fallback`].
    pub fn from_content(
        content: &NotificationContent,
        reference_time: f64,
        policy: &PayloadPolicy,
    ) -> Result<Self, PayloadError> {
        let raw_type = content
            .template_type()
            .ok_or(PayloadError::MissingTemplateType)?;
        let template = TemplateType::from_key(raw_type)
            .ok_or_else(|| PayloadError::UnknownTemplate(raw_type.to_string()))?;

        let payload = match template {
            TemplateType::Basic => Self::Basic(BasicPayload::from_content(content, policy)?),
            TemplateType::Carousel => Self::Carousel(CarouselPayload::from_content(content)?),
            TemplateType::Timer => {
                Self::Timer(TimerPayload::from_content(content, reference_time, policy)?)
            }
        };
        tracing::debug!("Parsed {} template", template);
        Ok(payload)
    }

    /// Plain title and body used when no rich template can be shown
    pub fn fallback(content: &NotificationContent) -> TitleBodyPayload {
        if content.body.is_empty() {
            TitleBodyPayload::title_only(content.title.clone())
        } else {
            TitleBodyPayload::new(content.title.clone(), content.body.clone())
        }
    }

    pub fn template_type(&self) -> TemplateType {
        match self {
            Self::Basic(_) => TemplateType::Basic,
            Self::Carousel(_) => TemplateType::Carousel,
            Self::Timer(_) => TemplateType::Timer,
        }
    }

    pub fn base(&self) -> &PayloadBase {
        match self {
            Self::Basic(p) => &p.base,
            Self::Carousel(p) => &p.base,
            Self::Timer(p) => &p.base,
        }
    }

    /// Payload-level click-through target. The carousel overrides it per page.
    pub fn click_url(&self) -> Option<&Url> {
        self.base().click_url.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(user_info: serde_json::Value) -> Result<TemplatePayload, PayloadError> {
        TemplatePayload::from_content(
            &NotificationContent::with_json("Title", "Body", user_info),
            0.0,
            &PayloadPolicy::default(),
        )
    }

    #[test]
    fn test_missing_template_type() {
        assert_eq!(parse(json!({})).unwrap_err(), PayloadError::MissingTemplateType);
        assert_eq!(
            parse(json!({ "adb_template_type": 1 })).unwrap_err(),
            PayloadError::MissingTemplateType
        );
    }

    #[test]
    fn test_unknown_template_type() {
        assert_eq!(
            parse(json!({ "adb_template_type": "poll" })).unwrap_err(),
            PayloadError::UnknownTemplate("poll".to_string())
        );
    }

    #[test]
    fn test_selects_each_template() {
        let basic = parse(json!({ "adb_template_type": "basic" })).unwrap();
        assert_eq!(basic.template_type(), TemplateType::Basic);

        let carousel = parse(json!({
            "adb_template_type": "car",
            "adb_items": [ { "img": "https://www.adobe.com/1.png" } ]
        }))
        .unwrap();
        assert_eq!(carousel.template_type(), TemplateType::Carousel);

        let timer = parse(json!({ "adb_template_type": "timer", "adb_tmr_dur": 5 })).unwrap();
        assert_eq!(timer.template_type(), TemplateType::Timer);
    }

    #[test]
    fn test_constructor_failure_is_returned() {
        let err = parse(json!({ "adb_template_type": "timer" })).unwrap_err();
        assert!(matches!(
            err,
            PayloadError::MissingRequiredData {
                template: TemplateType::Timer,
                ..
            }
        ));
    }

    #[test]
    fn test_click_url() {
        let payload = parse(json!({
            "adb_template_type": "basic",
            "adb_uri": "https://www.adobe.com/offer"
        }))
        .unwrap();
        assert_eq!(payload.click_url().unwrap().path(), "/offer");
        assert_eq!(payload.base().notification_title, "Title");
    }

    #[test]
    fn test_fallback() {
        let content = NotificationContent::with_json("Title", "Body", json!({}));
        assert_eq!(TemplatePayload::fallback(&content), TitleBodyPayload::new("Title", "Body"));

        let content = NotificationContent::with_json("Title", "", json!({}));
        assert_eq!(TemplatePayload::fallback(&content).body, None);
    }
}
