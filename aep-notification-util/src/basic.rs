use crate::{NotificationContent, PayloadBase, PayloadError, TemplateType, TitleBodyPayload};
use aep_notification_config::{BodyFallback, PayloadPolicy};
use url::Url;

/// Single image template
#[derive(Debug, Clone, PartialEq)]
pub struct BasicPayload {
    pub base: PayloadBase,
    body_fallback: BodyFallback,
}

impl BasicPayload {
    /// Build the basic payload.
    ///
    /// With the default policy this never fails, an absent image just means
    /// nothing is downloaded. `require_basic_image` restores the older
    /// behavior of failing without a valid `adb_media`.
    pub fn from_content(
        content: &NotificationContent,
        policy: &PayloadPolicy,
    ) -> Result<Self, PayloadError> {
        let base = PayloadBase::extract(content);
        if policy.require_basic_image && base.image_url.is_none() {
            return Err(PayloadError::missing(TemplateType::Basic, "no valid image URL"));
        }

        Ok(Self {
            base,
            body_fallback: policy.basic_body_fallback,
        })
    }

    pub fn image_url(&self) -> Option<&Url> {
        self.base.image_url.as_ref()
    }

    pub fn title_body(&self) -> TitleBodyPayload {
        let body = match (&self.base.expanded_body, self.body_fallback) {
            (Some(body), _) => body.clone(),
            (None, BodyFallback::NotificationBody) => self.base.notification_body.clone(),
            (None, BodyFallback::Empty) => String::new(),
        };
        TitleBodyPayload::new(self.base.display_title(), body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content(user_info: serde_json::Value) -> NotificationContent {
        NotificationContent::with_json("Title", "Body", user_info)
    }

    #[test]
    fn test_basic_without_image_succeeds() {
        let payload = BasicPayload::from_content(&content(json!({})), &PayloadPolicy::default())
            .unwrap();
        assert_eq!(payload.image_url(), None);
    }

    #[test]
    fn test_basic_with_invalid_image_succeeds() {
        let payload = BasicPayload::from_content(
            &content(json!({ "adb_media": "" })),
            &PayloadPolicy::default(),
        )
        .unwrap();
        assert_eq!(payload.image_url(), None);
    }

    #[test]
    fn test_legacy_policy_requires_image() {
        let policy = PayloadPolicy::legacy();

        let err = BasicPayload::from_content(&content(json!({})), &policy).unwrap_err();
        assert_eq!(
            err,
            PayloadError::missing(TemplateType::Basic, "no valid image URL")
        );

        let ok = BasicPayload::from_content(
            &content(json!({ "adb_media": "https://www.adobe.com/image.png" })),
            &policy,
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn test_title_body_prefers_expanded_values() {
        let payload = BasicPayload::from_content(
            &content(json!({ "adb_title_ex": "Big title", "adb_body_ex": "Big body" })),
            &PayloadPolicy::default(),
        )
        .unwrap();

        assert_eq!(payload.title_body(), TitleBodyPayload::new("Big title", "Big body"));
    }

    #[test]
    fn test_title_body_falls_back_to_notification_body() {
        let payload =
            BasicPayload::from_content(&content(json!({})), &PayloadPolicy::default()).unwrap();

        assert_eq!(payload.title_body(), TitleBodyPayload::new("Title", "Body"));
    }

    #[test]
    fn test_title_body_empty_fallback() {
        let policy = PayloadPolicy {
            basic_body_fallback: BodyFallback::Empty,
            ..PayloadPolicy::default()
        };
        let payload = BasicPayload::from_content(&content(json!({})), &policy).unwrap();

        assert_eq!(payload.title_body(), TitleBodyPayload::new("Title", ""));
    }

    #[test]
    fn test_empty_expanded_body_is_not_replaced() {
        let payload = BasicPayload::from_content(
            &content(json!({ "adb_body_ex": "" })),
            &PayloadPolicy::default(),
        )
        .unwrap();

        assert_eq!(payload.title_body().body, Some(String::new()));
    }
}
