use crate::{Color, default_colors, keys};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// Untyped key/value data delivered with a push notification
pub type RawPayload = serde_json::Map<String, Value>;

/// A delivered notification as handed over by the platform
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, rename = "userInfo")]
    pub user_info: RawPayload,
}

impl NotificationContent {
    pub fn new(title: impl Into<String>, body: impl Into<String>, user_info: RawPayload) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            user_info,
        }
    }

    /// Build from a JSON value, which must be an object to carry any keys.
    pub fn with_json(title: impl Into<String>, body: impl Into<String>, user_info: Value) -> Self {
        let user_info = match user_info {
            Value::Object(map) => map,
            _ => RawPayload::new(),
        };
        Self::new(title, body, user_info)
    }

    pub fn expanded_title(&self) -> Option<&str> {
        string_field(&self.user_info, keys::EXPANDED_TITLE)
    }

    pub fn expanded_body(&self) -> Option<&str> {
        string_field(&self.user_info, keys::EXPANDED_BODY)
    }

    pub fn template_type(&self) -> Option<&str> {
        string_field(&self.user_info, keys::TEMPLATE_TYPE)
    }
}

/// Get a string field. Values of any other JSON type count as absent.
pub fn string_field<'a>(map: &'a RawPayload, key: &str) -> Option<&'a str> {
    match map.get(key)? {
        Value::String(s) => Some(s.as_str()),
        other => {
            tracing::debug!("Ignoring non-string value for {}: {}", key, other);
            None
        }
    }
}

/// Get an absolute URL field. Unparseable URLs count as absent.
pub fn url_field(map: &RawPayload, key: &str) -> Option<Url> {
    let raw = string_field(map, key)?;
    match Url::parse(raw) {
        Ok(url) => Some(url),
        Err(err) => {
            tracing::debug!("Ignoring invalid URL for {} ({:?}): {}", key, raw, err);
            None
        }
    }
}

/// Get a numeric field given either as a JSON number or a decimal string.
pub fn number_field(map: &RawPayload, key: &str) -> Option<f64> {
    let value = match map.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match value {
        Some(v) if v.is_finite() => Some(v),
        _ => {
            tracing::debug!("Ignoring invalid number for {}: {:?}", key, map.get(key));
            None
        }
    }
}

/// Get a hex color field, falling back to `default` when absent or malformed.
pub fn color_field(map: &RawPayload, key: &str, default: Color) -> Color {
    match string_field(map, key) {
        Some(hex) => Color::from_hex(hex).unwrap_or_else(|| {
            tracing::debug!("Ignoring invalid color for {}: {:?}", key, hex);
            default
        }),
        None => default,
    }
}

/// Fields shared by every template payload
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadBase {
    /// Title and body of the notification itself
    pub notification_title: String,
    pub notification_body: String,
    pub image_url: Option<Url>,
    pub click_url: Option<Url>,
    pub expanded_title: Option<String>,
    pub expanded_body: Option<String>,
    pub background_color: Color,
    pub title_color: Color,
    pub body_color: Color,
}

impl PayloadBase {
    /// Extract the common fields. Never fails, malformed values fall back to defaults.
    pub fn extract(content: &NotificationContent) -> Self {
        let info = &content.user_info;

        Self {
            notification_title: content.title.clone(),
            notification_body: content.body.clone(),
            image_url: url_field(info, keys::IMAGE_URL),
            click_url: url_field(info, keys::CLICK_URL),
            expanded_title: content.expanded_title().map(str::to_string),
            expanded_body: content.expanded_body().map(str::to_string),
            background_color: color_field(info, keys::BACKGROUND_COLOR, default_colors::BACKGROUND),
            title_color: color_field(info, keys::TITLE_COLOR, default_colors::TITLE),
            body_color: color_field(info, keys::BODY_COLOR, default_colors::BODY),
        }
    }

    /// Expanded title if present, otherwise the notification title
    pub fn display_title(&self) -> &str {
        self.expanded_title
            .as_deref()
            .unwrap_or(&self.notification_title)
    }
}
