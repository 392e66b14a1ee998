use serde::{Deserialize, Serialize};

/// Title and body pair shown by every template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleBodyPayload {
    pub title: String,
    /// `None` hides the body line, an empty string keeps it
    pub body: Option<String>,
}

impl TitleBodyPayload {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: Some(body.into()),
        }
    }

    pub fn title_only(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: None,
        }
    }

    pub fn body_or_empty(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}
