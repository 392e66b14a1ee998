use std::fmt;

/// Template kinds selected by `adb_template_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateType {
    Basic,
    Carousel,
    Timer,
}

impl TemplateType {
    pub fn from_key(value: &str) -> Option<Self> {
        match value {
            crate::keys::template_type::BASIC => Some(Self::Basic),
            crate::keys::template_type::CAROUSEL => Some(Self::Carousel),
            crate::keys::template_type::TIMER => Some(Self::Timer),
            _ => None,
        }
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateType::Basic => write!(f, "basic"),
            TemplateType::Carousel => write!(f, "carousel"),
            TemplateType::Timer => write!(f, "timer"),
        }
    }
}

/// Why a rich template could not be built. Every variant means "show the fallback template".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("notification has no template type")]
    MissingTemplateType,
    #[error("unknown template type: {0}")]
    UnknownTemplate(String),
    #[error("{template} template is missing required data: {reason}")]
    MissingRequiredData {
        template: TemplateType,
        reason: &'static str,
    },
}

impl PayloadError {
    pub(crate) fn missing(template: TemplateType, reason: &'static str) -> Self {
        Self::MissingRequiredData { template, reason }
    }
}
