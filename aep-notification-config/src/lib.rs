use std::path::{Path, PathBuf};

pub const ID: &str = "com.adobe.AEPNotificationContent";

/// Environment variable prefix for overrides, nested keys are separated by `__`.
pub const ENV_PREFIX: &str = "AEP_NOTIFICATION";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Source(#[from] config::ConfigError),
    #[error("config path is not valid UTF-8: {0:?}")]
    InvalidPath(PathBuf),
}

/// What the basic template shows as body when `adb_body_ex` is absent.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyFallback {
    /// Use the notification's own body text.
    #[default]
    NotificationBody,
    /// Leave the body empty.
    Empty,
}

/// Which payload fields are mandatory.
///
/// The defaults are the permissive behavior. Older payload producers relied on a
/// stricter contract, available through [`PayloadPolicy::legacy`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PayloadPolicy {
    /// Fail the basic template when `adb_media` is missing or invalid.
    pub require_basic_image: bool,
    /// Fail the timer template when `adb_title_alt` is missing.
    pub require_timer_alternate_title: bool,
    /// Fail the timer template when `adb_media_alt` is missing or invalid.
    pub require_timer_alternate_image: bool,
    pub basic_body_fallback: BodyFallback,
}

impl PayloadPolicy {
    pub const fn legacy() -> Self {
        Self {
            require_basic_image: true,
            require_timer_alternate_title: true,
            require_timer_alternate_image: true,
            basic_body_fallback: BodyFallback::Empty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NotificationContentConfig {
    #[serde(default)]
    pub policy: PayloadPolicy,
    /// Auto-advance period of an auto carousel, in milliseconds.
    #[serde(default = "default_carousel_interval_ms")]
    pub carousel_interval_ms: u64,
    /// Countdown refresh period of the timer template, in milliseconds.
    #[serde(default = "default_countdown_tick_ms")]
    pub countdown_tick_ms: u64,
    /// Whether images are downloaded and displayed at all (default: true)
    #[serde(default = "default_true")]
    pub show_images: bool,
    /// Maximum width/height for decoded images in pixels (default: 512)
    #[serde(default = "default_max_image_size")]
    pub max_image_size: u32,
    /// Per-request image download timeout, in milliseconds.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

impl Default for NotificationContentConfig {
    fn default() -> Self {
        Self {
            policy: PayloadPolicy::default(),
            carousel_interval_ms: default_carousel_interval_ms(),
            countdown_tick_ms: default_countdown_tick_ms(),
            show_images: default_true(),
            max_image_size: default_max_image_size(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

impl NotificationContentConfig {
    /// Load the configuration from defaults, a config file and the environment.
    ///
    /// Without an explicit `path` the file is looked up in the user config
    /// directory and may be missing. An explicit `path` must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env_prefix(path, ENV_PREFIX)
    }

    fn load_with_env_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => {
                let default_path = config_dir().join("config");
                let name = default_path
                    .to_str()
                    .ok_or_else(|| ConfigError::InvalidPath(default_path.clone()))?
                    .to_string();
                config::File::with_name(&name).required(false)
            }
        };

        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize::<Self>()?)
    }
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(ID)
}

// Default value helpers for serde
const fn default_true() -> bool {
    true
}

const fn default_carousel_interval_ms() -> u64 {
    5000
}

const fn default_countdown_tick_ms() -> u64 {
    1000
}

const fn default_max_image_size() -> u32 {
    512
}

const fn default_fetch_timeout_ms() -> u64 {
    10_000
}
