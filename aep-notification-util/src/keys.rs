//! Raw payload keys understood by the templates.
//!
//! All keys are case-sensitive and live in the notification's `userInfo` map.

pub const TEMPLATE_TYPE: &str = "adb_template_type";

pub const IMAGE_URL: &str = "adb_media";
pub const CLICK_URL: &str = "adb_uri";
pub const EXPANDED_TITLE: &str = "adb_title_ex";
pub const EXPANDED_BODY: &str = "adb_body_ex";

pub const BACKGROUND_COLOR: &str = "adb_clr_bg";
pub const TITLE_COLOR: &str = "adb_clr_title";
pub const BODY_COLOR: &str = "adb_clr_body";

pub mod template_type {
    pub const BASIC: &str = "basic";
    pub const CAROUSEL: &str = "car";
    pub const TIMER: &str = "timer";
}

pub mod carousel {
    pub const MODE: &str = "adb_car_mode";
    pub const LAYOUT: &str = "adb_car_layout";
    pub const ITEMS: &str = "adb_items";

    /// Keys inside a single `adb_items` entry
    pub const IMAGE: &str = "img";
    pub const TEXT: &str = "txt";
    pub const URI: &str = "uri";
}

pub mod timer {
    pub const COLOR: &str = "adb_clr_tmr";
    pub const DURATION: &str = "adb_tmr_dur";
    pub const END_TIMESTAMP: &str = "adb_tmr_end";
    pub const ALTERNATE_TITLE: &str = "adb_title_alt";
    /// Alternate body keys, in lookup order
    pub const ALTERNATE_BODY: [&str; 2] = ["adb_body_ex_alt", "adb_body_alt"];
    pub const ALTERNATE_IMAGE: &str = "adb_media_alt";
}
