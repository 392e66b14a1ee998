use once_cell::sync::Lazy;
use regex::Regex;

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$").unwrap());

/// RGBA color (values 0.0-1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parse a hex color string.
    ///
    /// Accepts an optional leading `#` followed by exactly 6 (`RRGGBB`) or
    /// 8 (`RRGGBBAA`) hex digits. Surrounding whitespace is ignored. Six digit
    /// colors are fully opaque.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !HEX_COLOR.is_match(digits) {
            return None;
        }

        let value = u32::from_str_radix(digits, 16).ok()?;
        let channel = |shift: u32| ((value >> shift) & 0xFF) as f32 / 255.0;

        Some(if digits.len() == 8 {
            Self::new(channel(24), channel(16), channel(8), channel(0))
        } else {
            Self::rgb(channel(16), channel(8), channel(0))
        })
    }

    /// Format as `#RRGGBBAA`.
    pub fn to_hex(&self) -> String {
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02X}{:02X}{:02X}{:02X}",
            byte(self.r),
            byte(self.g),
            byte(self.b),
            byte(self.a)
        )
    }
}

/// Colors used when a payload omits a color or carries an unparseable one
pub mod default_colors {
    use super::Color;

    /// Card background - white
    pub const BACKGROUND: Color = Color::rgb(1.0, 1.0, 1.0);

    /// Title text - black
    pub const TITLE: Color = Color::rgb(0.0, 0.0, 0.0);

    /// Secondary (body) text - dark gray
    pub const BODY: Color = Color::rgb(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0);

    /// Countdown label, same as the title text
    pub const TIMER: Color = TITLE;
}
