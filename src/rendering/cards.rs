use crate::constants::*;
use aep_notification_util::{Color, DownloadedImage, PayloadBase, TitleBodyPayload};
use std::fmt::Write;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardColors {
    pub background: Color,
    pub title: Color,
    pub body: Color,
}

impl CardColors {
    pub fn from_base(base: &PayloadBase) -> Self {
        Self {
            background: base.background_color,
            title: base.title_color,
            body: base.body_color,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageIndicator {
    pub index: usize,
    pub count: usize,
    /// Paging arrows shown, the user drives the carousel
    pub controls: bool,
}

/// Everything one frame of the template shows
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub template: &'static str,
    pub title_body: TitleBodyPayload,
    /// `None` keeps the platform colors (fallback template)
    pub colors: Option<CardColors>,
    pub image: Option<String>,
    /// Countdown label and its color
    pub countdown: Option<(String, Color)>,
    pub page: Option<PageIndicator>,
    pub click_url: Option<Url>,
}

impl Card {
    pub fn new(template: &'static str, title_body: TitleBodyPayload) -> Self {
        Self {
            template,
            title_body,
            colors: None,
            image: None,
            countdown: None,
            page: None,
            click_url: None,
        }
    }
}

/// One line image summary, e.g. `512x256 https://www.adobe.com/hero.png`
pub fn image_summary(image: &DownloadedImage, url: &Url) -> String {
    format!("{} {}", image.dimensions(), truncate(url.as_str(), URL_DISPLAY_MAX))
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let kept: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}

/// Render a card as plain text
pub fn render_card(card: &Card) -> String {
    let mut out = String::new();
    let rule = "-".repeat(CARD_WIDTH);

    // Writing to a String cannot fail
    let _ = writeln!(out, "+{}+", rule);
    let _ = writeln!(out, "[{}]", card.template);
    if let Some(image) = &card.image {
        let _ = writeln!(out, "image: {}", image);
    }
    if let Some((label, color)) = &card.countdown {
        let _ = writeln!(out, "timer: {} ({})", label, color.to_hex());
    }
    let _ = writeln!(out, "{}", truncate(&card.title_body.title, TITLE_MAX_LENGTH));
    if let Some(body) = &card.title_body.body {
        for line in body.lines() {
            let _ = writeln!(out, "  {}", line);
        }
    }
    if let Some(page) = &card.page {
        let dots: String = (0..page.count)
            .map(|i| if i == page.index { '*' } else { '.' })
            .collect();
        let _ = write!(out, "page {}/{} {}", page.index + 1, page.count, dots);
        if page.controls {
            let _ = write!(out, "  < p | n >");
        }
        out.push('\n');
    }
    if let Some(colors) = &card.colors {
        let _ = writeln!(
            out,
            "colors: bg {} title {} body {}",
            colors.background.to_hex(),
            colors.title.to_hex(),
            colors.body.to_hex()
        );
    }
    if let Some(url) = &card.click_url {
        let _ = writeln!(out, "open: {}", truncate(url.as_str(), URL_DISPLAY_MAX));
    }
    let _ = write!(out, "+{}+", rule);
    out
}
