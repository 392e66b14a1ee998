use crate::payload::{string_field, url_field};
use crate::schedule::{JobId, Scheduler};
use crate::{NotificationContent, PayloadBase, PayloadError, TemplateType, TitleBodyPayload, keys};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// How the carousel pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CarouselMode {
    /// User-driven paging with arrows
    Manual,
    /// Timer-driven paging with wraparound
    #[default]
    Auto,
}

impl CarouselMode {
    pub fn from_key(value: &str) -> Option<Self> {
        match value {
            "manual" => Some(Self::Manual),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CarouselLayout {
    Filmstrip,
    #[default]
    Default,
}

impl CarouselLayout {
    pub fn from_key(value: &str) -> Option<Self> {
        match value {
            "filmstrip" => Some(Self::Filmstrip),
            "default" => Some(Self::Default),
            _ => None,
        }
    }
}

/// One parsed `adb_items` entry
#[derive(Debug, Clone, PartialEq)]
pub struct CarouselItem {
    pub image_url: Url,
    pub click_url: Option<Url>,
    pub title_body: TitleBodyPayload,
}

impl CarouselItem {
    /// Parse an item. Returns `None` when `img` is missing, empty or not a valid URL.
    ///
    /// Every item shares the notification's (expanded) title. The body is the
    /// item's `txt`, or the plain notification body when the item has none.
    pub fn from_raw(
        item: &Value,
        notification_title: &str,
        notification_body: &str,
        expanded_title: Option<&str>,
    ) -> Option<Self> {
        let Value::Object(map) = item else {
            tracing::debug!("Carousel item is not a dictionary: {}", item);
            return None;
        };

        let image_url = url_field(map, keys::carousel::IMAGE)?;
        let click_url = url_field(map, keys::carousel::URI);
        let body = string_field(map, keys::carousel::TEXT).unwrap_or(notification_body);
        let title = expanded_title.unwrap_or(notification_title);

        Some(Self {
            image_url,
            click_url,
            title_body: TitleBodyPayload::new(title, body),
        })
    }
}

/// Carousel template
#[derive(Debug, Clone, PartialEq)]
pub struct CarouselPayload {
    pub base: PayloadBase,
    pub mode: CarouselMode,
    pub layout: CarouselLayout,
    /// Display order, same as the payload order minus invalid entries
    pub items: Vec<CarouselItem>,
}

impl CarouselPayload {
    /// Build the carousel payload.
    ///
    /// Fails when `adb_items` is absent, not a list, or holds no valid item.
    /// Invalid items are dropped silently.
    pub fn from_content(content: &NotificationContent) -> Result<Self, PayloadError> {
        let info = &content.user_info;

        let mode = string_field(info, keys::carousel::MODE)
            .and_then(CarouselMode::from_key)
            .unwrap_or_default();
        let layout = string_field(info, keys::carousel::LAYOUT)
            .and_then(CarouselLayout::from_key)
            .unwrap_or_default();

        let Some(Value::Array(raw_items)) = info.get(keys::carousel::ITEMS) else {
            return Err(PayloadError::missing(TemplateType::Carousel, "no item list"));
        };

        let expanded_title = content.expanded_title();
        let items: Vec<CarouselItem> = raw_items
            .iter()
            .filter_map(|item| {
                CarouselItem::from_raw(item, &content.title, &content.body, expanded_title)
            })
            .collect();

        if items.len() < raw_items.len() {
            tracing::debug!(
                "Dropped {} invalid carousel item(s)",
                raw_items.len() - items.len()
            );
        }
        if items.is_empty() {
            return Err(PayloadError::missing(TemplateType::Carousel, "no valid items"));
        }

        Ok(Self {
            base: PayloadBase::extract(content),
            mode,
            layout,
            items,
        })
    }

    pub fn image_urls(&self) -> Vec<&Url> {
        self.items.iter().map(|i| &i.image_url).collect()
    }

    /// Attach downloaded images, keeping only items whose image resolved.
    ///
    /// Returns `None` when no item is left.
    pub fn resolve<I>(
        &self,
        mut image_for: impl FnMut(&Url) -> Option<I>,
    ) -> Option<ResolvedCarousel<I>> {
        let items: Vec<_> = self
            .items
            .iter()
            .filter_map(|item| {
                image_for(&item.image_url).map(|image| ResolvedCarouselItem {
                    item: item.clone(),
                    image,
                })
            })
            .collect();

        if items.is_empty() {
            return None;
        }

        Some(ResolvedCarousel {
            mode: self.mode,
            layout: self.layout,
            items,
        })
    }
}

/// A carousel item together with its downloaded image
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCarouselItem<I> {
    pub item: CarouselItem,
    pub image: I,
}

/// Carousel ready for display, never empty
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCarousel<I> {
    pub mode: CarouselMode,
    pub layout: CarouselLayout,
    pub items: Vec<ResolvedCarouselItem<I>>,
}

impl<I> ResolvedCarousel<I> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Click-through target of the page at `index`
    pub fn click_url(&self, index: usize) -> Option<&Url> {
        self.items.get(index)?.item.click_url.as_ref()
    }

    pub fn navigator(&self, interval: Duration) -> CarouselNavigator {
        CarouselNavigator::new(self.mode, self.len(), interval)
    }
}

/// Current page of a carousel and its auto-advance job
#[derive(Debug, Clone)]
pub struct CarouselNavigator {
    mode: CarouselMode,
    count: usize,
    index: usize,
    interval: Duration,
    job: Option<JobId>,
}

impl CarouselNavigator {
    pub fn new(mode: CarouselMode, count: usize, interval: Duration) -> Self {
        Self {
            mode,
            count,
            index: 0,
            interval,
            job: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_auto_advancing(&self) -> bool {
        self.job.is_some()
    }

    /// Whether paging arrows are shown
    pub fn shows_controls(&self) -> bool {
        self.mode == CarouselMode::Manual && self.count > 1
    }

    /// Move right, stopping at the last page
    pub fn next(&mut self) -> usize {
        self.index = (self.index + 1).min(self.count.saturating_sub(1));
        self.index
    }

    /// Move left, stopping at the first page
    pub fn previous(&mut self) -> usize {
        self.index = self.index.saturating_sub(1);
        self.index
    }

    pub fn select(&mut self, index: usize) -> usize {
        self.index = index.min(self.count.saturating_sub(1));
        self.index
    }

    /// Move right, wrapping to the first page after the last
    pub fn advance_wrapping(&mut self) -> usize {
        if self.count > 0 {
            self.index = (self.index + 1) % self.count;
        }
        self.index
    }

    /// Arm auto-advance when the carousel is in auto mode with more than one page.
    pub fn start(&mut self, scheduler: &mut impl Scheduler) {
        if self.job.is_none() && self.mode == CarouselMode::Auto && self.count > 1 {
            self.job = Some(scheduler.every(self.interval));
        }
    }

    pub fn stop(&mut self, scheduler: &mut impl Scheduler) {
        if let Some(job) = self.job.take() {
            scheduler.cancel(job);
        }
    }

    /// Handle a scheduler fire. Returns the new page for the armed job, `None` for anything else.
    pub fn on_fire(&mut self, job: JobId) -> Option<usize> {
        (self.job == Some(job)).then(|| self.advance_wrapping())
    }
}
