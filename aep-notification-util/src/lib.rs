//! Parsing and state for Adobe Experience Platform rich push templates.
//!
//! A delivered notification carries its template in `userInfo`. [`TemplatePayload`]
//! picks the basic, carousel or timer template and validates it; anything it
//! rejects is shown with the plain [`TemplatePayload::fallback`] content.

pub mod basic;
pub mod carousel;
pub mod color;
pub mod error;
pub mod keys;
pub mod link;
pub mod payload;
pub mod schedule;
pub mod template;
pub mod timer;
pub mod title_body;

#[cfg(feature = "image")]
pub mod fetch;
#[cfg(feature = "image")]
pub mod image;

pub use basic::BasicPayload;
pub use carousel::{
    CarouselItem, CarouselLayout, CarouselMode, CarouselNavigator, CarouselPayload, ResolvedCarousel,
    ResolvedCarouselItem,
};
pub use color::{Color, default_colors};
pub use error::{PayloadError, TemplateType};
pub use link::{is_safe_url, open_link};
pub use payload::{NotificationContent, PayloadBase, RawPayload};
pub use schedule::{Clock, Fired, JobId, ManualClock, Scheduler, SystemClock, VirtualScheduler, epoch_seconds};
pub use template::TemplatePayload;
pub use timer::{Countdown, CountdownEvent, CountdownPhase, DisplayData, TimerPayload, format_countdown};
pub use title_body::TitleBodyPayload;

#[cfg(feature = "image")]
pub use self::image::DownloadedImage;
#[cfg(feature = "image")]
pub use fetch::{FetchError, FetchResults, ImageSource, fetch_images};
#[cfg(feature = "http")]
pub use fetch::HttpImageSource;
