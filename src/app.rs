// Template controller
// ===================
//
// One notification is shown at a time. Everything that changes the display
// (scheduler fires, finished image batches, stdin commands, shutdown) arrives
// as a `Message` on a single channel and is applied by `update`, so the
// payload state is only ever touched from the controller loop.
//
// Each rebuild of the display bumps `generation`. Image batches carry the
// generation that requested them and late batches from an earlier display
// are dropped instead of cancelled.

use crate::constants::*;
use crate::handlers::{Command, Message};
use crate::rendering::{Card, CardColors, PageIndicator, cards::image_summary, render_card};
use crate::subscriptions::{images, input, ticks::TokioScheduler};
use aep_notification_config::NotificationContentConfig;
use aep_notification_util::{
    BasicPayload, CarouselNavigator, Clock, Countdown, CountdownEvent, DisplayData,
    DownloadedImage, FetchResults, HttpImageSource, ImageSource, JobId, NotificationContent,
    ResolvedCarousel, Scheduler, SystemClock, TemplatePayload, TimerPayload, TitleBodyPayload,
    open_link,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;

/// What the controller loop does after a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// The card changed and must be printed again
    Redraw,
    Idle,
    Exit,
}

type CarouselImages = ResolvedCarousel<Option<(Url, DownloadedImage)>>;

enum Display {
    /// Waiting for the image batch of the current generation
    Loading,
    Fallback(TitleBodyPayload),
    Basic {
        payload: BasicPayload,
        image: Option<DownloadedImage>,
    },
    Carousel {
        carousel: CarouselImages,
        navigator: CarouselNavigator,
    },
    Timer {
        data: DisplayData,
        image: Option<DownloadedImage>,
        countdown: Option<Countdown>,
        label: Option<String>,
    },
}

pub struct ContentController<S, T> {
    config: NotificationContentConfig,
    content: NotificationContent,
    payload: Option<TemplatePayload>,
    display: Display,
    generation: u64,
    source: Arc<S>,
    scheduler: T,
    clock: Arc<dyn Clock>,
    tx: mpsc::Sender<Message>,
}

impl<S, T> ContentController<S, T>
where
    S: ImageSource + Send + Sync + 'static,
    T: Scheduler,
{
    /// Parse the notification. A payload error selects the fallback template.
    pub fn new(
        config: NotificationContentConfig,
        content: NotificationContent,
        reference_time: f64,
        source: Arc<S>,
        scheduler: T,
        clock: Arc<dyn Clock>,
        tx: mpsc::Sender<Message>,
    ) -> Self {
        let payload = match TemplatePayload::from_content(&content, reference_time, &config.policy) {
            Ok(payload) => {
                tracing::info!("Showing {} template", payload.template_type());
                Some(payload)
            }
            Err(e) => {
                tracing::warn!("Showing fallback template: {}", e);
                None
            }
        };

        Self {
            config,
            content,
            payload,
            display: Display::Loading,
            generation: 0,
            source,
            scheduler,
            clock,
            tx,
        }
    }

    /// Build the first display
    pub fn init(&mut self) {
        self.rebuild();
    }

    pub fn update(&mut self, message: Message) -> Flow {
        match message {
            Message::Fired(job) => self.on_fire(job),
            Message::ImagesLoaded {
                generation,
                results,
            } => {
                if generation != self.generation {
                    tracing::debug!(
                        "Ignoring stale image batch {} (showing {})",
                        generation,
                        self.generation
                    );
                    return Flow::Idle;
                }
                self.on_images(results);
                if matches!(self.display, Display::Loading) {
                    Flow::Idle
                } else {
                    Flow::Redraw
                }
            }
            Message::Command(command) => self.on_command(command),
            Message::InputClosed | Message::Shutdown => {
                self.teardown();
                Flow::Exit
            }
        }
    }

    /// The current card, `None` while images are loading
    pub fn view(&self) -> Option<Card> {
        let base = self.payload.as_ref().map(|p| CardColors::from_base(p.base()));

        let card = match &self.display {
            Display::Loading => return None,
            Display::Fallback(title_body) => Card::new("fallback", title_body.clone()),
            Display::Basic { payload, image } => {
                let mut card = Card::new("basic", payload.title_body());
                card.image = image
                    .as_ref()
                    .zip(payload.image_url())
                    .map(|(image, url)| image_summary(image, url));
                card.click_url = payload.base.click_url.clone();
                card
            }
            Display::Carousel {
                carousel,
                navigator,
            } => {
                let index = navigator.index();
                let current = &carousel.items[index];
                let mut card = Card::new("carousel", current.item.title_body.clone());
                card.image = current
                    .image
                    .as_ref()
                    .map(|(url, image)| image_summary(image, url));
                card.page = Some(PageIndicator {
                    index,
                    count: navigator.count(),
                    controls: navigator.shows_controls(),
                });
                card.click_url = carousel.click_url(index).cloned();
                card
            }
            Display::Timer {
                data,
                image,
                label,
                ..
            } => {
                let mut card = Card::new("timer", data.title_body.clone());
                card.image = image
                    .as_ref()
                    .zip(data.image_url.as_ref())
                    .map(|(image, url)| image_summary(image, url));
                if let (Some(label), Some(TemplatePayload::Timer(timer))) = (label, &self.payload) {
                    card.countdown = Some((label.clone(), timer.timer_color));
                }
                card.click_url = self.payload.as_ref().and_then(|p| p.click_url().cloned());
                card
            }
        };

        Some(Card {
            colors: if matches!(self.display, Display::Fallback(_)) {
                None
            } else {
                base
            },
            ..card
        })
    }

    /// Tear the current display down and build it again from the payload.
    fn rebuild(&mut self) {
        self.teardown();
        self.generation += 1;

        let Some(payload) = self.payload.clone() else {
            self.display = Display::Fallback(TemplatePayload::fallback(&self.content));
            return;
        };

        match payload {
            TemplatePayload::Basic(basic) => match basic.image_url().cloned() {
                Some(url) if self.config.show_images => {
                    self.request_images(vec![url]);
                    self.display = Display::Loading;
                }
                _ => {
                    self.display = Display::Basic {
                        payload: basic,
                        image: None,
                    };
                }
            },
            TemplatePayload::Carousel(carousel) => {
                if self.config.show_images {
                    self.request_images(carousel.image_urls().into_iter().cloned().collect());
                    self.display = Display::Loading;
                } else {
                    self.on_images(FetchResults::new());
                }
            }
            TemplatePayload::Timer(timer) => {
                let data = timer.active_display_data(self.clock.now());
                match &data.image_url {
                    Some(url) if self.config.show_images => {
                        self.request_images(vec![url.clone()]);
                        self.display = Display::Loading;
                    }
                    _ => self.show_timer(&timer, None),
                }
            }
        }
    }

    fn request_images(&self, urls: Vec<Url>) {
        images::spawn_fetch(
            self.source.clone(),
            urls,
            self.config.max_image_size,
            self.generation,
            self.tx.clone(),
        );
    }

    fn on_images(&mut self, mut results: FetchResults) {
        let Some(payload) = self.payload.clone() else {
            return;
        };

        match payload {
            TemplatePayload::Basic(basic) => {
                let image = basic.image_url().and_then(|url| take_image(&mut results, url));
                self.display = Display::Basic {
                    payload: basic,
                    image,
                };
            }
            TemplatePayload::Carousel(carousel) => {
                let show_images = self.config.show_images;
                let resolved = carousel.resolve(|url| {
                    if !show_images {
                        return Some(None);
                    }
                    results
                        .get(url.as_str())
                        .and_then(|r| r.as_ref().ok())
                        .map(|image| Some((url.clone(), image.clone())))
                });

                match resolved {
                    Some(resolved) => {
                        if resolved.len() < carousel.items.len() {
                            tracing::info!(
                                "Dropped {} carousel item(s) without image",
                                carousel.items.len() - resolved.len()
                            );
                        }
                        let mut navigator = resolved.navigator(Duration::from_millis(
                            self.config.carousel_interval_ms,
                        ));
                        navigator.start(&mut self.scheduler);
                        self.display = Display::Carousel {
                            carousel: resolved,
                            navigator,
                        };
                    }
                    None => {
                        tracing::warn!("No carousel image could be loaded, showing fallback template");
                        self.display = Display::Fallback(TemplatePayload::fallback(&self.content));
                    }
                }
            }
            TemplatePayload::Timer(timer) => {
                let data = timer.active_display_data(self.clock.now());
                if let Some(url) = &data.image_url {
                    // Expired while the pre-expiry image was loading
                    if self.config.show_images && !results.contains_key(url.as_str()) {
                        tracing::debug!("Timer display changed while loading, fetching {}", url);
                        self.rebuild();
                        return;
                    }
                }
                let image = data.image_url.as_ref().and_then(|url| take_image(&mut results, url));
                self.show_timer(&timer, image);
            }
        }
    }

    fn show_timer(&mut self, timer: &TimerPayload, image: Option<DownloadedImage>) {
        let now = self.clock.now();
        let data = timer.active_display_data(now);

        let (countdown, label) = if data.show_timer {
            let mut countdown =
                timer.countdown(Duration::from_millis(self.config.countdown_tick_ms));
            match countdown.start(now, &mut self.scheduler) {
                Some(CountdownEvent::Tick { label, .. }) => (Some(countdown), Some(label)),
                Some(CountdownEvent::Expired) | None => (None, None),
            }
        } else {
            (None, None)
        };

        self.display = Display::Timer {
            data,
            image,
            countdown,
            label,
        };
    }

    fn on_fire(&mut self, job: JobId) -> Flow {
        let now = self.clock.now();
        match &mut self.display {
            Display::Carousel { navigator, .. } => match navigator.on_fire(job) {
                Some(index) => {
                    tracing::trace!("Carousel advanced to page {}", index);
                    Flow::Redraw
                }
                None => Flow::Idle,
            },
            Display::Timer {
                countdown: Some(countdown),
                label,
                ..
            } => match countdown.on_fire(job, now, &mut self.scheduler) {
                Some(CountdownEvent::Tick { label: next, .. }) => {
                    *label = Some(next);
                    Flow::Redraw
                }
                Some(CountdownEvent::Expired) => {
                    tracing::info!("Timer expired, showing alternate content");
                    self.rebuild();
                    Flow::Redraw
                }
                None => Flow::Idle,
            },
            _ => Flow::Idle,
        }
    }

    fn on_command(&mut self, command: Command) -> Flow {
        match command {
            Command::Next | Command::Previous => {
                let Display::Carousel { navigator, .. } = &mut self.display else {
                    tracing::debug!("{:?} ignored, no carousel is shown", command);
                    return Flow::Idle;
                };
                if !navigator.shows_controls() {
                    tracing::debug!("{:?} ignored, carousel pages by itself", command);
                    return Flow::Idle;
                }
                let before = navigator.index();
                let after = if command == Command::Next {
                    navigator.next()
                } else {
                    navigator.previous()
                };
                if before == after {
                    Flow::Idle
                } else {
                    Flow::Redraw
                }
            }
            Command::Open => {
                match self.view().and_then(|card| card.click_url) {
                    Some(url) => {
                        if let Err(e) = open_link(&url) {
                            tracing::warn!("Failed to open {}: {}", url, e);
                        }
                    }
                    None => tracing::info!("Nothing to open"),
                }
                Flow::Idle
            }
            Command::Quit => {
                self.teardown();
                Flow::Exit
            }
        }
    }

    fn teardown(&mut self) {
        match &mut self.display {
            Display::Carousel { navigator, .. } => navigator.stop(&mut self.scheduler),
            Display::Timer {
                countdown: Some(countdown),
                ..
            } => countdown.cancel(&mut self.scheduler),
            _ => {}
        }
    }

    #[cfg(test)]
    fn scheduler_mut(&mut self) -> &mut T {
        &mut self.scheduler
    }
}

fn take_image(results: &mut FetchResults, url: &Url) -> Option<DownloadedImage> {
    match results.remove(url.as_str())? {
        Ok(image) => Some(image),
        Err(e) => {
            tracing::warn!("Showing template without image {}: {}", url, e);
            None
        }
    }
}

/// Show `content` until Ctrl-C, end of stdin, or `run_for` elapses.
pub async fn run(
    config: NotificationContentConfig,
    content: NotificationContent,
    reference_time: f64,
    run_for: Option<Duration>,
) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    let source = Arc::new(HttpImageSource::new(Duration::from_millis(
        config.fetch_timeout_ms,
    ))?);
    let scheduler = TokioScheduler::new(tx.clone());

    let mut controller = ContentController::new(
        config,
        content,
        reference_time,
        source,
        scheduler,
        Arc::new(SystemClock),
        tx.clone(),
    );

    input::spawn_stdin(tx.clone());

    let shutdown_tx = tx.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Interrupted"),
            Err(e) => tracing::error!("Failed to listen for Ctrl-C: {}", e),
        }
        let _ = shutdown_tx.send(Message::Shutdown).await;
    });

    if let Some(run_for) = run_for {
        let timeout_tx = tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(run_for).await;
            tracing::info!("Run time of {:?} elapsed", run_for);
            let _ = timeout_tx.send(Message::Shutdown).await;
        });
    }
    drop(tx);

    controller.init();
    print_card(&controller);

    while let Some(message) = rx.recv().await {
        tracing::trace!("Message: {:?}", message);
        match controller.update(message) {
            Flow::Redraw => print_card(&controller),
            Flow::Idle => {}
            Flow::Exit => break,
        }
    }

    Ok(())
}

fn print_card<S, T>(controller: &ContentController<S, T>)
where
    S: ImageSource + Send + Sync + 'static,
    T: Scheduler,
{
    if let Some(card) = controller.view() {
        println!("{}", render_card(&card));
    }
}
