use crate::payload::{color_field, number_field, string_field, url_field};
use crate::schedule::{JobId, Scheduler};
use crate::{NotificationContent, PayloadBase, PayloadError, TemplateType, TitleBodyPayload};
use crate::{Color, default_colors, keys};
use aep_notification_config::PayloadPolicy;
use std::time::Duration;
use url::Url;

/// What the timer template shows at a given moment
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayData {
    pub image_url: Option<Url>,
    pub title_body: TitleBodyPayload,
    pub show_timer: bool,
}

/// Countdown template that switches to alternate content once expired
#[derive(Debug, Clone, PartialEq)]
pub struct TimerPayload {
    pub base: PayloadBase,
    pub alternate_title: Option<String>,
    pub alternate_body: Option<String>,
    pub alternate_image_url: Option<Url>,
    pub timer_color: Color,
    /// Seconds since the Unix epoch, fixed at construction
    pub expiry_time: f64,
}

impl TimerPayload {
    /// Build the timer payload.
    ///
    /// `reference_time` is the delivery time of the notification in epoch
    /// seconds. A duration (`adb_tmr_dur`) counts from it and wins over an
    /// absolute end (`adb_tmr_end`). Without either the template fails.
    pub fn from_content(
        content: &NotificationContent,
        reference_time: f64,
        policy: &PayloadPolicy,
    ) -> Result<Self, PayloadError> {
        let info = &content.user_info;

        let expiry_time = match number_field(info, keys::timer::DURATION) {
            Some(duration) => reference_time + duration,
            None => number_field(info, keys::timer::END_TIMESTAMP)
                .ok_or(PayloadError::missing(TemplateType::Timer, "no expiry time"))?,
        };

        let alternate_title = string_field(info, keys::timer::ALTERNATE_TITLE).map(str::to_string);
        let alternate_body = keys::timer::ALTERNATE_BODY
            .iter()
            .find_map(|key| string_field(info, key))
            .map(str::to_string);
        let alternate_image_url = url_field(info, keys::timer::ALTERNATE_IMAGE);

        if policy.require_timer_alternate_title && alternate_title.is_none() {
            return Err(PayloadError::missing(TemplateType::Timer, "no alternate title"));
        }
        if policy.require_timer_alternate_image && alternate_image_url.is_none() {
            return Err(PayloadError::missing(TemplateType::Timer, "no alternate image URL"));
        }

        Ok(Self {
            base: PayloadBase::extract(content),
            alternate_title,
            alternate_body,
            alternate_image_url,
            timer_color: color_field(info, keys::timer::COLOR, default_colors::TIMER),
            expiry_time,
        })
    }

    /// Seconds left until expiry, negative once passed
    pub fn remaining(&self, now: f64) -> f64 {
        self.expiry_time - now
    }

    pub fn is_expired(&self, now: f64) -> bool {
        self.remaining(now) <= 0.0
    }

    /// Title and body while counting down
    pub fn title_body(&self) -> TitleBodyPayload {
        TitleBodyPayload::new(
            self.base.display_title(),
            self.base.expanded_body.clone().unwrap_or_default(),
        )
    }

    /// Title and body after expiry
    pub fn alt_title_body(&self) -> TitleBodyPayload {
        TitleBodyPayload::new(
            self.alternate_title
                .as_deref()
                .unwrap_or(&self.base.notification_title),
            self.alternate_body.clone().unwrap_or_default(),
        )
    }

    pub fn active_display_data(&self, now: f64) -> DisplayData {
        if self.is_expired(now) {
            DisplayData {
                image_url: self
                    .alternate_image_url
                    .clone()
                    .or_else(|| self.base.image_url.clone()),
                title_body: self.alt_title_body(),
                show_timer: false,
            }
        } else {
            DisplayData {
                image_url: self.base.image_url.clone(),
                title_body: self.title_body(),
                show_timer: true,
            }
        }
    }

    pub fn countdown(&self, tick: Duration) -> Countdown {
        Countdown::new(self.expiry_time, tick)
    }
}

/// Format a remaining duration as `HH:MM:SS`, `MM:SS` or `SS`, truncating to whole seconds.
pub fn format_countdown(remaining: f64) -> String {
    let total = if remaining > 0.0 { remaining.floor() as u64 } else { 0 };
    let hours = total / 3600;
    let minutes = total / 60 % 60;
    let seconds = total % 60;

    if hours >= 1 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else if minutes >= 1 {
        format!("{:02}:{:02}", minutes, seconds)
    } else {
        format!("{:02}", seconds)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CountdownEvent {
    /// Still counting, the label needs refreshing
    Tick { remaining: f64, label: String },
    /// Crossed zero. Rebuild with the post-expiry display data, no more ticks follow.
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownPhase {
    Idle,
    Counting,
    Expired,
}

/// Live countdown of a timer payload
#[derive(Debug, Clone)]
pub struct Countdown {
    expiry_time: f64,
    tick: Duration,
    phase: CountdownPhase,
    job: Option<JobId>,
}

impl Countdown {
    pub fn new(expiry_time: f64, tick: Duration) -> Self {
        Self {
            expiry_time,
            tick,
            phase: CountdownPhase::Idle,
            job: None,
        }
    }

    pub fn phase(&self) -> CountdownPhase {
        self.phase
    }

    /// Show the first label and arm the tick job, or report expiry right away.
    ///
    /// Only the first call does anything. Later calls return `None`, so expiry
    /// is reported once whichever of `start` or `on_fire` sees it.
    pub fn start(&mut self, now: f64, scheduler: &mut impl Scheduler) -> Option<CountdownEvent> {
        if self.phase != CountdownPhase::Idle {
            return None;
        }
        self.phase = CountdownPhase::Counting;
        let event = self.evaluate(now, scheduler)?;
        if self.phase == CountdownPhase::Counting {
            self.job = Some(scheduler.every(self.tick));
        }
        Some(event)
    }

    /// Handle a scheduler fire. Fires of other or cancelled jobs yield `None`.
    pub fn on_fire(
        &mut self,
        job: JobId,
        now: f64,
        scheduler: &mut impl Scheduler,
    ) -> Option<CountdownEvent> {
        if self.job != Some(job) {
            return None;
        }
        self.evaluate(now, scheduler)
    }

    /// Stop ticking without expiring, e.g. when the display is torn down.
    pub fn cancel(&mut self, scheduler: &mut impl Scheduler) {
        if let Some(job) = self.job.take() {
            scheduler.cancel(job);
        }
    }

    fn evaluate(&mut self, now: f64, scheduler: &mut impl Scheduler) -> Option<CountdownEvent> {
        match self.phase {
            CountdownPhase::Expired => None,
            CountdownPhase::Idle | CountdownPhase::Counting => {
                let remaining = self.expiry_time - now;
                if remaining <= 0.0 {
                    self.phase = CountdownPhase::Expired;
                    self.cancel(scheduler);
                    Some(CountdownEvent::Expired)
                } else {
                    Some(CountdownEvent::Tick {
                        remaining,
                        label: format_countdown(remaining),
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::VirtualScheduler;
    use serde_json::json;

    const T0: f64 = 1_700_000_000.0;

    fn content(user_info: serde_json::Value) -> NotificationContent {
        NotificationContent::with_json("Title", "Body", user_info)
    }

    fn timer(user_info: serde_json::Value) -> TimerPayload {
        TimerPayload::from_content(&content(user_info), T0, &PayloadPolicy::default()).unwrap()
    }

    #[test]
    fn test_expiry_from_duration() {
        let payload = timer(json!({ "adb_tmr_dur": "10" }));
        assert_eq!(payload.expiry_time, T0 + 10.0);
    }

    #[test]
    fn test_expiry_from_numeric_duration() {
        let payload = timer(json!({ "adb_tmr_dur": 90 }));
        assert_eq!(payload.expiry_time, T0 + 90.0);
    }

    #[test]
    fn test_expiry_from_end_timestamp() {
        let payload = timer(json!({ "adb_tmr_end": "1712417524" }));
        assert_eq!(payload.expiry_time, 1712417524.0);
    }

    #[test]
    fn test_duration_wins_over_end_timestamp() {
        let payload = timer(json!({ "adb_tmr_dur": "10", "adb_tmr_end": "1712417524" }));
        assert_eq!(payload.expiry_time, T0 + 10.0);
    }

    #[test]
    fn test_invalid_duration_falls_back_to_end_timestamp() {
        let payload = timer(json!({ "adb_tmr_dur": "ten", "adb_tmr_end": 1712417524 }));
        assert_eq!(payload.expiry_time, 1712417524.0);
    }

    #[test]
    fn test_missing_expiry_fails() {
        let result = TimerPayload::from_content(
            &content(json!({ "adb_title_alt": "alt", "adb_media_alt": "https://a/b.png" })),
            T0,
            &PayloadPolicy::default(),
        );
        assert_eq!(
            result.unwrap_err(),
            PayloadError::missing(TemplateType::Timer, "no expiry time")
        );
    }

    #[test]
    fn test_alternates_are_optional_by_default() {
        let payload = timer(json!({ "adb_tmr_dur": "10" }));

        assert_eq!(payload.alternate_title, None);
        assert_eq!(payload.alternate_body, None);
        assert_eq!(payload.alternate_image_url, None);
        assert_eq!(payload.alt_title_body(), TitleBodyPayload::new("Title", ""));
    }

    #[test]
    fn test_alternate_fields() {
        let payload = timer(json!({
            "adb_tmr_dur": "10",
            "adb_title_alt": "alternate title",
            "adb_body_ex_alt": "alternate body",
            "adb_media_alt": "https://www.adobe.com/image1.jpg",
            "adb_clr_tmr": "#FF0000",
        }));

        assert_eq!(payload.alternate_title.as_deref(), Some("alternate title"));
        assert_eq!(payload.alternate_body.as_deref(), Some("alternate body"));
        assert_eq!(
            payload.alternate_image_url.as_ref().map(Url::as_str),
            Some("https://www.adobe.com/image1.jpg")
        );
        assert_eq!(payload.timer_color, Color::rgb(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_alternate_body_short_key() {
        let payload = timer(json!({ "adb_tmr_dur": "10", "adb_body_alt": "short key" }));
        assert_eq!(payload.alternate_body.as_deref(), Some("short key"));
    }

    #[test]
    fn test_legacy_policy_requires_alternates() {
        let policy = PayloadPolicy::legacy();
        let full = json!({
            "adb_tmr_dur": "10",
            "adb_title_alt": "alternate title",
            "adb_media_alt": "https://www.adobe.com/image1.jpg",
        });
        assert!(TimerPayload::from_content(&content(full), T0, &policy).is_ok());

        let no_image = json!({ "adb_tmr_dur": "10", "adb_title_alt": "alternate title" });
        assert_eq!(
            TimerPayload::from_content(&content(no_image), T0, &policy).unwrap_err(),
            PayloadError::missing(TemplateType::Timer, "no alternate image URL")
        );

        let no_title = json!({ "adb_tmr_dur": "10", "adb_media_alt": "https://a/b.png" });
        assert_eq!(
            TimerPayload::from_content(&content(no_title), T0, &policy).unwrap_err(),
            PayloadError::missing(TemplateType::Timer, "no alternate title")
        );
    }

    #[test]
    fn test_default_timer_color() {
        let payload = timer(json!({ "adb_tmr_dur": "10", "adb_clr_tmr": "red" }));
        assert_eq!(payload.timer_color, default_colors::TIMER);
    }

    #[test]
    fn test_active_display_data_switches_at_expiry() {
        let payload = timer(json!({
            "adb_tmr_dur": "10",
            "adb_media": "https://www.adobe.com/image0.jpg",
            "adb_title_ex": "Hurry",
            "adb_body_ex": "Sale ends soon",
            "adb_title_alt": "Too late",
            "adb_media_alt": "https://www.adobe.com/image1.jpg",
        }));
        let expiry = payload.expiry_time;

        let before = payload.active_display_data(expiry - 1.0);
        assert!(before.show_timer);
        assert_eq!(before.title_body, TitleBodyPayload::new("Hurry", "Sale ends soon"));
        assert_eq!(before.image_url.unwrap().path(), "/image0.jpg");

        let at = payload.active_display_data(expiry);
        assert!(!at.show_timer);

        let after = payload.active_display_data(expiry + 1.0);
        assert!(!after.show_timer);
        assert_eq!(after.title_body, TitleBodyPayload::new("Too late", ""));
        assert_eq!(after.image_url.unwrap().path(), "/image1.jpg");
    }

    #[test]
    fn test_expired_image_falls_back_to_primary() {
        let payload = timer(json!({
            "adb_tmr_dur": "10",
            "adb_media": "https://www.adobe.com/image0.jpg",
        }));

        let after = payload.active_display_data(payload.expiry_time + 1.0);
        assert_eq!(after.image_url.unwrap().path(), "/image0.jpg");
    }

    #[test]
    fn test_pre_expiry_body_defaults_to_empty() {
        let payload = timer(json!({ "adb_tmr_dur": "10" }));
        assert_eq!(payload.title_body(), TitleBodyPayload::new("Title", ""));
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(3661.0), "01:01:01");
        assert_eq!(format_countdown(65.0), "01:05");
        assert_eq!(format_countdown(5.0), "05");
        assert_eq!(format_countdown(5.9), "05");
        assert_eq!(format_countdown(0.4), "00");
        assert_eq!(format_countdown(59.99), "59");
        assert_eq!(format_countdown(60.0), "01:00");
        assert_eq!(format_countdown(3600.0), "01:00:00");
        assert_eq!(format_countdown(100.0 * 3600.0), "100:00:00");
        assert_eq!(format_countdown(-3.0), "00");
    }

    #[test]
    fn test_countdown_ticks_then_expires_once() {
        let mut sched = VirtualScheduler::new();
        let mut countdown = Countdown::new(T0 + 3.0, Duration::from_secs(1));

        let first = countdown.start(T0, &mut sched);
        assert_eq!(
            first,
            Some(CountdownEvent::Tick {
                remaining: 3.0,
                label: "03".to_string()
            })
        );

        let mut events = vec![];
        while let Some(fired) = sched.pop_due(Duration::from_secs(10)) {
            let now = T0 + fired.at.as_secs_f64();
            if let Some(event) = countdown.on_fire(fired.job, now, &mut sched) {
                events.push(event);
            }
        }

        let labels: Vec<_> = events
            .iter()
            .map(|e| match e {
                CountdownEvent::Tick { label, .. } => label.as_str(),
                CountdownEvent::Expired => "expired",
            })
            .collect();
        assert_eq!(labels, vec!["02", "01", "expired"]);
        assert_eq!(countdown.phase(), CountdownPhase::Expired);
        assert_eq!(sched.armed_count(), 0);
    }

    #[test]
    fn test_countdown_start_after_expiry() {
        let mut sched = VirtualScheduler::new();
        let mut countdown = Countdown::new(T0, Duration::from_secs(1));

        assert_eq!(countdown.start(T0 + 5.0, &mut sched), Some(CountdownEvent::Expired));
        assert_eq!(countdown.phase(), CountdownPhase::Expired);
        assert_eq!(sched.armed_count(), 0);
    }

    #[test]
    fn test_countdown_expiry_reported_once_across_restarts() {
        let mut sched = VirtualScheduler::new();
        let mut countdown = Countdown::new(T0, Duration::from_secs(1));

        assert_eq!(countdown.start(T0 + 5.0, &mut sched), Some(CountdownEvent::Expired));
        assert_eq!(countdown.start(T0 + 6.0, &mut sched), None);
        assert_eq!(countdown.phase(), CountdownPhase::Expired);
        assert_eq!(sched.armed_count(), 0);
    }

    #[test]
    fn test_countdown_second_start_keeps_one_job() {
        let mut sched = VirtualScheduler::new();
        let mut countdown = Countdown::new(T0 + 2.0, Duration::from_secs(1));

        assert!(countdown.start(T0, &mut sched).is_some());
        assert_eq!(countdown.start(T0 + 0.5, &mut sched), None);
        assert_eq!(sched.armed_count(), 1);

        let mut expired = 0;
        while let Some(fired) = sched.pop_due(Duration::from_secs(5)) {
            let now = T0 + fired.at.as_secs_f64();
            if let Some(CountdownEvent::Expired) = countdown.on_fire(fired.job, now, &mut sched) {
                expired += 1;
            }
        }
        assert_eq!(expired, 1);
        assert_eq!(countdown.start(T0 + 3.0, &mut sched), None);
    }

    #[test]
    fn test_countdown_ignores_late_and_foreign_fires() {
        let mut sched = VirtualScheduler::new();
        let mut countdown = Countdown::new(T0 + 1.5, Duration::from_secs(1));
        countdown.start(T0, &mut sched);

        assert_eq!(countdown.on_fire(JobId::from_raw(42), T0 + 1.0, &mut sched), None);

        let fired = sched.pop_due(Duration::from_secs(2)).unwrap();
        assert!(matches!(
            countdown.on_fire(fired.job, T0 + 1.0, &mut sched),
            Some(CountdownEvent::Tick { .. })
        ));

        let fired = sched.pop_due(Duration::from_secs(2)).unwrap();
        assert_eq!(
            countdown.on_fire(fired.job, T0 + 2.0, &mut sched),
            Some(CountdownEvent::Expired)
        );

        // A fire already queued by a real timer before cancellation
        assert_eq!(countdown.on_fire(fired.job, T0 + 3.0, &mut sched), None);
    }

    #[test]
    fn test_countdown_cancel() {
        let mut sched = VirtualScheduler::new();
        let mut countdown = Countdown::new(T0 + 10.0, Duration::from_secs(1));
        countdown.start(T0, &mut sched);
        assert_eq!(sched.armed_count(), 1);

        countdown.cancel(&mut sched);
        assert_eq!(sched.armed_count(), 0);
        assert_eq!(countdown.phase(), CountdownPhase::Counting);
    }
}
