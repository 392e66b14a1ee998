//! Time sources and repeating callbacks.
//!
//! The countdown and the carousel never sleep themselves. They arm repeating
//! jobs on a [`Scheduler`] and react to fires handed back by the caller, so the
//! same state machines run on a tokio runtime and on [`VirtualScheduler`] in tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Identifies a repeating job armed on a [`Scheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl JobId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Arms repeating callbacks. Fires are delivered out of band, back to whoever owns the state machine.
pub trait Scheduler {
    /// Fire every `period`, first fire one period from now.
    fn every(&mut self, period: Duration) -> JobId;
    /// Stop a job. Unknown or already cancelled jobs are ignored.
    fn cancel(&mut self, job: JobId);
}

/// A fire produced by [`VirtualScheduler::pop_due`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub job: JobId,
    /// Virtual time elapsed since the scheduler was created
    pub at: Duration,
}

#[derive(Debug, Clone)]
struct VirtualJob {
    id: JobId,
    period: Duration,
    next_due: Duration,
}

/// Deterministic scheduler driven by explicit virtual time
#[derive(Debug, Default)]
pub struct VirtualScheduler {
    elapsed: Duration,
    next_id: u64,
    jobs: Vec<VirtualJob>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_armed(&self, job: JobId) -> bool {
        self.jobs.iter().any(|j| j.id == job)
    }

    pub fn armed_count(&self) -> usize {
        self.jobs.len()
    }

    /// Pop the earliest fire due at or before `until`, advancing virtual time to it.
    ///
    /// Returns `None` once nothing else is due, leaving virtual time at `until`.
    /// Jobs cancelled between calls never fire again.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired> {
        let Some(job) = self
            .jobs
            .iter_mut()
            .filter(|j| j.next_due <= until)
            .min_by_key(|j| (j.next_due, j.id))
        else {
            self.elapsed = self.elapsed.max(until);
            return None;
        };

        let fired = Fired {
            job: job.id,
            at: job.next_due,
        };
        job.next_due += job.period;
        self.elapsed = fired.at;
        Some(fired)
    }
}

impl Scheduler for VirtualScheduler {
    fn every(&mut self, period: Duration) -> JobId {
        let id = JobId(self.next_id);
        self.next_id += 1;
        let period = period.max(Duration::from_millis(1));
        self.jobs.push(VirtualJob {
            id,
            period,
            next_due: self.elapsed + period,
        });
        id
    }

    fn cancel(&mut self, job: JobId) {
        self.jobs.retain(|j| j.id != job);
    }
}

/// Wall-clock source, in seconds since the Unix epoch
pub trait Clock: Send + Sync {
    fn now(&self) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        epoch_seconds(SystemTime::now())
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
    pub fn new(now: f64) -> Self {
        Self(AtomicU64::new(now.to_bits()))
    }

    pub fn set(&self, now: f64) {
        self.0.store(now.to_bits(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.set(self.now() + by.as_secs_f64());
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::SeqCst))
    }
}

/// Seconds since the Unix epoch, negative for earlier times
pub fn epoch_seconds(time: SystemTime) -> f64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    }
}
