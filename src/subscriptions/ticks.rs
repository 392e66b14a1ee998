//! Scheduler backed by tokio timers.
//!
//! Every job is a task ticking a [`tokio::time::Interval`] and posting
//! [`Message::Fired`] to the controller's channel. Cancelling aborts the task.

use crate::handlers::Message;
use aep_notification_util::{JobId, Scheduler};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

pub struct TokioScheduler {
    tx: mpsc::Sender<Message>,
    next_id: u64,
    jobs: HashMap<JobId, JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new(tx: mpsc::Sender<Message>) -> Self {
        Self {
            tx,
            next_id: 0,
            jobs: HashMap::new(),
        }
    }
}

impl Scheduler for TokioScheduler {
    fn every(&mut self, period: Duration) -> JobId {
        let job = JobId::from_raw(self.next_id);
        self.next_id += 1;

        let period = period.max(Duration::from_millis(1));
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(Message::Fired(job)).await.is_err() {
                    break;
                }
            }
        });

        tracing::trace!("Armed job {} every {:?}", job.raw(), period);
        self.jobs.insert(job, handle);
        job
    }

    fn cancel(&mut self, job: JobId) {
        if let Some(handle) = self.jobs.remove(&job) {
            handle.abort();
            tracing::trace!("Cancelled job {}", job.raw());
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.jobs.drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_job_fires_every_period() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut sched = TokioScheduler::new(tx);
        let start = Instant::now();
        let job = sched.every(Duration::from_secs(1));

        for expected in 1..=3 {
            match rx.recv().await {
                Some(Message::Fired(fired)) => assert_eq!(fired, job),
                other => panic!("unexpected message: {:?}", other),
            }
            assert_eq!(start.elapsed().as_secs(), expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_job_stops_firing() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut sched = TokioScheduler::new(tx);
        let job = sched.every(Duration::from_secs(1));

        assert!(matches!(rx.recv().await, Some(Message::Fired(j)) if j == job));
        sched.cancel(job);

        let next = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(next.is_err(), "no fire expected after cancel");
    }

    #[tokio::test(start_paused = true)]
    async fn test_jobs_are_independent() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut sched = TokioScheduler::new(tx);
        let slow = sched.every(Duration::from_secs(3));
        let fast = sched.every(Duration::from_secs(1));
        assert_ne!(slow, fast);

        let mut fired = vec![];
        for _ in 0..4 {
            if let Some(Message::Fired(job)) = rx.recv().await {
                fired.push(job);
            }
        }
        assert_eq!(fired.iter().filter(|j| **j == fast).count(), 3);
        assert_eq!(fired.iter().filter(|j| **j == slow).count(), 1);
    }
}
