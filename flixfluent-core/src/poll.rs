//! Cancellable periodic polling
//!
//! Pull-based media backends have no way to tell the player that time has
//! advanced, so the player samples them on a fixed cadence. Every poll runs
//! as its own tokio task owned by a [`PollHandle`]; dropping or cancelling
//! the handle stops the task. The [`PollScheduler`] keeps a live count per
//! poll name so callers can check that a replaced session left no ghost
//! timers behind.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

type Counts = Arc<Mutex<HashMap<&'static str, usize>>>;

/// Spawns poll tasks and tracks how many are alive
#[derive(Debug, Clone, Default)]
pub struct PollScheduler {
    counts: Counts,
}

impl PollScheduler {
    /// Create a scheduler with no live polls
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a poll that calls `tick` every `period`.
    ///
    /// The first tick fires one full period after the call. A tick that
    /// returns [`ControlFlow::Break`] ends the poll. A tick still running when
    /// the handle is cancelled is abandoned at its next suspension point.
    pub fn spawn<F, Fut>(&self, name: &'static str, period: Duration, mut tick: F) -> PollHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let token = CancellationToken::new();
        let registration = Arc::new(Registration::register(name, Arc::clone(&self.counts)));

        let task_token = token.clone();
        let task_registration = Arc::clone(&registration);
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    _ = interval.tick() => {}
                }

                let flow = tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    flow = tick() => flow,
                };

                if flow.is_break() {
                    debug!("⏹️ Poll {} finished on its own", name);
                    break;
                }
            }

            task_registration.release();
        });

        debug!("⏱️ Started poll {} every {:?}", name, period);

        PollHandle {
            name,
            period,
            token,
            task: Some(task),
            registration,
        }
    }

    /// Number of live polls registered under `name`
    pub fn active_count(&self, name: &str) -> usize {
        self.counts.lock().get(name).copied().unwrap_or(0)
    }

    /// Number of live polls across all names
    pub fn total_active(&self) -> usize {
        self.counts.lock().values().sum()
    }
}

/// Live-count entry shared by a poll task and its handle; released once
#[derive(Debug)]
struct Registration {
    name: &'static str,
    counts: Counts,
    released: AtomicBool,
}

impl Registration {
    fn register(name: &'static str, counts: Counts) -> Self {
        *counts.lock().entry(name).or_insert(0) += 1;
        Self {
            name,
            counts,
            released: AtomicBool::new(false),
        }
    }

    fn release(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }

        let mut counts = self.counts.lock();
        match counts.get_mut(self.name) {
            Some(count) if *count > 0 => *count -= 1,
            _ => warn!("Poll {} released more often than registered", self.name),
        }
    }

    fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

/// Owner of one running poll
#[derive(Debug)]
pub struct PollHandle {
    name: &'static str,
    period: Duration,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
    registration: Arc<Registration>,
}

impl PollHandle {
    /// Poll name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Tick period
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Whether the poll has stopped, either cancelled or finished
    pub fn is_finished(&self) -> bool {
        self.registration.is_released()
    }

    /// Stop the poll without waiting for the task to exit
    pub fn cancel(&mut self) {
        if !self.token.is_cancelled() {
            debug!("🛑 Cancelling poll {}", self.name);
        }
        self.token.cancel();
        self.registration.release();
    }

    /// Stop the poll and wait for its task to exit
    pub async fn stop(mut self) {
        self.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Poll {} task ended abnormally: {}", self.name, e);
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_tick(counter: Arc<AtomicUsize>) -> impl FnMut() -> std::future::Ready<ControlFlow<()>> {
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(ControlFlow::Continue(()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_ticks_on_period() {
        let scheduler = PollScheduler::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        let handle = scheduler.spawn("test", Duration::from_millis(500), counting_tick(ticks.clone()));

        tokio::time::sleep(Duration::from_millis(1_250)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.active_count("test"), 1);

        handle.stop().await;
        assert_eq!(scheduler.active_count("test"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_poll() {
        let scheduler = PollScheduler::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        let handle = scheduler.spawn("test", Duration::from_millis(100), counting_tick(ticks.clone()));
        drop(handle);

        assert_eq!(scheduler.total_active(), 0);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_break_finishes_poll() {
        let scheduler = PollScheduler::new();
        let handle = scheduler.spawn("once", Duration::from_millis(100), || async {
            ControlFlow::Break(())
        });

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(handle.is_finished());
        assert_eq!(scheduler.active_count("once"), 0);

        // Cancelling a finished poll does not double-release
        drop(handle);
        assert_eq!(scheduler.active_count("once"), 0);
    }
}
