//! Cancellable periodic timer.
//!
//! Ticks are scheduled from the previous tick, not from when the callback
//! finishes, so the cadence does not drift. A new period takes effect from
//! the last tick: the next deadline becomes `last_tick + new_period`, or
//! immediately if that instant has already passed.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::trace;

/// Returned by a tick callback to keep or end the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Stop,
}

/// A periodic timer running on the tokio runtime.
///
/// `start` must be called from within a runtime. Dropping the task aborts
/// the timer.
#[derive(Debug, Default)]
pub struct RepeatingTask {
    handle: Option<JoinHandle<()>>,
    period_tx: Option<watch::Sender<Duration>>,
}

impl RepeatingTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start ticking every `period`, replacing any running schedule.
    ///
    /// The first tick fires one full period after this call.
    pub fn start<F>(&mut self, period: Duration, mut on_tick: F)
    where
        F: FnMut() -> TickControl + Send + 'static,
    {
        self.stop();

        let (period_tx, mut period_rx) = watch::channel(period);
        let started = Instant::now();

        let handle = tokio::spawn(async move {
            let mut period = period;
            let mut last_tick = started;
            let mut deadline = started + period;

            loop {
                tokio::select! {
                    _ = sleep_until(deadline) => {
                        last_tick = deadline;
                        trace!(?period, "Tick");
                        if on_tick() == TickControl::Stop {
                            break;
                        }
                        // Missed deadlines are skipped rather than replayed in a burst
                        deadline = (last_tick + period).max(Instant::now());
                    }
                    changed = period_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        period = *period_rx.borrow_and_update();
                        deadline = (last_tick + period).max(Instant::now());
                        trace!(?period, "Rescheduled");
                    }
                }
            }
        });

        self.handle = Some(handle);
        self.period_tx = Some(period_tx);
    }

    /// Change the period of a running schedule without restarting it.
    ///
    /// Returns false if nothing is running.
    pub fn reschedule(&mut self, period: Duration) -> bool {
        if !self.is_running() {
            return false;
        }
        match &self.period_tx {
            Some(tx) => tx.send(period).is_ok(),
            None => false,
        }
    }

    /// Abort the schedule.
    ///
    /// On a multi-threaded runtime a tick already being polled may still
    /// finish; state touched by the callback needs its own guard.
    pub fn stop(&mut self) {
        self.period_tx = None;
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for RepeatingTask {
    fn drop(&mut self) {
        self.stop();
    }
}
