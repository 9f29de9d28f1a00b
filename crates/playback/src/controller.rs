//! Playback controller: the state machine behind a lock, driven by a timer.
//!
//! User calls and timer ticks serialize on one mutex. Every call that ends a
//! schedule (pause, reset, a new play, drop) bumps a generation counter
//! under that mutex, and a tick only applies if its generation is current.
//! Once such a call returns, no tick from an older schedule can mutate the
//! state, even if the timer task is mid-poll on another worker.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use metrics::counter;
use tokio::sync::watch;
use tracing::{debug, info};
use viz_common::{PlaybackSpeed, VizResult};

use crate::state::{PlaybackState, TickOutcome};
use crate::ticker::{RepeatingTask, TickControl};

struct Inner {
    state: PlaybackState,
    generation: u64,
}

type Shared = Arc<Mutex<Inner>>;

fn lock(shared: &Shared) -> MutexGuard<'_, Inner> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives a [`PlaybackState`] on a `1000ms / speed` cadence.
///
/// Must be used from within a tokio runtime.
pub struct PlaybackController {
    inner: Shared,
    ticker: RepeatingTask,
    state_tx: Arc<watch::Sender<PlaybackState>>,
}

impl PlaybackController {
    pub fn new(step_count: usize) -> VizResult<Self> {
        let state = PlaybackState::new(step_count)?;
        let (state_tx, _) = watch::channel(state);
        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                state,
                generation: 0,
            })),
            ticker: RepeatingTask::new(),
            state_tx: Arc::new(state_tx),
        })
    }

    pub fn with_speed(self, speed: PlaybackSpeed) -> Self {
        lock(&self.inner).state.set_speed(speed);
        self.publish();
        self
    }

    /// Tear-free copy of the current state.
    pub fn snapshot(&self) -> PlaybackState {
        lock(&self.inner).state
    }

    /// Receiver notified on every state change, including ticks.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state_tx.subscribe()
    }

    pub fn is_playing(&self) -> bool {
        self.snapshot().is_playing()
    }

    /// Start or resume playback. No-op while already playing.
    pub fn play(&mut self) {
        let (generation, period) = {
            let mut inner = lock(&self.inner);
            if !inner.state.play() {
                return;
            }
            inner.generation += 1;
            (inner.generation, inner.state.speed().tick_period())
        };
        self.publish();

        let shared = self.inner.clone();
        let state_tx = self.state_tx.clone();
        self.ticker.start(period, move || on_tick(&shared, &state_tx, generation));

        info!(?period, step = self.snapshot().current_step(), "Playback started");
    }

    /// Pause, keeping the current step.
    pub fn pause(&mut self) {
        let paused = {
            let mut inner = lock(&self.inner);
            inner.generation += 1;
            inner.state.pause()
        };
        self.ticker.stop();
        if paused {
            self.publish();
            info!(step = self.snapshot().current_step(), "Playback paused");
        }
    }

    pub fn toggle(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Stop and return to step 0.
    pub fn reset(&mut self) {
        {
            let mut inner = lock(&self.inner);
            inner.generation += 1;
            inner.state.reset();
        }
        self.ticker.stop();
        self.publish();
        debug!("Playback reset");
    }

    /// Jump to a step, clamped to the time axis. Playback status is kept.
    pub fn seek(&mut self, step: i64) -> usize {
        let landed = lock(&self.inner).state.seek(step);
        self.publish();
        debug!(requested = step, landed, "Seek");
        landed
    }

    /// Change speed. While playing, the new cadence applies from the next tick.
    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        let playing = {
            let mut inner = lock(&self.inner);
            inner.state.set_speed(speed);
            inner.state.is_playing()
        };
        if playing {
            self.ticker.reschedule(speed.tick_period());
        }
        self.publish();
        debug!(%speed, "Playback speed changed");
    }

    fn publish(&self) {
        let inner = lock(&self.inner);
        self.state_tx.send_replace(inner.state);
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        lock(&self.inner).generation += 1;
        self.ticker.stop();
    }
}

fn on_tick(shared: &Shared, state_tx: &watch::Sender<PlaybackState>, generation: u64) -> TickControl {
    let mut inner = lock(shared);
    if inner.generation != generation {
        return TickControl::Stop;
    }

    let outcome = inner.state.tick();
    if outcome != TickOutcome::Ignored {
        // Published under the lock so subscribers never see ticks out of order
        state_tx.send_replace(inner.state);
        counter!("playback_ticks_total").increment(1);
    }
    drop(inner);

    match outcome {
        TickOutcome::Advanced(step) => {
            debug!(step, "Playback advanced");
            TickControl::Continue
        }
        TickOutcome::Wrapped => {
            info!("Reached end of time axis, playback stopped");
            TickControl::Stop
        }
        TickOutcome::Ignored => TickControl::Stop,
    }
}
