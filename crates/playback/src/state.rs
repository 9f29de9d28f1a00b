//! Playback state machine.

use std::fmt;

use serde::Serialize;
use viz_common::{PlaybackSpeed, VizError, VizResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    Stopped,
    Playing,
    Paused,
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlaybackStatus::Stopped => "stopped",
            PlaybackStatus::Playing => "playing",
            PlaybackStatus::Paused => "paused",
        };
        f.write_str(s)
    }
}

/// Result of one timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Moved to the contained step
    Advanced(usize),
    /// Ran off the end of the time axis; back at step 0 and stopped
    Wrapped,
    /// Not playing, nothing changed
    Ignored,
}

/// Position and status of playback over a time axis of `step_count` steps.
///
/// Invariant: `current_step < step_count`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaybackState {
    status: PlaybackStatus,
    current_step: usize,
    step_count: usize,
    speed: PlaybackSpeed,
}

impl PlaybackState {
    /// Fresh state for a newly loaded dataset: step 0, stopped, normal speed.
    pub fn new(step_count: usize) -> VizResult<Self> {
        if step_count == 0 {
            return Err(VizError::InvalidDataset(
                "time axis must have at least one step".to_string(),
            ));
        }
        Ok(Self {
            status: PlaybackStatus::Stopped,
            current_step: 0,
            step_count,
            speed: PlaybackSpeed::default(),
        })
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    /// Returns true if the status changed.
    pub fn play(&mut self) -> bool {
        let changed = self.status != PlaybackStatus::Playing;
        self.status = PlaybackStatus::Playing;
        changed
    }

    /// Pausing only applies while playing. Returns true if the status changed.
    pub fn pause(&mut self) -> bool {
        if self.status == PlaybackStatus::Playing {
            self.status = PlaybackStatus::Paused;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.status = PlaybackStatus::Stopped;
        self.current_step = 0;
    }

    /// Jump to `step`, clamped into the time axis. The status is unchanged.
    pub fn seek(&mut self, step: i64) -> usize {
        let last = (self.step_count - 1) as i64;
        self.current_step = step.clamp(0, last) as usize;
        self.current_step
    }

    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        self.speed = speed;
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.status != PlaybackStatus::Playing {
            return TickOutcome::Ignored;
        }

        let next = self.current_step + 1;
        if next >= self.step_count {
            self.current_step = 0;
            self.status = PlaybackStatus::Stopped;
            TickOutcome::Wrapped
        } else {
            self.current_step = next;
            TickOutcome::Advanced(next)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = PlaybackState::new(24).unwrap();
        assert_eq!(state.status(), PlaybackStatus::Stopped);
        assert_eq!(state.current_step(), 0);
        assert_eq!(state.speed(), PlaybackSpeed::NORMAL);
        assert!(PlaybackState::new(0).is_err());
    }

    #[test]
    fn test_loop_and_stop_after_step_count_ticks() {
        let mut state = PlaybackState::new(24).unwrap();
        state.play();
        for expected in 1..24 {
            assert_eq!(state.tick(), TickOutcome::Advanced(expected));
        }
        assert_eq!(state.tick(), TickOutcome::Wrapped);
        assert_eq!(state.current_step(), 0);
        assert_eq!(state.status(), PlaybackStatus::Stopped);
        assert_eq!(state.tick(), TickOutcome::Ignored);
    }

    #[test]
    fn test_single_step_axis_wraps_immediately() {
        let mut state = PlaybackState::new(1).unwrap();
        state.play();
        assert_eq!(state.tick(), TickOutcome::Wrapped);
        assert_eq!(state.current_step(), 0);
    }

    #[test]
    fn test_seek_clamps_and_keeps_status() {
        let mut state = PlaybackState::new(24).unwrap();
        state.play();
        assert_eq!(state.seek(-5), 0);
        assert_eq!(state.seek(100), 23);
        assert_eq!(state.seek(7), 7);
        assert_eq!(state.status(), PlaybackStatus::Playing);

        state.pause();
        state.seek(3);
        assert_eq!(state.status(), PlaybackStatus::Paused);
    }

    #[test]
    fn test_pause_and_reset() {
        let mut state = PlaybackState::new(24).unwrap();
        assert!(!state.pause());
        assert_eq!(state.status(), PlaybackStatus::Stopped);

        state.play();
        state.tick();
        state.tick();
        assert!(state.pause());
        assert_eq!(state.current_step(), 2);
        assert_eq!(state.tick(), TickOutcome::Ignored);

        state.reset();
        assert_eq!(state.status(), PlaybackStatus::Stopped);
        assert_eq!(state.current_step(), 0);
    }

    #[test]
    fn test_play_is_idempotent() {
        let mut state = PlaybackState::new(4).unwrap();
        assert!(state.play());
        assert!(!state.play());
    }
}
