//! Playback of a dataset's time axis.
//!
//! - [`PlaybackState`]: the pure state machine (play, pause, reset, seek, tick)
//! - [`RepeatingTask`]: a cancellable, reschedulable periodic timer
//! - [`PlaybackController`]: owns the state behind a lock and drives it from a timer

mod controller;
mod state;
mod ticker;

pub use controller::PlaybackController;
pub use state::{PlaybackState, PlaybackStatus, TickOutcome};
pub use ticker::{RepeatingTask, TickControl};
