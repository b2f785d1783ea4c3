mod cue;
mod engine;
mod flatten;
mod schedule;

pub use cue::{Cue, CueScheduler, CUE_THRESHOLDS_SECS};
pub use engine::{CountdownEngine, TimerState};
pub use flatten::{flatten, TimerStep};
pub use schedule::Schedule;

/// Reference tick cadence for hosts driving the engine.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;
