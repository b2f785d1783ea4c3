//! # Interval Timer Core Library
//!
//! Core logic for a workout interval timer: workouts are composed of
//! exercises and blocks of exercises repeated for several rounds, flattened
//! into a linear list of timed steps, and played back by a countdown engine
//! that cues the last seconds of every step.
//!
//! ## Architecture
//!
//! - **Workout model**: exercises, one-level blocks, and the editing
//!   operations that keep cached block durations current
//! - **Timer**: flattening, the precomputed step schedule, the countdown
//!   state machine (driven by the caller's `tick()`), and cue gating
//! - **Playback**: a tokio host loop that serializes ticks and user commands
//! - **Storage**: SQLite workout store and TOML configuration
//!
//! ## Key Components
//!
//! - [`CountdownEngine`]: Core countdown state machine
//! - [`flatten`]: Workout to step sequence
//! - [`WorkoutDb`]: Workout persistence
//! - [`Config`]: Application configuration management

pub mod audio;
pub mod error;
pub mod events;
pub mod format;
pub mod playback;
pub mod storage;
pub mod timer;
pub mod workout;

pub use audio::{CuePlayer, RecordingPlayer, SilentPlayer, TerminalBell};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::{Event, LookAhead};
pub use format::{format_duration, parse_duration};
pub use playback::{Control, PlaybackSession, RunOutcome};
pub use storage::{Config, MemoryStore, WorkoutDb, WorkoutStore};
pub use timer::{flatten, CountdownEngine, Cue, CueScheduler, Schedule, TimerState, TimerStep};
pub use workout::{Block, Color, ElementId, Exercise, ExerciseKind, Workout, WorkoutElement};
