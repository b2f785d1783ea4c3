use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Cue, TimerState};
use crate::workout::{Color, ExerciseKind};

/// An upcoming step as shown in the "next" / "after that" slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LookAhead {
    Step {
        label: String,
        duration_ms: u64,
        color: Color,
    },
    EndOfWorkout,
}

impl LookAhead {
    pub fn is_end(&self) -> bool {
        matches!(self, LookAhead::EndOfWorkout)
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            LookAhead::Step { label, .. } => Some(label),
            LookAhead::EndOfWorkout => None,
        }
    }
}

/// Every state change of the countdown engine produces an Event.
/// Hosts render them, route cues to a player, or print them as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        step_index: usize,
        step_label: String,
        step_kind: ExerciseKind,
        duration_ms: u64,
        total_ms: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        step_index: usize,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        step_index: usize,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        at: DateTime<Utc>,
    },
    CueTriggered {
        step_index: usize,
        seconds_remaining: u64,
        cue: Cue,
        at: DateTime<Utc>,
    },
    StepAdvanced {
        step_index: usize,
        step_label: String,
        step_kind: ExerciseKind,
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    WorkoutFinished {
        steps_completed: usize,
        total_ms: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        step_index: usize,
        step_label: Option<String>,
        step_kind: Option<ExerciseKind>,
        color: Color,
        remaining_ms: u64,
        total_remaining_ms: u64,
        next: LookAhead,
        after_next: LookAhead,
        workout_progress_pct: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short machine name, matching the serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Event::TimerStarted { .. } => "TimerStarted",
            Event::TimerPaused { .. } => "TimerPaused",
            Event::TimerResumed { .. } => "TimerResumed",
            Event::TimerStopped { .. } => "TimerStopped",
            Event::CueTriggered { .. } => "CueTriggered",
            Event::StepAdvanced { .. } => "StepAdvanced",
            Event::WorkoutFinished { .. } => "WorkoutFinished",
            Event::StateSnapshot { .. } => "StateSnapshot",
        }
    }
}
