//! Countdown engine implementation.
//!
//! The engine is a synchronous state machine over a flattened [`Schedule`].
//! It owns no threads or timers: the host calls `tick(elapsed_ms)` at a
//! steady cadence (100 ms is plenty for 1-second cue thresholds) and feeds
//! control commands from the same logical timeline.
//!
//! ## State Transitions
//!
//! ```text
//! Idle/Finished --start--> Running --pause--> Paused --resume--> Running
//! Running/Paused --stop--> Idle
//! Running --tick--> Running | Finished
//! ```
//!
//! ## Usage
//!
//! ```
//! use intervaltimer_core::timer::{CountdownEngine, TimerState};
//! use intervaltimer_core::workout::{Exercise, ExerciseKind, Workout};
//!
//! let workout = Workout::new("Quick").with_element(Exercise::new("Go", ExerciseKind::Work, 1000));
//! let mut engine = CountdownEngine::from_workout(&workout);
//! engine.start();
//! engine.tick(1000);
//! assert_eq!(engine.state(), TimerState::Finished);
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::cue::{Cue, CueScheduler};
use super::flatten::TimerStep;
use super::schedule::Schedule;
use crate::events::{Event, LookAhead};
use crate::workout::{Color, Workout};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    /// No step active: before the first start or after a stop.
    Idle,
    Running,
    Paused,
    /// Every step ran out. Terminal until the next start.
    Finished,
}

/// Core countdown engine.
///
/// Not `Sync`-shared and not persisted: one instance drives one playback
/// session and is driven from one timeline.
#[derive(Debug, Clone)]
pub struct CountdownEngine {
    schedule: Schedule,
    state: TimerState,
    step_index: usize,
    /// Remaining time in milliseconds for the current step.
    remaining_ms: u64,
    cues: CueScheduler,
}

impl CountdownEngine {
    /// Create an idle engine over already-flattened steps.
    pub fn new(steps: Vec<TimerStep>) -> Self {
        Self {
            schedule: Schedule::new(steps),
            state: TimerState::Idle,
            step_index: 0,
            remaining_ms: 0,
            cues: CueScheduler::new(),
        }
    }

    /// Flatten `workout` and create an idle engine over the result.
    pub fn from_workout(workout: &Workout) -> Self {
        Self::new(super::flatten::flatten(workout))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn last_cue_second(&self) -> Option<u64> {
        self.cues.last_fired()
    }

    /// The step counting down, if any.
    pub fn current_step(&self) -> Option<&TimerStep> {
        match self.state {
            TimerState::Running | TimerState::Paused => self.schedule.get(self.step_index),
            TimerState::Idle | TimerState::Finished => None,
        }
    }

    /// Color of the current step, `Unset` when nothing is active.
    pub fn current_color(&self) -> Color {
        self.current_step().map(|s| s.color).unwrap_or_default()
    }

    /// Whole-workout length.
    pub fn total_duration_ms(&self) -> u64 {
        self.schedule.total_duration_ms()
    }

    /// Time left across the rest of the workout, current step included.
    ///
    /// While idle this is the full workout length; once finished it is zero.
    pub fn total_remaining_ms(&self) -> u64 {
        match self.state {
            TimerState::Running | TimerState::Paused => self
                .remaining_ms
                .saturating_add(self.schedule.remaining_after(self.step_index + 1)),
            TimerState::Idle => self.schedule.total_duration_ms(),
            TimerState::Finished => 0,
        }
    }

    /// The step `offset` positions after the current one (`1` = next).
    ///
    /// While idle, the first step of the workout counts as "next".
    pub fn look_ahead(&self, offset: usize) -> LookAhead {
        let index = match self.state {
            TimerState::Running | TimerState::Paused => Some(self.step_index + offset),
            TimerState::Idle => offset.checked_sub(1),
            TimerState::Finished => None,
        };
        match index.and_then(|i| self.schedule.get(i)) {
            Some(step) => LookAhead::Step {
                label: step.label.clone(),
                duration_ms: step.duration_ms,
                color: step.color,
            },
            None => LookAhead::EndOfWorkout,
        }
    }

    pub fn next_step(&self) -> LookAhead {
        self.look_ahead(1)
    }

    pub fn step_after_next(&self) -> LookAhead {
        self.look_ahead(2)
    }

    /// 0.0 .. 1.0 progress within the current step.
    pub fn step_progress(&self) -> f64 {
        let total = self.current_step().map(|s| s.duration_ms).unwrap_or(0);
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_ms as f64 / total as f64)
    }

    /// 0.0 .. 100.0 progress across the whole workout.
    pub fn workout_progress_pct(&self) -> f64 {
        let total = self.schedule.total_duration_ms();
        match self.state {
            TimerState::Finished => 100.0,
            _ if total == 0 => 0.0,
            state => {
                let remaining = if state == TimerState::Idle {
                    total
                } else {
                    self.total_remaining_ms()
                };
                ((total - remaining.min(total)) as f64 / total as f64 * 100.0).min(100.0)
            }
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let step = self.current_step();
        Event::StateSnapshot {
            state: self.state,
            step_index: self.step_index,
            step_label: step.map(|s| s.label.clone()),
            step_kind: step.map(|s| s.kind),
            color: self.current_color(),
            remaining_ms: self.remaining_ms,
            total_remaining_ms: self.total_remaining_ms(),
            next: self.next_step(),
            after_next: self.step_after_next(),
            workout_progress_pct: self.workout_progress_pct(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin from the first step. Resumes instead when paused.
    pub fn start(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running => None,
            TimerState::Paused => self.resume(),
            TimerState::Idle | TimerState::Finished => {
                self.step_index = 0;
                self.cues.reset();
                let Some(step) = self.schedule.get(0) else {
                    tracing::debug!("start on empty workout");
                    self.state = TimerState::Finished;
                    self.remaining_ms = 0;
                    return None;
                };
                self.remaining_ms = step.duration_ms;
                self.state = TimerState::Running;
                tracing::info!(
                    steps = self.schedule.len(),
                    total_ms = self.schedule.total_duration_ms(),
                    "countdown started"
                );
                Some(Event::TimerStarted {
                    step_index: 0,
                    step_label: step.label.clone(),
                    step_kind: step.kind,
                    duration_ms: step.duration_ms,
                    total_ms: self.schedule.total_duration_ms(),
                    at: Utc::now(),
                })
            }
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.state = TimerState::Paused;
        tracing::debug!(step = self.step_index, remaining_ms = self.remaining_ms, "paused");
        Some(Event::TimerPaused {
            step_index: self.step_index,
            remaining_ms: self.remaining_ms,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.state != TimerState::Paused {
            return None;
        }
        self.state = TimerState::Running;
        tracing::debug!(step = self.step_index, remaining_ms = self.remaining_ms, "resumed");
        Some(Event::TimerResumed {
            step_index: self.step_index,
            remaining_ms: self.remaining_ms,
            at: Utc::now(),
        })
    }

    /// Abort playback and rewind to the first step without restarting.
    ///
    /// The flattened schedule is kept: a later [`start`](Self::start) replays
    /// the steps flattened from the loaded workout. Call [`load`](Self::load)
    /// to pick up edits.
    pub fn stop(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running | TimerState::Paused => {
                self.state = TimerState::Idle;
                self.step_index = 0;
                self.remaining_ms = 0;
                self.cues.reset();
                tracing::debug!("stopped");
                Some(Event::TimerStopped { at: Utc::now() })
            }
            TimerState::Idle | TimerState::Finished => None,
        }
    }

    /// Replace the workout being played. Leaves the engine idle.
    pub fn load(&mut self, workout: &Workout) {
        *self = Self::from_workout(workout);
    }

    /// Consume `elapsed_ms` of countdown.
    ///
    /// Returns `CueTriggered` when a threshold second is reached, or
    /// `StepAdvanced` / `WorkoutFinished` when the current step runs out.
    /// Elapsed time beyond the end of a step is dropped, not carried into the
    /// next one, so at most one step advances per tick.
    pub fn tick(&mut self, elapsed_ms: u64) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed_ms);
        let cue = self.cues.observe(self.remaining_ms);
        if self.remaining_ms > 0 {
            return cue.map(|seconds_remaining| {
                tracing::trace!(step = self.step_index, seconds_remaining, "cue");
                Event::CueTriggered {
                    step_index: self.step_index,
                    seconds_remaining,
                    cue: Cue::for_threshold(seconds_remaining),
                    at: Utc::now(),
                }
            });
        }
        Some(self.advance())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn advance(&mut self) -> Event {
        let next = self.step_index + 1;
        self.cues.reset();
        match self.schedule.get(next) {
            Some(step) => {
                self.step_index = next;
                self.remaining_ms = step.duration_ms;
                tracing::debug!(step = next, label = %step.label, "step advanced");
                Event::StepAdvanced {
                    step_index: next,
                    step_label: step.label.clone(),
                    step_kind: step.kind,
                    duration_ms: step.duration_ms,
                    at: Utc::now(),
                }
            }
            None => {
                self.step_index = self.schedule.len();
                self.remaining_ms = 0;
                self.state = TimerState::Finished;
                tracing::info!(steps = self.schedule.len(), "workout finished");
                Event::WorkoutFinished {
                    steps_completed: self.schedule.len(),
                    total_ms: self.schedule.total_duration_ms(),
                    at: Utc::now(),
                }
            }
        }
    }
}
