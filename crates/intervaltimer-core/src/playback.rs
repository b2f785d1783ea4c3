//! Playback host: drives a [`CountdownEngine`] from a periodic tick source
//! and a control channel, and routes cues to a [`CuePlayer`].
//!
//! Ticks and control commands are multiplexed through a single
//! `tokio::select!` loop, so the engine only ever sees one call at a time.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::audio::CuePlayer;
use crate::events::Event;
use crate::timer::{CountdownEngine, TimerState};
use crate::workout::Workout;

/// Commands a user can issue during playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Start,
    Pause,
    Resume,
    Stop,
    Quit,
}

/// How a playback loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Finished,
    Quit,
}

/// An engine paired with the player its cues go to.
pub struct PlaybackSession<P: CuePlayer> {
    engine: CountdownEngine,
    player: P,
}

impl<P: CuePlayer> PlaybackSession<P> {
    pub fn new(engine: CountdownEngine, player: P) -> Self {
        Self { engine, player }
    }

    /// Flatten `workout` into a fresh engine.
    pub fn for_workout(workout: &Workout, player: P) -> Self {
        Self::new(CountdownEngine::from_workout(workout), player)
    }

    pub fn engine(&self) -> &CountdownEngine {
        &self.engine
    }

    pub fn into_engine(self) -> CountdownEngine {
        self.engine
    }

    /// Apply a control command. `Quit` has no engine effect.
    pub fn apply(&mut self, control: Control) -> Option<Event> {
        match control {
            Control::Start => self.engine.start(),
            Control::Pause => self.engine.pause(),
            Control::Resume => self.engine.resume(),
            Control::Stop => self.engine.stop(),
            Control::Quit => None,
        }
    }

    /// Advance the engine, playing any cue the tick produced.
    pub fn tick(&mut self, elapsed_ms: u64) -> Option<Event> {
        let event = self.engine.tick(elapsed_ms);
        if let Some(Event::CueTriggered { cue, .. }) = &event {
            self.player.play(*cue);
        }
        event
    }
}

/// Start playback and run until the workout finishes or `Quit` arrives.
///
/// `on_update` is called after every tick and every control command with the
/// engine and the event it produced, if any. Elapsed time is measured between
/// ticks, so a late tick is credited in full. Time spent paused is never
/// credited, and time run since the last tick is credited before a pause.
/// If the control sender is dropped, a running workout plays to the end;
/// a paused or stopped one returns [`RunOutcome::Quit`].
pub async fn run<P, F>(
    session: &mut PlaybackSession<P>,
    tick_interval: Duration,
    mut controls: mpsc::Receiver<Control>,
    mut on_update: F,
) -> RunOutcome
where
    P: CuePlayer,
    F: FnMut(&CountdownEngine, Option<&Event>),
{
    let mut interval = time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = Instant::now();
    let mut controls_open = true;

    let started = session.apply(Control::Start);
    on_update(session.engine(), started.as_ref());
    if session.engine().state() == TimerState::Finished {
        return RunOutcome::Finished;
    }

    loop {
        tokio::select! {
            now = interval.tick() => {
                let elapsed = now.saturating_duration_since(last);
                last = now;
                let event = session.tick(elapsed.as_millis() as u64);
                on_update(session.engine(), event.as_ref());
                if session.engine().state() == TimerState::Finished {
                    return RunOutcome::Finished;
                }
            }
            control = controls.recv(), if controls_open => {
                let Some(control) = control else {
                    tracing::debug!("control channel closed");
                    // Nothing can resume or restart an engine that is not running.
                    if session.engine().state() != TimerState::Running {
                        return RunOutcome::Quit;
                    }
                    controls_open = false;
                    continue;
                };
                if control == Control::Quit {
                    return RunOutcome::Quit;
                }
                if control == Control::Pause && session.engine().state() == TimerState::Running {
                    let now = Instant::now();
                    let elapsed = now.saturating_duration_since(last);
                    last = now;
                    let event = session.tick(elapsed.as_millis() as u64);
                    on_update(session.engine(), event.as_ref());
                    if session.engine().state() == TimerState::Finished {
                        return RunOutcome::Finished;
                    }
                }
                if matches!(control, Control::Resume | Control::Start) {
                    last = Instant::now();
                }
                let event = session.apply(control);
                on_update(session.engine(), event.as_ref());
                if session.engine().state() == TimerState::Finished {
                    return RunOutcome::Finished;
                }
            }
        }
    }
}
