use serde::{Deserialize, Serialize};

/// Whole seconds remaining at which a cue sounds.
pub const CUE_THRESHOLDS_SECS: [u64; 4] = [10, 3, 2, 1];

/// A named audio cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// Warning and countdown beeps.
    Beep,
    /// The final second before a transition.
    LastBeep,
}

impl Cue {
    pub fn for_threshold(seconds_remaining: u64) -> Self {
        if seconds_remaining <= 1 {
            Cue::LastBeep
        } else {
            Cue::Beep
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Cue::Beep => "beep",
            Cue::LastBeep => "last_beep",
        }
    }
}

/// Gates cues so each threshold fires at most once per step.
///
/// Ticks arrive several times per second; the scheduler remembers the last
/// whole second it fired for and stays quiet until a different threshold
/// second comes around. Pausing leaves this state alone, so a resumed step
/// neither repeats a cue nor loses the one it was paused on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CueScheduler {
    last_fired_secs: Option<u64>,
}

impl CueScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget fired cues. Called on every step entry.
    pub fn reset(&mut self) {
        self.last_fired_secs = None;
    }

    pub fn last_fired(&self) -> Option<u64> {
        self.last_fired_secs
    }

    /// Feed the current remaining time; returns the threshold second if a
    /// cue should sound now.
    pub fn observe(&mut self, remaining_ms: u64) -> Option<u64> {
        let secs = remaining_ms / 1000;
        if CUE_THRESHOLDS_SECS.contains(&secs) && self.last_fired_secs != Some(secs) {
            self.last_fired_secs = Some(secs);
            return Some(secs);
        }
        None
    }
}
