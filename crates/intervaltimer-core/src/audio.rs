//! Cue playback.
//!
//! Playback is fire-and-forget: a [`CuePlayer`] must return immediately and
//! must never report failure back to the countdown.

use std::io::Write;
use std::sync::Mutex;

use crate::timer::Cue;

pub trait CuePlayer: Send {
    fn play(&self, cue: Cue);
}

/// Discards every cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentPlayer;

impl CuePlayer for SilentPlayer {
    fn play(&self, _cue: Cue) {}
}

/// Rings the terminal bell on stderr; the final-second cue rings twice.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl CuePlayer for TerminalBell {
    fn play(&self, cue: Cue) {
        let bell: &[u8] = match cue {
            Cue::Beep => b"\x07",
            Cue::LastBeep => b"\x07\x07",
        };
        let mut stderr = std::io::stderr();
        if let Err(e) = stderr.write_all(bell).and_then(|_| stderr.flush()) {
            tracing::debug!(cue = cue.name(), error = %e, "cue playback failed");
        }
    }
}

/// Remembers every cue it was asked to play, for tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingPlayer {
    played: Mutex<Vec<Cue>>,
}

impl RecordingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<Cue> {
        self.played
            .lock()
            .map(|cues| cues.clone())
            .unwrap_or_default()
    }
}

impl CuePlayer for RecordingPlayer {
    fn play(&self, cue: Cue) {
        if let Ok(mut cues) = self.played.lock() {
            cues.push(cue);
        }
    }
}

impl<P: CuePlayer + Sync> CuePlayer for std::sync::Arc<P> {
    fn play(&self, cue: Cue) {
        (**self).play(cue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn recording_player_keeps_order() {
        let player = RecordingPlayer::new();
        player.play(Cue::Beep);
        player.play(Cue::LastBeep);
        assert_eq!(player.played(), vec![Cue::Beep, Cue::LastBeep]);
    }

    #[test]
    fn arc_forwards_to_inner_player() {
        let player = Arc::new(RecordingPlayer::new());
        let shared: Box<dyn CuePlayer> = Box::new(Arc::clone(&player));
        shared.play(Cue::Beep);
        assert_eq!(player.played(), vec![Cue::Beep]);
    }

    #[test]
    fn silent_player_is_a_no_op() {
        SilentPlayer.play(Cue::LastBeep);
    }
}
