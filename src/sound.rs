//! Audio cues for game events.
//!
//! The terminal has one sound, the bell, so every cue rings it. Cues are
//! still distinguished so they show up in the logs and so a richer sink can
//! tell them apart.

use std::io::Write;
use strum::Display;
use tracing::{debug, instrument, warn};

use crate::games::tictactoe::{GameOutcome, Mark};
use crate::history::{HistoryError, KeyValueStore};

/// Storage key for the mute flag.
pub const MUTED_STORAGE_KEY: &str = "tacotex_sound_muted";

/// Event that deserves a sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SoundCue {
    /// A mark was placed.
    Place,
    /// The player won.
    Win,
    /// The AI won.
    Lose,
    /// The game was drawn.
    Draw,
}

impl SoundCue {
    /// Cue for a terminal outcome, `None` while in progress.
    pub fn for_outcome(outcome: &GameOutcome) -> Option<Self> {
        match outcome {
            GameOutcome::InProgress => None,
            GameOutcome::Win { mark: Mark::X, .. } => Some(SoundCue::Win),
            GameOutcome::Win { mark: Mark::O, .. } => Some(SoundCue::Lose),
            GameOutcome::Draw => Some(SoundCue::Draw),
        }
    }
}

/// Plays cues unless muted; the mute flag is persisted.
#[derive(Debug)]
pub struct SoundPlayer<S> {
    store: S,
    muted: bool,
}

impl<S: KeyValueStore> SoundPlayer<S> {
    /// Loads the mute flag from `store`.
    ///
    /// A missing or unreadable flag means unmuted.
    #[instrument(skip(store))]
    pub fn load(store: S) -> Self {
        let muted = match store.get(MUTED_STORAGE_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Failed to parse mute setting");
                false
            }),
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "Failed to read mute setting");
                false
            }
        };
        debug!(muted, "Sound settings loaded");
        Self { store, muted }
    }

    /// Whether cues are suppressed.
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Flips and persists the mute flag, returning the new value.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if the flag cannot be saved; the in-memory
    /// flag is flipped regardless.
    #[instrument(skip(self), fields(muted = self.muted))]
    pub fn toggle(&mut self) -> Result<bool, HistoryError> {
        self.muted = !self.muted;
        self.store
            .set(MUTED_STORAGE_KEY, serde_json::to_string(&self.muted)?)?;
        Ok(self.muted)
    }

    /// Rings `cue` on stdout. Returns whether anything was played.
    pub fn play(&self, cue: SoundCue) -> bool {
        self.play_to(cue, &mut std::io::stdout())
    }

    /// Rings `cue` on `out`. Returns whether anything was played.
    #[instrument(skip(self, out))]
    pub fn play_to<W: Write>(&self, cue: SoundCue, out: &mut W) -> bool {
        if self.muted {
            return false;
        }
        // Playback can fail (closed terminal); that is never fatal.
        if let Err(e) = out.write_all(b"\x07").and_then(|_| out.flush()) {
            warn!(error = %e, %cue, "Sound play failed");
            return false;
        }
        debug!(%cue, "Sound played");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryStore;
    use std::sync::Arc;

    #[test]
    fn test_mute_persists_across_loads() {
        let store = Arc::new(MemoryStore::new());
        let mut player = SoundPlayer::load(Arc::clone(&store));
        assert!(!player.is_muted());
        assert!(player.toggle().unwrap());

        let reloaded = SoundPlayer::load(store);
        assert!(reloaded.is_muted());
    }

    #[test]
    fn test_muted_player_is_silent() {
        let store = MemoryStore::new();
        store.set(MUTED_STORAGE_KEY, "true".into()).unwrap();
        let player = SoundPlayer::load(store);
        let mut out = Vec::new();
        assert!(!player.play_to(SoundCue::Win, &mut out));
        assert!(out.is_empty());
    }

    #[test]
    fn test_unmuted_player_rings_bell() {
        let player = SoundPlayer::load(MemoryStore::new());
        let mut out = Vec::new();
        assert!(player.play_to(SoundCue::Place, &mut out));
        assert_eq!(out, b"\x07");
    }

    #[test]
    fn test_corrupt_flag_reads_unmuted() {
        let store = MemoryStore::new();
        store.set(MUTED_STORAGE_KEY, "yes please".into()).unwrap();
        assert!(!SoundPlayer::load(store).is_muted());
    }

    #[test]
    fn test_cue_for_outcome() {
        assert_eq!(SoundCue::for_outcome(&GameOutcome::Draw), Some(SoundCue::Draw));
        assert_eq!(SoundCue::for_outcome(&GameOutcome::InProgress), None);
    }
}
