//! Game history records.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::instrument;

use crate::games::tictactoe::{Difficulty, GameOutcome, Mark};

/// Game result from the human player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RecordResult {
    /// Player won the game.
    Win,
    /// Player lost to the AI.
    Loss,
    /// Game ended in a draw.
    Draw,
}

impl RecordResult {
    /// Maps a terminal outcome; `None` while the game is in progress.
    #[instrument]
    pub fn from_outcome(outcome: &GameOutcome) -> Option<Self> {
        match outcome {
            GameOutcome::InProgress => None,
            GameOutcome::Win { mark: Mark::X, .. } => Some(Self::Win),
            GameOutcome::Win { mark: Mark::O, .. } => Some(Self::Loss),
            GameOutcome::Draw => Some(Self::Draw),
        }
    }
}

/// One completed game.
///
/// Serialized as `{"id", "result", "difficulty", "timestamp"}` with the
/// timestamp in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct GameRecord {
    id: String,
    result: RecordResult,
    difficulty: Difficulty,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    timestamp: DateTime<Utc>,
}

/// Aggregated statistics over a history log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Getters)]
pub struct AggregatedStats {
    total_games: usize,
    wins: usize,
    losses: usize,
    draws: usize,
}

impl AggregatedStats {
    /// Tallies a list of records.
    pub fn from_records(records: &[GameRecord]) -> Self {
        records.iter().fold(Self::default(), |mut acc, record| {
            acc.total_games += 1;
            match record.result() {
                RecordResult::Win => acc.wins += 1,
                RecordResult::Loss => acc.losses += 1,
                RecordResult::Draw => acc.draws += 1,
            }
            acc
        })
    }

    /// Calculates win rate as a percentage (0.0-100.0).
    pub fn win_rate(&self) -> f64 {
        if self.total_games == 0 {
            0.0
        } else {
            (self.wins as f64 / self.total_games as f64) * 100.0
        }
    }
}
