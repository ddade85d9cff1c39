//! Per-account game history log.

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use super::{AggregatedStats, GameRecord, HistoryError, KeyValueStore, RecordResult};
use crate::games::tictactoe::{Difficulty, GameOutcome};

/// Storage key prefix for history logs.
pub const HISTORY_STORAGE_KEY: &str = "tacotex_game_history";

/// Records kept per account.
pub const HISTORY_LIMIT: usize = 100;

/// Append-only game log for one account, newest first, capped.
#[derive(Debug, Clone)]
pub struct GameHistory<S> {
    store: S,
    key: String,
    limit: usize,
}

impl<S: KeyValueStore> GameHistory<S> {
    /// Opens the history of `account` with the default cap.
    #[instrument(skip(store))]
    pub fn new(store: S, account: &str) -> Self {
        Self::with_limit(store, account, HISTORY_LIMIT)
    }

    /// Opens the history of `account` keeping at most `limit` records.
    #[instrument(skip(store))]
    pub fn with_limit(store: S, account: &str, limit: usize) -> Self {
        Self {
            store,
            key: Self::storage_key(account),
            limit,
        }
    }

    /// Storage key for an account's log.
    pub fn storage_key(account: &str) -> String {
        format!("{}:{}", HISTORY_STORAGE_KEY, account.to_lowercase())
    }

    /// Current storage key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Points the log at another account.
    #[instrument(skip(self), fields(old = %self.key))]
    pub fn switch_account(&mut self, account: &str) {
        self.key = Self::storage_key(account);
        info!(key = %self.key, "History switched account");
    }

    /// Loads the log, newest first.
    ///
    /// A stored value that does not parse is logged and read as empty.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if the store itself fails.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn list(&self) -> Result<Vec<GameRecord>, HistoryError> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<GameRecord>>(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(error = %e, "Failed to parse game history, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Appends a finished game. In-progress outcomes are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if the store fails.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn record(
        &self,
        outcome: &GameOutcome,
        difficulty: Difficulty,
    ) -> Result<Option<GameRecord>, HistoryError> {
        let Some(result) = RecordResult::from_outcome(outcome) else {
            debug!("Outcome not terminal, nothing to record");
            return Ok(None);
        };

        let now = Utc::now();
        let id = now
            .timestamp_nanos_opt()
            .unwrap_or_else(|| now.timestamp_millis())
            .to_string();
        let record = GameRecord::new(id, result, difficulty, now);

        let mut records = self.list()?;
        records.insert(0, record.clone());
        records.truncate(self.limit);
        self.store.set(&self.key, serde_json::to_string(&records)?)?;

        info!(%result, %difficulty, count = records.len(), "Game recorded");
        Ok(Some(record))
    }

    /// Deletes the log.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if the store fails.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn clear(&self) -> Result<(), HistoryError> {
        self.store.remove(&self.key)?;
        info!("History cleared");
        Ok(())
    }

    /// Win/loss/draw tally of the log.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] if the store fails.
    pub fn stats(&self) -> Result<AggregatedStats, HistoryError> {
        Ok(AggregatedStats::from_records(&self.list()?))
    }
}
