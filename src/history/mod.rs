//! Game history persistence.
//!
//! The engine never touches this module; the front end records each
//! finished game here.

mod error;
mod models;
mod repository;
mod store;

pub use error::HistoryError;
pub use models::{AggregatedStats, GameRecord, RecordResult};
pub use repository::{GameHistory, HISTORY_LIMIT, HISTORY_STORAGE_KEY};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
