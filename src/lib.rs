//! TacoTex - tic-tac-toe against an AI opponent
//!
//! A pure engine plus the pieces a front end needs around it.
//!
//! # Architecture
//!
//! - **Games**: board, win/draw rules, difficulty-tiered AI, typestate game
//! - **Backend**: where the opponent's reply is computed (local or contract)
//! - **History**: per-account log of finished games behind a key-value store
//! - **Wallet / Sound**: session events and audio cues
//! - **TUI**: ratatui front end
//!
//! # Example
//!
//! ```
//! use tacotex::{AnyGame, Difficulty, Position, SeededRandom};
//!
//! let game = AnyGame::started(Difficulty::Hard)
//!     .play(Position::Center)
//!     .unwrap()
//!     .opponent_move(&mut SeededRandom::seeded(1))
//!     .unwrap();
//! assert_eq!(game.status_string(), "Your Turn (X)");
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod backend;
pub mod config;
pub mod games;
pub mod history;
pub mod simulate;
pub mod sound;
pub mod tui;
pub mod wallet;

// Crate-level exports - Game types (tic-tac-toe)
pub use games::tictactoe::ai::{RandomSource, ScriptedRandom, SeededRandom, choose_opponent_move};
pub use games::tictactoe::{
    AnyGame, Board, Difficulty, GameFinished, GameInProgress, GameOutcome, GameResult, GameSetup,
    Line, Mark, Move, MoveError, Position, Square, apply_opponent_move, apply_player_move,
    evaluate, legal_moves, new_game,
};

// Crate-level exports - Backends
pub use backend::{
    BackendError, ContractBackend, ContractClient, ContractError, GameSnapshot, LocalBackend,
    OpponentBackend, SimulatedContract,
};

// Crate-level exports - Configuration
pub use config::{AppConfig, ConfigError};

// Crate-level exports - History
pub use history::{
    AggregatedStats, GameHistory, GameRecord, HistoryError, JsonFileStore, KeyValueStore,
    MemoryStore, RecordResult,
};
