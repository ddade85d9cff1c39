//! Where the opponent's reply is computed.
//!
//! The front end talks to an [`OpponentBackend`] and never learns whether
//! the AI runs in-process ([`LocalBackend`]) or behind a game contract
//! ([`ContractBackend`]). Calls are fire-and-wait: there are no retries,
//! and failures go straight back to the caller.

mod chain;
mod error;
mod local;
mod simulated;

pub use chain::{
    ChainGameEvent, ChainStatus, ContractBackend, ContractClient, OnChainGame, encode_board,
    map_board,
};
pub use error::{BackendError, ContractError};
pub use local::LocalBackend;
pub use simulated::SimulatedContract;

use async_trait::async_trait;
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::games::tictactoe::{Board, Difficulty, GameOutcome, Position};

/// State of a game after a backend call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct GameSnapshot {
    board: Board,
    difficulty: Difficulty,
    outcome: GameOutcome,
    /// The player's move that produced this snapshot, if any.
    player_move: Option<Position>,
    /// The opponent's reply in this snapshot, if any.
    opponent_move: Option<Position>,
}

impl GameSnapshot {
    /// True once the game has a winner or is drawn.
    pub fn is_over(&self) -> bool {
        self.outcome.is_terminal()
    }
}

/// Capability set shared by local and remote opponents.
#[async_trait]
pub trait OpponentBackend: Send {
    /// Starts a fresh game at `difficulty`, abandoning any current one.
    async fn start(&mut self, difficulty: Difficulty) -> Result<GameSnapshot, BackendError>;

    /// Plays the human's move and, unless that ended the game, the
    /// opponent's reply.
    async fn play(&mut self, position: Position) -> Result<GameSnapshot, BackendError>;

    /// Current state without moving.
    async fn snapshot(&self) -> Result<GameSnapshot, BackendError>;

    /// Short label for status lines and logs.
    fn name(&self) -> &str;
}
