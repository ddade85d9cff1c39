//! Backend error types.

use derive_more::{Display, Error, From};

use crate::games::tictactoe::MoveError;

/// Failure reported by the game contract or its transport.
///
/// The first four variants mirror the contract's custom errors.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ContractError {
    /// The game has already finished.
    #[display("Game is already over")]
    GameAlreadyOver,
    /// The square is taken or out of range.
    #[display("Invalid move")]
    InvalidMove,
    /// No game exists for the caller.
    #[display("No active game")]
    NoActiveGame,
    /// The caller is not the game's player.
    #[display("Not your turn")]
    NotYourTurn,
    /// A board cell held a value other than 0, 1 or 2.
    #[display("Unknown cell value {}", _0)]
    InvalidCell(#[error(not(source))] u8),
    /// A game status other than 0-3.
    #[display("Unknown game status {}", _0)]
    InvalidStatus(#[error(not(source))] u8),
    /// A difficulty other than 0-2.
    #[display("Unknown difficulty {}", _0)]
    InvalidDifficulty(#[error(not(source))] u8),
    /// The call never reached the contract or its reply was lost.
    #[display("Transport error: {}", _0)]
    Transport(#[error(not(source))] String),
}

/// Error from an [`OpponentBackend`](super::OpponentBackend).
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum BackendError {
    /// The engine rejected the player's move.
    #[display("Invalid move: {}", _0)]
    Move(MoveError),
    /// The remote contract failed.
    #[display("Contract call failed: {}", _0)]
    Contract(ContractError),
    /// `play` or `snapshot` before `start`.
    #[display("No game has been started")]
    #[from(ignore)]
    NotStarted,
}
