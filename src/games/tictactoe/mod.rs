//! Tic-tac-toe: board, rules, AI opponent and game state machine.

pub mod ai;
mod action;
mod contracts;
mod engine;
mod invariants;
mod position;
pub mod rules;
mod types;
mod typestate;
mod wrapper;

pub use action::{InvalidMoveError, Move, MoveError};
pub use contracts::{Contract, LegalMove, MoveContract, PlayersTurn, SquareIsEmpty};
pub use engine::{apply_opponent_move, apply_player_move, legal_moves, new_game};
pub use invariants::{
    AlternatingTurnInvariant, Invariant, InvariantSet, InvariantViolation, MarkBalanceInvariant,
    MonotonicBoardInvariant, TicTacToeInvariants,
};
pub use position::Position;
pub use rules::{GameOutcome, Line, evaluate};
pub use types::{Board, Difficulty, Mark, Square};
pub use typestate::{GameFinished, GameInProgress, GameResult, GameSetup};
pub use wrapper::AnyGame;
