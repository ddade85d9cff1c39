//! Board-level engine operations.
//!
//! These work on a bare [`Board`] and infer whose turn it is from the mark
//! counts, for callers that keep their own state instead of holding a
//! typestate game.

use super::action::MoveError;
use super::ai::{RandomSource, choose_opponent_move};
use super::rules::evaluate;
use super::typestate::{GameInProgress, GameSetup};
use super::{Board, Difficulty, Mark, Position};
use tracing::{debug, instrument};

/// Starts a game at `difficulty` on an empty board, player to move.
#[instrument]
pub fn new_game(difficulty: Difficulty) -> GameInProgress {
    GameSetup::new().start(difficulty)
}

/// Empty squares in ascending index order. Empty only on a full board.
pub fn legal_moves(board: &Board) -> Vec<Position> {
    Position::valid_moves(board)
}

/// Returns `board` with the player's X placed at `index`.
///
/// Rejects out-of-range indices, occupied squares, finished boards, and
/// boards where it is the opponent's turn. `board` itself is never changed.
#[instrument(skip(board))]
pub fn apply_player_move(board: &Board, index: usize) -> Result<Board, MoveError> {
    let position = Position::from_index(index).ok_or(MoveError::OutOfRange(index))?;

    if evaluate(board).is_terminal() {
        return Err(MoveError::GameOver);
    }
    if board.to_move() != Mark::PLAYER {
        return Err(MoveError::WrongPlayer(Mark::PLAYER));
    }
    if !board.is_empty(position) {
        return Err(MoveError::SquareOccupied(position));
    }

    debug!(%position, "Player move applied");
    Ok(board.with(position, Mark::PLAYER))
}

/// Returns `board` with the opponent's reply placed.
///
/// # Panics
///
/// Panics on a full board. The caller must only ask for a reply on a
/// non-terminal board where the opponent is to move.
#[instrument(skip(board, rng))]
pub fn apply_opponent_move(
    board: &Board,
    difficulty: Difficulty,
    rng: &mut dyn RandomSource,
) -> Board {
    debug_assert_eq!(board.to_move(), Mark::OPPONENT, "opponent moved out of turn");
    let position = choose_opponent_move(board, difficulty, rng);
    board.with(position, Mark::OPPONENT)
}
