//! Opponent move selection for each difficulty tier.
//!
//! Every policy plays for the side to move on the board it is given. In a
//! normal game that is always the AI's `O`; self-play simply hands the same
//! function boards where `X` is to move.

mod heuristic;
mod minimax;
mod random;

pub use heuristic::{tactical_move, winning_move};
pub use minimax::{WIN_SCORE, best_move, score_moves};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};

use super::{Board, Difficulty, Position};
use tracing::{debug, instrument};

/// Chooses a move for the side to move under `difficulty`.
///
/// # Panics
///
/// Panics if the board has no empty square. Callers must check for a
/// terminal board first; asking for a move on a full board is a bug.
#[instrument(skip(board, rng), fields(to_move = %board.to_move()))]
pub fn choose_opponent_move(
    board: &Board,
    difficulty: Difficulty,
    rng: &mut dyn RandomSource,
) -> Position {
    let legal = Position::valid_moves(board);
    assert!(
        !legal.is_empty(),
        "choose_opponent_move called on a full board"
    );

    let choice = match difficulty {
        Difficulty::Easy => random_move(&legal, rng),
        Difficulty::Medium => {
            tactical_move(board, board.to_move()).unwrap_or_else(|| random_move(&legal, rng))
        }
        Difficulty::Hard => best_move(board).unwrap_or(legal[0]),
    };

    debug!(position = %choice, "Opponent chose move");
    choice
}

fn random_move(legal: &[Position], rng: &mut dyn RandomSource) -> Position {
    legal[rng.pick(legal.len())]
}
