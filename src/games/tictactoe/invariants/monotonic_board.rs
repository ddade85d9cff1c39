//! Monotonic board invariant: squares never change once set.

use super::super::{Board, GameInProgress, Square};
use super::Invariant;

/// Invariant: Board squares are monotonic (never overwritten).
///
/// Replaying the move history onto an empty board must never hit an
/// occupied square and must reproduce the current board exactly.
pub struct MonotonicBoardInvariant;

impl Invariant<GameInProgress> for MonotonicBoardInvariant {
    fn holds(game: &GameInProgress) -> bool {
        let mut reconstructed = Board::new();

        for mov in game.history() {
            if !reconstructed.is_empty(mov.position) {
                return false;
            }
            reconstructed.set(mov.position, Square::Occupied(mov.player));
        }

        reconstructed == *game.board()
    }

    fn description() -> &'static str {
        "Board squares are monotonic (never overwritten)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::{Difficulty, GameResult, GameSetup, Mark, Position};

    #[test]
    fn test_empty_game_holds() {
        let game = GameSetup::new().start(Difficulty::Easy);
        assert!(MonotonicBoardInvariant::holds(&game));
    }

    #[test]
    fn test_corrupted_board_violates() {
        let game = GameSetup::new().start(Difficulty::Easy);
        let Ok(GameResult::InProgress(mut game)) = game.play(Position::Center) else {
            panic!("Expected in-progress game");
        };
        game.board.set(Position::Center, Square::Occupied(Mark::O));
        assert!(!MonotonicBoardInvariant::holds(&game));
    }
}
