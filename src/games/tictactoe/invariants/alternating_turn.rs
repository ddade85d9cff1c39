//! Alternating turn invariant: X, O, X, O, ...

use super::super::{GameInProgress, Mark};
use super::Invariant;

/// Invariant: marks alternate, X first, and `to_move` follows the history.
pub struct AlternatingTurnInvariant;

impl Invariant<GameInProgress> for AlternatingTurnInvariant {
    fn holds(game: &GameInProgress) -> bool {
        let history = game.history();

        if history.first().is_some_and(|m| m.player != Mark::X) {
            return false;
        }

        if history.windows(2).any(|w| w[0].player == w[1].player) {
            return false;
        }

        let expected_next = if history.len() % 2 == 0 { Mark::X } else { Mark::O };
        game.to_move() == expected_next
    }

    fn description() -> &'static str {
        "Players alternate turns (X, O, X, O, ...)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::{Difficulty, GameResult, GameSetup, Move, Position};

    #[test]
    fn test_alternating_sequence_holds() {
        let moves = vec![
            Move::new(Mark::X, Position::TopLeft),
            Move::new(Mark::O, Position::Center),
            Move::new(Mark::X, Position::TopRight),
            Move::new(Mark::O, Position::BottomLeft),
            Move::new(Mark::X, Position::BottomRight),
        ];

        match GameInProgress::replay(Difficulty::Easy, &moves) {
            Ok(GameResult::InProgress(game)) => {
                assert!(AlternatingTurnInvariant::holds(&game));
                assert_eq!(game.to_move(), Mark::O);
            }
            other => panic!("Expected in-progress game, got {:?}", other),
        }
    }

    #[test]
    fn test_stale_to_move_violates() {
        let game = GameSetup::new().start(Difficulty::Easy);
        let Ok(GameResult::InProgress(mut game)) = game.play(Position::Center) else {
            panic!("Expected in-progress game");
        };
        game.to_move = Mark::X;
        assert!(!AlternatingTurnInvariant::holds(&game));
    }
}
