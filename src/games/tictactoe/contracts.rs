//! Contract-based validation for tic-tac-toe.
//!
//! Contracts define correctness through preconditions and postconditions:
//! {P} action {Q}.

use super::action::{Move, MoveError};
use super::invariants::{InvariantSet, TicTacToeInvariants};
use super::typestate::GameInProgress;
use tracing::{instrument, warn};

/// A contract defines preconditions and postconditions for state transitions.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), MoveError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), MoveError>;
}

/// Precondition: The square at the move's position must be empty.
pub struct SquareIsEmpty;

impl SquareIsEmpty {
    /// Rejects moves onto occupied squares.
    pub fn check(mov: &Move, game: &GameInProgress) -> Result<(), MoveError> {
        if game.board().is_empty(mov.position) {
            Ok(())
        } else {
            Err(MoveError::SquareOccupied(mov.position))
        }
    }
}

/// Precondition: It must be the mark's turn.
pub struct PlayersTurn;

impl PlayersTurn {
    /// Rejects moves made out of turn.
    pub fn check(mov: &Move, game: &GameInProgress) -> Result<(), MoveError> {
        if mov.player == game.to_move() {
            Ok(())
        } else {
            Err(MoveError::WrongPlayer(mov.player))
        }
    }
}

/// Composite precondition: the square is empty and it's the mark's turn.
pub struct LegalMove;

impl LegalMove {
    /// Validates all preconditions for a move.
    pub fn check(mov: &Move, game: &GameInProgress) -> Result<(), MoveError> {
        SquareIsEmpty::check(mov, game)?;
        PlayersTurn::check(mov, game)?;
        Ok(())
    }
}

/// Contract for move actions.
///
/// Preconditions: square empty, mark's turn.
/// Postconditions: the [`TicTacToeInvariants`] set holds.
pub struct MoveContract;

impl Contract<GameInProgress, Move> for MoveContract {
    fn pre(game: &GameInProgress, action: &Move) -> Result<(), MoveError> {
        LegalMove::check(action, game)
    }

    fn post(_before: &GameInProgress, after: &GameInProgress) -> Result<(), MoveError> {
        TicTacToeInvariants::check_all(after).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            warn!(%descriptions, "Postcondition failed");
            MoveError::InvariantViolation(format!("Postcondition failed: {}", descriptions))
        })
    }
}

/// Asserts that all game invariants hold (debug builds only).
#[instrument(level = "trace", skip(game))]
pub fn assert_invariants(game: &GameInProgress) {
    debug_assert!(
        TicTacToeInvariants::check_all(game).is_ok(),
        "Game invariants violated"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::{Difficulty, GameResult, GameSetup, Mark, Position, Square};

    fn fresh() -> GameInProgress {
        GameSetup::new().start(Difficulty::Easy)
    }

    #[test]
    fn test_precondition_empty_square() {
        let action = Move::new(Mark::X, Position::Center);
        assert!(MoveContract::pre(&fresh(), &action).is_ok());
    }

    #[test]
    fn test_precondition_occupied_square() {
        let Ok(GameResult::InProgress(game)) = fresh().play(Position::Center) else {
            panic!("Expected in-progress game");
        };
        let action = Move::new(Mark::O, Position::Center);
        assert_eq!(
            MoveContract::pre(&game, &action),
            Err(MoveError::SquareOccupied(Position::Center))
        );
    }

    #[test]
    fn test_precondition_wrong_turn() {
        let action = Move::new(Mark::O, Position::Center);
        assert_eq!(
            MoveContract::pre(&fresh(), &action),
            Err(MoveError::WrongPlayer(Mark::O))
        );
    }

    #[test]
    fn test_postcondition_detects_corruption() {
        let before = fresh();
        let Ok(GameResult::InProgress(mut after)) = before.clone().play(Position::Center) else {
            panic!("Expected in-progress game");
        };
        assert!(MoveContract::post(&before, &after).is_ok());

        after.board.set(Position::TopLeft, Square::Occupied(Mark::O));
        assert!(matches!(
            MoveContract::post(&before, &after),
            Err(MoveError::InvariantViolation(_))
        ));
    }
}
