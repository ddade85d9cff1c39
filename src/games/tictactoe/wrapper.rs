//! Serializable game wrapper for typestate phases.

use super::action::{Move, MoveError};
use super::ai::RandomSource;
use super::rules::GameOutcome;
use super::typestate::{GameFinished, GameInProgress, GameResult, GameSetup};
use super::{Board, Difficulty, Mark, Position};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Serializable wrapper for a game in any phase.
///
/// Typestate phases are consumed on every transition; this enum is what
/// sessions and the UI hold between transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnyGame {
    /// Waiting for a difficulty to be chosen.
    SelectingDifficulty {
        /// Always empty.
        board: Board,
    },
    /// Game in progress.
    InProgress {
        /// The board state.
        board: Board,
        /// Difficulty chosen for this game.
        difficulty: Difficulty,
        /// Mark to move.
        to_move: Mark,
        /// Moves so far.
        history: Vec<Move>,
    },
    /// Game over.
    Finished {
        /// The board state.
        board: Board,
        /// Difficulty the game was played at.
        difficulty: Difficulty,
        /// `Win` or `Draw`.
        outcome: GameOutcome,
        /// Moves played.
        history: Vec<Move>,
    },
}

impl From<GameSetup> for AnyGame {
    fn from(game: GameSetup) -> Self {
        AnyGame::SelectingDifficulty {
            board: game.board().clone(),
        }
    }
}

impl From<GameInProgress> for AnyGame {
    fn from(game: GameInProgress) -> Self {
        AnyGame::InProgress {
            board: game.board,
            difficulty: game.difficulty,
            to_move: game.to_move,
            history: game.history,
        }
    }
}

impl From<GameFinished> for AnyGame {
    fn from(game: GameFinished) -> Self {
        AnyGame::Finished {
            board: game.board().clone(),
            difficulty: game.difficulty(),
            outcome: *game.outcome(),
            history: game.history().to_vec(),
        }
    }
}

impl From<GameResult> for AnyGame {
    fn from(result: GameResult) -> Self {
        match result {
            GameResult::InProgress(g) => g.into(),
            GameResult::Finished(g) => g.into(),
        }
    }
}

impl Default for AnyGame {
    fn default() -> Self {
        GameSetup::new().into()
    }
}

impl AnyGame {
    /// A fresh game in difficulty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh game already started at `difficulty`.
    pub fn started(difficulty: Difficulty) -> Self {
        GameSetup::new().start(difficulty).into()
    }

    /// Returns the board for any game phase.
    pub fn board(&self) -> &Board {
        match self {
            AnyGame::SelectingDifficulty { board } => board,
            AnyGame::InProgress { board, .. } => board,
            AnyGame::Finished { board, .. } => board,
        }
    }

    /// Difficulty of the current game, if one has been chosen.
    pub fn difficulty(&self) -> Option<Difficulty> {
        match self {
            AnyGame::SelectingDifficulty { .. } => None,
            AnyGame::InProgress { difficulty, .. } | AnyGame::Finished { difficulty, .. } => {
                Some(*difficulty)
            }
        }
    }

    /// Move history.
    pub fn history(&self) -> &[Move] {
        match self {
            AnyGame::SelectingDifficulty { .. } => &[],
            AnyGame::InProgress { history, .. } | AnyGame::Finished { history, .. } => history,
        }
    }

    /// Outcome of the board.
    pub fn outcome(&self) -> GameOutcome {
        match self {
            AnyGame::Finished { outcome, .. } => *outcome,
            _ => GameOutcome::InProgress,
        }
    }

    /// Returns true if the game is over.
    pub fn is_over(&self) -> bool {
        matches!(self, AnyGame::Finished { .. })
    }

    /// Returns the mark to move, if the game is in progress.
    pub fn to_move(&self) -> Option<Mark> {
        match self {
            AnyGame::InProgress { to_move, .. } => Some(*to_move),
            _ => None,
        }
    }

    /// True when the human may place a mark.
    pub fn is_player_turn(&self) -> bool {
        self.to_move() == Some(Mark::PLAYER)
    }

    /// Returns a status string for display.
    pub fn status_string(&self) -> String {
        match self {
            AnyGame::SelectingDifficulty { .. } => "Select difficulty".to_string(),
            AnyGame::InProgress { to_move: Mark::X, .. } => "Your Turn (X)".to_string(),
            AnyGame::InProgress { to_move: Mark::O, .. } => "AI's Turn (O)...".to_string(),
            AnyGame::Finished { outcome, .. } => match outcome.winner() {
                Some(Mark::X) => "You Win!".to_string(),
                Some(Mark::O) => "AI Wins!".to_string(),
                None => "It's a Draw!".to_string(),
            },
        }
    }

    /// Back to difficulty selection with an empty board.
    pub fn reset(&self) -> Self {
        Self::new()
    }

    /// A fresh game at the same difficulty, or selection if none was chosen.
    pub fn restart(&self) -> Self {
        match self.difficulty() {
            Some(difficulty) => Self::started(difficulty),
            None => Self::new(),
        }
    }

    /// Places the human's mark at a board index (0-8).
    ///
    /// On error `self` is untouched.
    #[instrument(skip(self))]
    pub fn play_index(&self, index: usize) -> Result<Self, MoveError> {
        let position = Position::from_index(index).ok_or(MoveError::OutOfRange(index))?;
        self.play(position)
    }

    /// Places the human's mark.
    ///
    /// On error `self` is untouched.
    #[instrument(skip(self))]
    pub fn play(&self, position: Position) -> Result<Self, MoveError> {
        let game = self.in_progress()?;
        let result = game.play(position).inspect_err(|e| {
            warn!(error = %e, "Rejected player move");
        })?;
        debug!(%position, "Player move applied");
        Ok(result.into())
    }

    /// Lets the AI reply.
    ///
    /// Fails with [`MoveError::WrongPlayer`] when it is the human's turn,
    /// and [`MoveError::GameOver`] after the game has finished.
    #[instrument(skip(self, rng))]
    pub fn opponent_move(&self, rng: &mut dyn RandomSource) -> Result<Self, MoveError> {
        let game = self.in_progress()?;
        if game.to_move() != Mark::OPPONENT {
            return Err(MoveError::WrongPlayer(Mark::OPPONENT));
        }
        Ok(game.opponent_move(rng).into())
    }

    fn in_progress(&self) -> Result<GameInProgress, MoveError> {
        match self {
            AnyGame::InProgress {
                board,
                difficulty,
                to_move,
                history,
            } => Ok(GameInProgress {
                board: board.clone(),
                history: history.clone(),
                to_move: *to_move,
                difficulty: *difficulty,
            }),
            AnyGame::SelectingDifficulty { .. } | AnyGame::Finished { .. } => {
                Err(MoveError::GameOver)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::ai::ScriptedRandom;

    #[test]
    fn test_rejected_move_leaves_game_unchanged() {
        let game = AnyGame::started(Difficulty::Easy).play(Position::Center).unwrap();
        let game = game.opponent_move(&mut ScriptedRandom::new([0])).unwrap();
        let snapshot = game.clone();

        assert_eq!(
            game.play(Position::Center),
            Err(MoveError::SquareOccupied(Position::Center))
        );
        assert_eq!(game, snapshot);
    }

    #[test]
    fn test_player_cannot_move_twice() {
        let game = AnyGame::started(Difficulty::Easy).play(Position::Center).unwrap();
        assert_eq!(
            game.play(Position::TopLeft),
            Err(MoveError::WrongPlayer(Mark::X))
        );
    }

    #[test]
    fn test_selecting_difficulty_accepts_no_moves() {
        assert_eq!(AnyGame::new().play_index(4), Err(MoveError::GameOver));
        assert_eq!(
            AnyGame::started(Difficulty::Easy).play_index(9),
            Err(MoveError::OutOfRange(9))
        );
    }

    #[test]
    fn test_restart_keeps_difficulty_and_reset_drops_it() {
        let game = AnyGame::started(Difficulty::Medium).play(Position::Center).unwrap();
        let restarted = game.restart();
        assert_eq!(restarted.difficulty(), Some(Difficulty::Medium));
        assert!(restarted.history().is_empty());
        assert_eq!(game.reset().difficulty(), None);
    }

    #[test]
    fn test_status_strings() {
        let game = AnyGame::started(Difficulty::Easy);
        assert_eq!(game.status_string(), "Your Turn (X)");
        let game = game.play(Position::Center).unwrap();
        assert_eq!(game.status_string(), "AI's Turn (O)...");
    }

    #[test]
    fn test_serde_roundtrip_preserves_phase() {
        let game = AnyGame::started(Difficulty::Hard).play(Position::TopLeft).unwrap();
        let json = serde_json::to_string(&game).unwrap();
        let back: AnyGame = serde_json::from_str(&json).unwrap();
        assert_eq!(back, game);
    }
}
