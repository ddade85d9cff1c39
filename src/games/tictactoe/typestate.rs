//! Phase-specific typestate structs for tic-tac-toe.
//!
//! Each phase is its own distinct type with phase-specific fields.
//! A `GameFinished` ALWAYS has a terminal outcome, not `Option<Outcome>`.

use super::action::{Move, MoveError};
use super::ai::{RandomSource, choose_opponent_move};
use super::contracts::{Contract, MoveContract, assert_invariants};
use super::rules::{GameOutcome, evaluate};
use super::{Board, Difficulty, Mark, Position, Square};
use tracing::{debug, instrument};

// ─────────────────────────────────────────────────────────────
//  Setup Phase
// ─────────────────────────────────────────────────────────────

/// Game waiting for a difficulty to be chosen.
///
/// The board is always empty.
#[derive(Debug, Clone)]
pub struct GameSetup {
    board: Board,
}

impl GameSetup {
    /// Creates a new game in setup phase.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Starts the game at `difficulty`; the player (X) moves first.
    #[instrument(skip(self))]
    pub fn start(self, difficulty: Difficulty) -> GameInProgress {
        GameInProgress {
            board: self.board,
            history: Vec::new(),
            to_move: Mark::PLAYER,
            difficulty,
        }
    }
}

impl Default for GameSetup {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────
//  InProgress Phase
// ─────────────────────────────────────────────────────────────

/// Game in progress - can accept moves.
#[derive(Debug, Clone)]
pub struct GameInProgress {
    pub(super) board: Board,
    pub(super) history: Vec<Move>,
    pub(super) to_move: Mark,
    pub(super) difficulty: Difficulty,
}

impl GameInProgress {
    /// Makes a move, consuming self and transitioning to next state.
    ///
    /// Preconditions are always checked; postconditions only in debug
    /// builds. On error the game is dropped, so callers that need to keep
    /// it should validate first or clone.
    #[instrument(skip(self), fields(difficulty = %self.difficulty))]
    pub fn make_move(self, action: Move) -> Result<GameResult, MoveError> {
        MoveContract::pre(&self, &action)?;

        #[cfg(debug_assertions)]
        let before = self.clone();

        let mut game = self;
        game.board.set(action.position, Square::Occupied(action.player));
        game.history.push(action);

        let outcome = evaluate(&game.board);
        if outcome.is_terminal() {
            debug!(%outcome, "Game finished");
            return Ok(GameResult::Finished(GameFinished {
                board: game.board,
                history: game.history,
                difficulty: game.difficulty,
                outcome,
            }));
        }

        game.to_move = game.to_move.opponent();

        #[cfg(debug_assertions)]
        MoveContract::post(&before, &game)?;

        assert_invariants(&game);

        Ok(GameResult::InProgress(game))
    }

    /// Places the human player's mark.
    pub fn play(self, position: Position) -> Result<GameResult, MoveError> {
        self.make_move(Move::new(Mark::PLAYER, position))
    }

    /// Lets the AI choose and place its mark under the game's difficulty.
    ///
    /// # Panics
    ///
    /// Panics if it is not the opponent's turn.
    #[instrument(skip(self, rng), fields(difficulty = %self.difficulty))]
    pub fn opponent_move(self, rng: &mut dyn RandomSource) -> GameResult {
        assert_eq!(self.to_move, Mark::OPPONENT, "opponent moved out of turn");
        let position = choose_opponent_move(&self.board, self.difficulty, rng);
        match self.make_move(Move::new(Mark::OPPONENT, position)) {
            Ok(result) => result,
            Err(e) => unreachable!("AI chose an illegal move: {e}"),
        }
    }

    /// Returns the current mark to move.
    pub fn to_move(&self) -> Mark {
        self.to_move
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns move history.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Returns the difficulty this game was started with.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Returns valid positions.
    pub fn valid_moves(&self) -> Vec<Position> {
        Position::valid_moves(&self.board)
    }

    /// Replays moves from a fresh game at `difficulty`.
    ///
    /// Moves after the game finishes are rejected with
    /// [`MoveError::GameOver`].
    #[instrument(skip(moves), fields(moves = moves.len()))]
    pub fn replay(difficulty: Difficulty, moves: &[Move]) -> Result<GameResult, MoveError> {
        let mut result = GameResult::InProgress(GameSetup::new().start(difficulty));

        for action in moves {
            result = match result {
                GameResult::InProgress(game) => game.make_move(*action)?,
                GameResult::Finished(_) => return Err(MoveError::GameOver),
            };
        }

        Ok(result)
    }
}

// ─────────────────────────────────────────────────────────────
//  Finished Phase
// ─────────────────────────────────────────────────────────────

/// Game finished - outcome determined.
///
/// The outcome is always `Win` or `Draw`.
#[derive(Debug, Clone)]
pub struct GameFinished {
    board: Board,
    history: Vec<Move>,
    difficulty: Difficulty,
    outcome: GameOutcome,
}

impl GameFinished {
    /// Returns the outcome.
    pub fn outcome(&self) -> &GameOutcome {
        &self.outcome
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns move history.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Returns the difficulty the game was played at.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Restarts the game (consumes finished, returns setup).
    pub fn restart(self) -> GameSetup {
        GameSetup::new()
    }
}

// ─────────────────────────────────────────────────────────────
//  Result Type
// ─────────────────────────────────────────────────────────────

/// Result of making a move.
#[derive(Debug, Clone)]
pub enum GameResult {
    /// Game continues.
    InProgress(GameInProgress),
    /// Game finished.
    Finished(GameFinished),
}

impl GameResult {
    /// Board after the move.
    pub fn board(&self) -> &Board {
        match self {
            GameResult::InProgress(g) => g.board(),
            GameResult::Finished(g) => g.board(),
        }
    }

    /// Outcome after the move.
    pub fn outcome(&self) -> GameOutcome {
        match self {
            GameResult::InProgress(_) => GameOutcome::InProgress,
            GameResult::Finished(g) => *g.outcome(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::ai::ScriptedRandom;

    #[test]
    fn test_opponent_replies_on_its_turn() {
        let game = GameSetup::new().start(Difficulty::Hard);
        let GameResult::InProgress(game) = game.play(Position::Center).unwrap() else {
            panic!("one move cannot finish a game");
        };
        let GameResult::InProgress(game) = game.opponent_move(&mut ScriptedRandom::default()) else {
            panic!("two moves cannot finish a game");
        };
        assert_eq!(game.history().len(), 2);
        assert_eq!(game.to_move(), Mark::X);
        assert_eq!(game.board().count(Mark::O), 1);
    }

    #[test]
    #[should_panic(expected = "out of turn")]
    fn test_opponent_cannot_move_first() {
        let game = GameSetup::new().start(Difficulty::Easy);
        game.opponent_move(&mut ScriptedRandom::default());
    }

    #[test]
    fn test_replay_rejects_moves_after_finish() {
        let moves = [
            Move::new(Mark::X, Position::TopLeft),
            Move::new(Mark::O, Position::Center),
            Move::new(Mark::X, Position::TopCenter),
            Move::new(Mark::O, Position::BottomLeft),
            Move::new(Mark::X, Position::TopRight),
            Move::new(Mark::O, Position::BottomRight),
        ];
        assert_eq!(
            GameInProgress::replay(Difficulty::Easy, &moves).unwrap_err(),
            MoveError::GameOver
        );
    }
}
