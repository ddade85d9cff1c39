//! In-process opponent.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::{BackendError, GameSnapshot, OpponentBackend};
use crate::games::tictactoe::ai::RandomSource;
use crate::games::tictactoe::{AnyGame, Difficulty, Mark, Position};

/// Runs the engine in-process, pausing before each reply for pacing.
pub struct LocalBackend {
    game: AnyGame,
    rng: Box<dyn RandomSource>,
    delay: Duration,
}

impl std::fmt::Debug for LocalBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalBackend")
            .field("game", &self.game)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl LocalBackend {
    /// Creates a backend drawing randomness from `rng` and waiting `delay`
    /// before every opponent reply.
    pub fn new(rng: impl RandomSource + 'static, delay: Duration) -> Self {
        Self {
            game: AnyGame::new(),
            rng: Box::new(rng),
            delay,
        }
    }

    /// The game as currently held.
    pub fn game(&self) -> &AnyGame {
        &self.game
    }

    fn snapshot_of(
        game: &AnyGame,
        player_move: Option<Position>,
        opponent_move: Option<Position>,
    ) -> Result<GameSnapshot, BackendError> {
        let difficulty = game.difficulty().ok_or(BackendError::NotStarted)?;
        Ok(GameSnapshot::new(
            game.board().clone(),
            difficulty,
            game.outcome(),
            player_move,
            opponent_move,
        ))
    }
}

#[async_trait]
impl OpponentBackend for LocalBackend {
    #[instrument(skip(self))]
    async fn start(&mut self, difficulty: Difficulty) -> Result<GameSnapshot, BackendError> {
        self.game = AnyGame::started(difficulty);
        info!(%difficulty, "Local game started");
        Self::snapshot_of(&self.game, None, None)
    }

    #[instrument(skip(self))]
    async fn play(&mut self, position: Position) -> Result<GameSnapshot, BackendError> {
        if self.game.difficulty().is_none() {
            return Err(BackendError::NotStarted);
        }
        let mut game = self.game.play(position)?;

        let mut reply = None;
        if game.to_move() == Some(Mark::OPPONENT) {
            tokio::time::sleep(self.delay).await;
            game = game.opponent_move(self.rng.as_mut())?;
            reply = game.history().last().map(|m| m.position);
            debug!(position = ?reply, "Opponent replied");
        }

        self.game = game;
        Self::snapshot_of(&self.game, Some(position), reply)
    }

    async fn snapshot(&self) -> Result<GameSnapshot, BackendError> {
        Self::snapshot_of(&self.game, None, None)
    }

    fn name(&self) -> &str {
        "Local AI"
    }
}
