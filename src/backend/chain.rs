//! Opponent resolved by a remote game contract.
//!
//! The contract stores boards as `u8` cells and reports game state as a
//! status byte. This module maps those wire values onto engine types and
//! drives a game through a [`ContractClient`].

use async_trait::async_trait;
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::{BackendError, ContractError, GameSnapshot, OpponentBackend};
use crate::games::tictactoe::{
    Board, Difficulty, GameOutcome, Mark, Position, Square, evaluate,
};
use crate::history::RecordResult;

/// Game struct as returned by the contract's `getGame`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnChainGame {
    /// Cells, `0` empty, `1` X, `2` O.
    pub board: [u8; 9],
    /// Address that created the game.
    pub player: String,
    /// See [`ChainStatus`].
    pub status: u8,
    /// See [`Difficulty::to_u8`].
    pub difficulty: u8,
    /// Marks placed so far.
    pub move_count: u8,
}

/// Game status as encoded by the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChainStatus {
    /// Still being played.
    InProgress = 0,
    /// X has three in a row.
    PlayerWon = 1,
    /// O has three in a row.
    AiWon = 2,
    /// Full board, no winner.
    Draw = 3,
}

impl ChainStatus {
    /// Decodes a status byte.
    pub fn from_u8(value: u8) -> Result<Self, ContractError> {
        match value {
            0 => Ok(ChainStatus::InProgress),
            1 => Ok(ChainStatus::PlayerWon),
            2 => Ok(ChainStatus::AiWon),
            3 => Ok(ChainStatus::Draw),
            other => Err(ContractError::InvalidStatus(other)),
        }
    }

    /// Status byte for an outcome.
    pub fn from_outcome(outcome: &GameOutcome) -> Self {
        match outcome {
            GameOutcome::InProgress => ChainStatus::InProgress,
            GameOutcome::Win { mark: Mark::X, .. } => ChainStatus::PlayerWon,
            GameOutcome::Win { mark: Mark::O, .. } => ChainStatus::AiWon,
            GameOutcome::Draw => ChainStatus::Draw,
        }
    }

    /// Result from the player's side, `None` while in progress.
    pub fn result(self) -> Option<RecordResult> {
        match self {
            ChainStatus::InProgress => None,
            ChainStatus::PlayerWon => Some(RecordResult::Win),
            ChainStatus::AiWon => Some(RecordResult::Loss),
            ChainStatus::Draw => Some(RecordResult::Draw),
        }
    }
}

/// Decodes contract cells into a board.
///
/// # Errors
///
/// Returns [`ContractError::InvalidCell`] for any value other than 0, 1, 2.
pub fn map_board(cells: &[u8; 9]) -> Result<Board, ContractError> {
    let mut squares = [Square::Empty; 9];
    for (square, cell) in squares.iter_mut().zip(cells) {
        *square = match cell {
            0 => Square::Empty,
            1 => Square::Occupied(Mark::X),
            2 => Square::Occupied(Mark::O),
            other => return Err(ContractError::InvalidCell(*other)),
        };
    }
    Ok(Board::from_squares(squares))
}

/// Encodes a board as contract cells.
pub fn encode_board(board: &Board) -> [u8; 9] {
    let squares = *board.squares();
    squares.map(|square| match square {
        Square::Empty => 0,
        Square::Occupied(Mark::X) => 1,
        Square::Occupied(Mark::O) => 2,
    })
}

/// One `GameFinished` event seen for an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
#[serde(rename_all = "camelCase")]
pub struct ChainGameEvent {
    /// `"{game_id}-{transaction_hash}"`.
    id: String,
    game_id: u64,
    result: RecordResult,
    transaction_hash: String,
}

/// Procedure boundary of the game contract.
///
/// One implementation per transport; the signing account is fixed per
/// client.
#[async_trait]
pub trait ContractClient: Send + Sync {
    /// Creates a game and returns its id.
    async fn create_game(&self, difficulty: Difficulty) -> Result<u64, ContractError>;

    /// Plays the caller's mark at `position` (0-8). The contract answers
    /// with the AI's mark in the same call unless the game ended.
    async fn player_move(&self, game_id: u64, position: u8) -> Result<(), ContractError>;

    /// Reads a game.
    async fn get_game(&self, game_id: u64) -> Result<OnChainGame, ContractError>;

    /// Unfinished game of `address`, `0` if none.
    async fn active_game_id(&self, address: &str) -> Result<u64, ContractError>;

    /// Id the next created game will get.
    async fn next_game_id(&self) -> Result<u64, ContractError>;

    /// Finished games of `address`, newest first.
    async fn game_history(&self, address: &str) -> Result<Vec<ChainGameEvent>, ContractError>;
}

/// [`OpponentBackend`] over a [`ContractClient`].
#[derive(Debug)]
pub struct ContractBackend<C> {
    client: C,
    address: String,
    game_id: Option<u64>,
}

impl<C: ContractClient> ContractBackend<C> {
    /// Creates a backend acting for `address`.
    pub fn new(client: C, address: impl Into<String>) -> Self {
        Self {
            client,
            address: address.into(),
            game_id: None,
        }
    }

    /// The underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Id of the game being played, if any.
    pub fn game_id(&self) -> Option<u64> {
        self.game_id
    }

    /// Picks up the address's unfinished game, if there is one.
    #[instrument(skip(self), fields(address = %self.address))]
    pub async fn resume(&mut self) -> Result<Option<GameSnapshot>, BackendError> {
        let id = self.client.active_game_id(&self.address).await?;
        if id == 0 {
            debug!("No active game to resume");
            return Ok(None);
        }
        self.game_id = Some(id);
        info!(game_id = id, "Resumed active game");
        let game = self.client.get_game(id).await?;
        Ok(Some(Self::decode(&game, None, None)?))
    }

    /// Finished games of this backend's address, newest first.
    pub async fn history(&self) -> Result<Vec<ChainGameEvent>, BackendError> {
        Ok(self.client.game_history(&self.address).await?)
    }

    fn current(&self) -> Result<u64, BackendError> {
        self.game_id.ok_or(BackendError::NotStarted)
    }

    fn decode(
        game: &OnChainGame,
        player_move: Option<Position>,
        opponent_move: Option<Position>,
    ) -> Result<GameSnapshot, BackendError> {
        let board = map_board(&game.board)?;
        let difficulty = Difficulty::from_u8(game.difficulty)
            .ok_or(ContractError::InvalidDifficulty(game.difficulty))?;
        let status = ChainStatus::from_u8(game.status)?;

        let outcome = evaluate(&board);
        if ChainStatus::from_outcome(&outcome) != status {
            warn!(?status, %outcome, "Contract status disagrees with board");
        }

        Ok(GameSnapshot::new(
            board,
            difficulty,
            outcome,
            player_move,
            opponent_move,
        ))
    }
}

#[async_trait]
impl<C: ContractClient> OpponentBackend for ContractBackend<C> {
    #[instrument(skip(self), fields(address = %self.address))]
    async fn start(&mut self, difficulty: Difficulty) -> Result<GameSnapshot, BackendError> {
        let id = self.client.create_game(difficulty).await?;
        self.game_id = Some(id);
        info!(game_id = id, "Contract game created");
        let game = self.client.get_game(id).await?;
        Self::decode(&game, None, None)
    }

    #[instrument(skip(self), fields(address = %self.address, game_id = ?self.game_id))]
    async fn play(&mut self, position: Position) -> Result<GameSnapshot, BackendError> {
        let id = self.current()?;
        let before = map_board(&self.client.get_game(id).await?.board)?;

        // Index is 0-8 so the cast is lossless.
        self.client.player_move(id, position.to_index() as u8).await?;
        let game = self.client.get_game(id).await?;
        let after = map_board(&game.board)?;

        let reply = Position::ALL.into_iter().find(|pos| {
            before.is_empty(*pos) && after.get(*pos) == Square::Occupied(Mark::OPPONENT)
        });
        debug!(position = ?reply, "Contract replied");

        Self::decode(&game, Some(position), reply)
    }

    async fn snapshot(&self) -> Result<GameSnapshot, BackendError> {
        let game = self.client.get_game(self.current()?).await?;
        Self::decode(&game, None, None)
    }

    fn name(&self) -> &str {
        "Contract AI"
    }
}
