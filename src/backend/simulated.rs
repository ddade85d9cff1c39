//! In-process stand-in for the game contract.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, instrument};

use super::chain::{
    ChainGameEvent, ChainStatus, ContractClient, OnChainGame, encode_board, map_board,
};
use super::ContractError;
use crate::games::tictactoe::ai::{RandomSource, choose_opponent_move};
use crate::games::tictactoe::{Difficulty, Mark, Position, evaluate};

struct Chain {
    next_game_id: u64,
    games: HashMap<u64, OnChainGame>,
    active: HashMap<String, u64>,
    /// Finished games, newest first.
    events: Vec<(String, ChainGameEvent)>,
    tx_count: u64,
    rng: Box<dyn RandomSource>,
}

impl Chain {
    fn next_tx_hash(&mut self) -> String {
        self.tx_count += 1;
        format!("0x{:064x}", self.tx_count)
    }
}

/// [`ContractClient`] that runs the contract's rules against the local
/// engine.
///
/// Clones made with [`SimulatedContract::with_sender`] share one chain, so
/// several accounts can play against the same state.
#[derive(Clone)]
pub struct SimulatedContract {
    chain: Arc<Mutex<Chain>>,
    sender: String,
}

impl std::fmt::Debug for SimulatedContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedContract")
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}

impl SimulatedContract {
    /// Fresh chain whose AI draws from `rng`, signing as `sender`.
    pub fn new(sender: impl Into<String>, rng: impl RandomSource + 'static) -> Self {
        Self {
            chain: Arc::new(Mutex::new(Chain {
                next_game_id: 1,
                games: HashMap::new(),
                active: HashMap::new(),
                events: Vec::new(),
                tx_count: 0,
                rng: Box::new(rng),
            })),
            sender: sender.into(),
        }
    }

    /// Client for the same chain signing as `sender`.
    pub fn with_sender(&self, sender: impl Into<String>) -> Self {
        Self {
            chain: Arc::clone(&self.chain),
            sender: sender.into(),
        }
    }

    /// Address this client signs as.
    pub fn sender(&self) -> &str {
        &self.sender
    }

    fn lock(&self) -> MutexGuard<'_, Chain> {
        self.chain
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn account(address: &str) -> String {
        address.to_lowercase()
    }

    fn finish(chain: &mut Chain, game_id: u64, status: ChainStatus) {
        let Some(game) = chain.games.get_mut(&game_id) else {
            return;
        };
        game.status = status as u8;
        let player = Self::account(&game.player);
        chain.active.remove(&player);

        let Some(result) = status.result() else {
            return;
        };
        let tx = chain.next_tx_hash();
        let event = ChainGameEvent::new(format!("{}-{}", game_id, tx), game_id, result, tx);
        info!(game_id, %result, "Game finished on chain");
        chain.events.insert(0, (player, event));
    }
}

#[async_trait]
impl ContractClient for SimulatedContract {
    #[instrument(skip(self), fields(sender = %self.sender))]
    async fn create_game(&self, difficulty: Difficulty) -> Result<u64, ContractError> {
        let mut chain = self.lock();
        let id = chain.next_game_id;
        chain.next_game_id += 1;
        chain.games.insert(
            id,
            OnChainGame {
                board: [0; 9],
                player: self.sender.clone(),
                status: ChainStatus::InProgress as u8,
                difficulty: difficulty.to_u8(),
                move_count: 0,
            },
        );
        chain.active.insert(Self::account(&self.sender), id);
        info!(game_id = id, "Game created");
        Ok(id)
    }

    #[instrument(skip(self), fields(sender = %self.sender))]
    async fn player_move(&self, game_id: u64, position: u8) -> Result<(), ContractError> {
        let mut chain = self.lock();
        let chain = &mut *chain;
        let game = chain
            .games
            .get_mut(&game_id)
            .ok_or(ContractError::NoActiveGame)?;

        if Self::account(&game.player) != Self::account(&self.sender) {
            return Err(ContractError::NotYourTurn);
        }
        if game.status != ChainStatus::InProgress as u8 {
            return Err(ContractError::GameAlreadyOver);
        }
        let index = usize::from(position);
        if game.board.get(index) != Some(&0) {
            return Err(ContractError::InvalidMove);
        }
        let difficulty = Difficulty::from_u8(game.difficulty)
            .ok_or(ContractError::InvalidDifficulty(game.difficulty))?;

        game.board[index] = 1;
        game.move_count += 1;
        let board = map_board(&game.board)?;
        let outcome = evaluate(&board);
        if outcome.is_terminal() {
            Self::finish(chain, game_id, ChainStatus::from_outcome(&outcome));
            return Ok(());
        }

        let reply: Position = choose_opponent_move(&board, difficulty, chain.rng.as_mut());
        let board = board.with(reply, Mark::OPPONENT);
        game.board = encode_board(&board);
        game.move_count += 1;
        debug!(%reply, "AI moved");

        let outcome = evaluate(&board);
        if outcome.is_terminal() {
            Self::finish(chain, game_id, ChainStatus::from_outcome(&outcome));
        }
        Ok(())
    }

    async fn get_game(&self, game_id: u64) -> Result<OnChainGame, ContractError> {
        self.lock()
            .games
            .get(&game_id)
            .cloned()
            .ok_or(ContractError::NoActiveGame)
    }

    async fn active_game_id(&self, address: &str) -> Result<u64, ContractError> {
        Ok(self
            .lock()
            .active
            .get(&Self::account(address))
            .copied()
            .unwrap_or(0))
    }

    async fn next_game_id(&self) -> Result<u64, ContractError> {
        Ok(self.lock().next_game_id)
    }

    async fn game_history(&self, address: &str) -> Result<Vec<ChainGameEvent>, ContractError> {
        let account = Self::account(address);
        Ok(self
            .lock()
            .events
            .iter()
            .filter(|(player, _)| *player == account)
            .map(|(_, event)| event.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::ai::ScriptedRandom;
    use crate::history::RecordResult;

    const ALICE: &str = "0xA11CE00000000000000000000000000000000001";
    const BOB: &str = "0xB0B0000000000000000000000000000000000002";

    #[tokio::test]
    async fn test_ai_replies_in_same_call() {
        let chain = SimulatedContract::new(ALICE, ScriptedRandom::new([0]));
        let id = chain.create_game(Difficulty::Easy).await.unwrap();
        assert_eq!(id, 1);
        assert_eq!(chain.next_game_id().await.unwrap(), 2);

        chain.player_move(id, 4).await.unwrap();
        let game = chain.get_game(id).await.unwrap();
        assert_eq!(game.board, [2, 0, 0, 0, 1, 0, 0, 0, 0]);
        assert_eq!(game.move_count, 2);
    }

    #[tokio::test]
    async fn test_rejects_foreign_and_bad_moves() {
        let alice = SimulatedContract::new(ALICE, ScriptedRandom::default());
        let bob = alice.with_sender(BOB);
        let id = alice.create_game(Difficulty::Hard).await.unwrap();

        assert_eq!(bob.player_move(id, 0).await, Err(ContractError::NotYourTurn));
        assert_eq!(alice.player_move(id, 9).await, Err(ContractError::InvalidMove));
        assert_eq!(alice.player_move(99, 0).await, Err(ContractError::NoActiveGame));

        alice.player_move(id, 4).await.unwrap();
        assert_eq!(alice.player_move(id, 4).await, Err(ContractError::InvalidMove));
    }

    #[tokio::test]
    async fn test_finished_game_is_logged_and_closed() {
        // Easy AI scripted onto the bottom row while X takes the top.
        let chain = SimulatedContract::new(ALICE, ScriptedRandom::new([5, 5]));
        let id = chain.create_game(Difficulty::Easy).await.unwrap();
        assert_eq!(chain.active_game_id(ALICE).await.unwrap(), id);

        chain.player_move(id, 0).await.unwrap();
        chain.player_move(id, 1).await.unwrap();
        chain.player_move(id, 2).await.unwrap();

        let game = chain.get_game(id).await.unwrap();
        assert_eq!(game.status, ChainStatus::PlayerWon as u8);
        assert_eq!(chain.active_game_id(ALICE).await.unwrap(), 0);
        assert_eq!(chain.player_move(id, 3).await, Err(ContractError::GameAlreadyOver));

        let history = chain.game_history(&ALICE.to_lowercase()).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(*history[0].result(), RecordResult::Win);
        assert!(history[0].id().starts_with("1-0x"));
        assert!(chain.game_history(BOB).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_difficulty_leaves_board_untouched() {
        let chain = SimulatedContract::new(ALICE, ScriptedRandom::default());
        let id = chain.create_game(Difficulty::Medium).await.unwrap();
        if let Some(game) = chain.lock().games.get_mut(&id) {
            game.difficulty = 7;
        }

        assert_eq!(
            chain.player_move(id, 4).await,
            Err(ContractError::InvalidDifficulty(7))
        );
        let game = chain.get_game(id).await.unwrap();
        assert_eq!(game.board, [0; 9]);
        assert_eq!(game.move_count, 0);
        assert_eq!(game.status, ChainStatus::InProgress as u8);
    }
}
