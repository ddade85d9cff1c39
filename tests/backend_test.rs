//! Tests driving both opponent backends through the shared trait.

use std::time::Duration;

use tacotex::backend::ChainStatus;
use tacotex::{
    BackendError, ContractBackend, ContractClient, ContractError, Difficulty, GameOutcome,
    LocalBackend, Mark, MoveError, OpponentBackend, Position, RecordResult, ScriptedRandom,
    SimulatedContract,
};

const PLAYER: &str = "0x1234567890abcdef1234567890abcdef12345678";

/// Plays the lowest free square until the game ends.
async fn play_out(backend: &mut dyn OpponentBackend) -> GameOutcome {
    loop {
        let snapshot = backend.snapshot().await.unwrap();
        if snapshot.is_over() {
            return *snapshot.outcome();
        }
        let next = tacotex::legal_moves(snapshot.board())[0];
        backend.play(next).await.unwrap();
    }
}

#[tokio::test]
async fn test_local_and_contract_agree() {
    let mut local = LocalBackend::new(ScriptedRandom::default(), Duration::ZERO);
    let mut remote = ContractBackend::new(
        SimulatedContract::new(PLAYER, ScriptedRandom::default()),
        PLAYER,
    );

    for backend in [&mut local as &mut dyn OpponentBackend, &mut remote] {
        backend.start(Difficulty::Hard).await.unwrap();
        let snapshot = backend.play(Position::Center).await.unwrap();
        assert_eq!(snapshot.board().count(Mark::O), 1);
        assert!(snapshot.opponent_move().is_some());
    }

    let a = local.snapshot().await.unwrap();
    let b = remote.snapshot().await.unwrap();
    assert_eq!(a.board(), b.board());
}

#[tokio::test]
async fn test_hard_backends_never_lose() {
    let mut local = LocalBackend::new(ScriptedRandom::default(), Duration::ZERO);
    local.start(Difficulty::Hard).await.unwrap();
    assert_ne!(play_out(&mut local).await.winner(), Some(Mark::X));

    let mut remote = ContractBackend::new(
        SimulatedContract::new(PLAYER, ScriptedRandom::default()),
        PLAYER,
    );
    remote.start(Difficulty::Hard).await.unwrap();
    assert_ne!(play_out(&mut remote).await.winner(), Some(Mark::X));
}

#[tokio::test]
async fn test_local_rejects_moves_after_game_over() {
    // Easy O is scripted off the top row while X completes it.
    let mut local = LocalBackend::new(ScriptedRandom::new([2, 2]), Duration::ZERO);
    local.start(Difficulty::Easy).await.unwrap();
    local.play(Position::TopLeft).await.unwrap();
    local.play(Position::TopCenter).await.unwrap();
    let last = local.play(Position::TopRight).await.unwrap();

    assert_eq!(last.outcome().winner(), Some(Mark::X));
    assert_eq!(*last.opponent_move(), None, "no reply after a winning move");
    assert_eq!(
        local.play(Position::BottomRight).await,
        Err(BackendError::Move(MoveError::GameOver))
    );
}

#[tokio::test]
async fn test_contract_errors_surface() {
    let chain = SimulatedContract::new(PLAYER, ScriptedRandom::default());
    let mut remote = ContractBackend::new(chain.clone(), PLAYER);
    assert_eq!(
        remote.play(Position::Center).await,
        Err(BackendError::NotStarted)
    );

    remote.start(Difficulty::Medium).await.unwrap();
    remote.play(Position::Center).await.unwrap();
    assert_eq!(
        remote.play(Position::Center).await,
        Err(BackendError::Contract(ContractError::InvalidMove))
    );

    let mut intruder = ContractBackend::new(chain.with_sender("0xdead"), "0xdead");
    assert_eq!(intruder.resume().await, Ok(None));
}

#[tokio::test]
async fn test_resume_and_history() {
    let chain = SimulatedContract::new(PLAYER, ScriptedRandom::default());
    let mut first = ContractBackend::new(chain.clone(), PLAYER);
    first.start(Difficulty::Hard).await.unwrap();
    first.play(Position::Center).await.unwrap();

    let mut second = ContractBackend::new(chain.clone(), PLAYER);
    let resumed = second.resume().await.unwrap().expect("active game");
    assert_eq!(resumed.board().count(Mark::X), 1);
    assert_eq!(second.game_id(), first.game_id());

    let outcome = play_out(&mut second).await;
    let history = second.history().await.unwrap();
    assert_eq!(history.len(), 1);
    let expected = ChainStatus::from_outcome(&outcome).result();
    assert_eq!(Some(*history[0].result()), expected);
    assert_ne!(*history[0].result(), RecordResult::Win);
    assert_eq!(chain.active_game_id(PLAYER).await.unwrap(), 0);
}
