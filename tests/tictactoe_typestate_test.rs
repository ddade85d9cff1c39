//! Tests for typestate game architecture.

use tacotex::games::tictactoe::LegalMove;
use tacotex::{
    AnyGame, Difficulty, GameInProgress, GameOutcome, GameResult, GameSetup, Mark, Move,
    MoveError, Position, ScriptedRandom, new_game,
};

#[test]
fn test_typestate_lifecycle() {
    let game = GameSetup::new().start(Difficulty::Medium);
    assert_eq!(game.to_move(), Mark::X);
    assert_eq!(game.difficulty(), Difficulty::Medium);

    let result = game.play(Position::Center).expect("Valid move");
    let game = match result {
        GameResult::InProgress(g) => g,
        GameResult::Finished(_) => panic!("Game shouldn't finish after one move"),
    };

    assert_eq!(game.to_move(), Mark::O);
}

#[test]
fn test_contracts_prevent_invalid_moves() {
    let game = new_game(Difficulty::Easy);

    let game = match game.play(Position::Center).unwrap() {
        GameResult::InProgress(g) => g,
        GameResult::Finished(_) => panic!("Unexpected finish"),
    };

    let action = Move::new(Mark::O, Position::Center);
    assert!(matches!(
        LegalMove::check(&action, &game),
        Err(MoveError::SquareOccupied(_))
    ));
    let result = game.make_move(action);
    assert!(matches!(result, Err(MoveError::SquareOccupied(_))));
}

#[test]
fn test_wrong_player_rejected() {
    let game = new_game(Difficulty::Easy);
    let result = game.make_move(Move::new(Mark::O, Position::Center));
    assert!(matches!(result, Err(MoveError::WrongPlayer(Mark::O))));
}

#[test]
fn test_replay_to_a_win() {
    let moves = vec![
        Move::new(Mark::X, Position::TopLeft),
        Move::new(Mark::O, Position::Center),
        Move::new(Mark::X, Position::TopCenter),
        Move::new(Mark::O, Position::BottomLeft),
        Move::new(Mark::X, Position::TopRight),
    ];

    let result = GameInProgress::replay(Difficulty::Hard, &moves).unwrap();
    let GameResult::Finished(game) = result else {
        panic!("top row should finish the game");
    };
    assert_eq!(game.outcome().winner(), Some(Mark::X));
    assert_eq!(game.history().len(), 5);
    assert!(game.restart().board().is_empty(Position::Center));
}

#[test]
fn test_any_game_full_game_against_hard() {
    let mut rng = ScriptedRandom::default();
    let mut game = AnyGame::started(Difficulty::Hard);

    while !game.is_over() {
        assert_eq!(game.board().to_move(), Mark::X);
        let next = tacotex::legal_moves(game.board())[0];
        game = game.play(next).unwrap();
        if !game.is_over() {
            game = game.opponent_move(&mut rng).unwrap();
        }
    }

    assert_ne!(game.outcome().winner(), Some(Mark::X), "Hard never loses");
    assert!(matches!(
        game.status_string().as_str(),
        "AI Wins!" | "It's a Draw!"
    ));
    assert!(matches!(
        game.outcome(),
        GameOutcome::Win { .. } | GameOutcome::Draw
    ));
}

#[test]
fn test_opponent_cannot_move_on_player_turn() {
    let game = AnyGame::started(Difficulty::Easy);
    assert_eq!(
        game.opponent_move(&mut ScriptedRandom::default()),
        Err(MoveError::WrongPlayer(Mark::O))
    );
}
