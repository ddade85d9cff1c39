//! AI-vs-AI self-play.

use derive_getters::Getters;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::games::tictactoe::ai::{RandomSource, choose_opponent_move};
use crate::games::tictactoe::{Board, Difficulty, GameOutcome, Mark, evaluate};

/// Tally of a batch of self-play games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Getters)]
pub struct SimulationReport {
    games: usize,
    x_wins: usize,
    o_wins: usize,
    draws: usize,
}

impl SimulationReport {
    /// Counts one finished game.
    pub fn add(&mut self, outcome: &GameOutcome) {
        self.games += 1;
        match outcome.winner() {
            Some(Mark::X) => self.x_wins += 1,
            Some(Mark::O) => self.o_wins += 1,
            None => self.draws += 1,
        }
    }
}

impl std::fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} games: X won {}, O won {}, {} drawn",
            self.games, self.x_wins, self.o_wins, self.draws
        )
    }
}

/// Plays one game to the end, each side choosing with its own policy.
///
/// Returns the final board and its outcome.
#[instrument(skip(rng))]
pub fn self_play(x: Difficulty, o: Difficulty, rng: &mut dyn RandomSource) -> (Board, GameOutcome) {
    let mut board = Board::new();
    loop {
        let outcome = evaluate(&board);
        if outcome.is_terminal() {
            debug!(%outcome, "Self-play game over");
            return (board, outcome);
        }
        let mover = board.to_move();
        let difficulty = match mover {
            Mark::X => x,
            Mark::O => o,
        };
        let position = choose_opponent_move(&board, difficulty, rng);
        board = board.with(position, mover);
    }
}

/// Plays `games` games and tallies the results.
#[instrument(skip(rng))]
pub fn run_batch(
    x: Difficulty,
    o: Difficulty,
    games: usize,
    rng: &mut dyn RandomSource,
) -> SimulationReport {
    let mut report = SimulationReport::default();
    for _ in 0..games {
        let (_, outcome) = self_play(x, o, rng);
        report.add(&outcome);
    }
    info!(%report, "Self-play finished");
    report
}
