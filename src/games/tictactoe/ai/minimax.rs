//! Exhaustive minimax search.
//!
//! The board is small enough (at most 9! leaves) to search without
//! pruning. Terminal scores are raw, with no depth discount: a win for the
//! searching side is `+10`, a loss `-10`, a draw `0`.

use super::super::rules::{GameOutcome, evaluate};
use super::super::{Board, Mark, Position, Square};

/// Score of a won terminal position for the searching side.
pub const WIN_SCORE: i32 = 10;

/// Minimax score of every legal move for the side to move, ascending index.
pub fn score_moves(board: &Board) -> Vec<(Position, i32)> {
    let me = board.to_move();
    let mut scratch = board.clone();
    Position::valid_moves(board)
        .into_iter()
        .map(|pos| {
            scratch.set(pos, Square::Occupied(me));
            let score = minimax(&mut scratch, me, me.opponent());
            scratch.set(pos, Square::Empty);
            (pos, score)
        })
        .collect()
}

/// Best move for the side to move.
///
/// Ties go to the first move in ascending index order, so an empty board
/// always yields [`Position::TopLeft`]. `None` only on a full board.
pub fn best_move(board: &Board) -> Option<Position> {
    let mut best: Option<(Position, i32)> = None;
    for (pos, score) in score_moves(board) {
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((pos, score));
        }
    }
    best.map(|(pos, _)| pos)
}

fn minimax(board: &mut Board, me: Mark, turn: Mark) -> i32 {
    match evaluate(board) {
        GameOutcome::Win { mark, .. } if mark == me => return WIN_SCORE,
        GameOutcome::Win { .. } => return -WIN_SCORE,
        GameOutcome::Draw => return 0,
        GameOutcome::InProgress => {}
    }

    let maximizing = turn == me;
    let mut best = if maximizing { i32::MIN } else { i32::MAX };
    for pos in Position::ALL {
        if !board.is_empty(pos) {
            continue;
        }
        board.set(pos, Square::Occupied(turn));
        let score = minimax(board, me, turn.opponent());
        board.set(pos, Square::Empty);

        if (maximizing && score > best) || (!maximizing && score < best) {
            best = score;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board_ties_resolve_to_first_index() {
        let scores = score_moves(&Board::new());
        assert!(scores.iter().all(|(_, s)| *s == 0));
        assert_eq!(best_move(&Board::new()), Some(Position::TopLeft));
    }

    #[test]
    fn test_blocks_forced_loss() {
        // X X . / . O . / . . .  O must take 2.
        let board = Board::new()
            .with(Position::TopLeft, Mark::X)
            .with(Position::TopCenter, Mark::X)
            .with(Position::Center, Mark::O);
        assert_eq!(board.to_move(), Mark::O);
        assert_eq!(best_move(&board), Some(Position::TopRight));
    }

    #[test]
    fn test_scores_are_from_movers_perspective() {
        // O to move with X threatening 2: every other move loses.
        let board = Board::new()
            .with(Position::TopLeft, Mark::X)
            .with(Position::TopCenter, Mark::X)
            .with(Position::Center, Mark::O);
        for (pos, score) in score_moves(&board) {
            if pos != Position::TopRight {
                assert_eq!(score, -WIN_SCORE, "{pos} should lose");
            }
        }
    }

    #[test]
    fn test_full_board_has_no_move() {
        use Mark::{O, X};
        let marks = [X, O, X, O, X, X, O, X, O];
        let board = Position::ALL
            .iter()
            .zip(marks)
            .fold(Board::new(), |b, (p, m)| b.with(*p, m));
        assert_eq!(best_move(&board), None);
    }
}
