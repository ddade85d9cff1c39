//! One-ply tactics: take a win, otherwise block a loss.

use super::super::rules::evaluate;
use super::super::{Board, Mark, Position};

/// First empty square (ascending index) that completes a line for `mark`.
pub fn winning_move(board: &Board, mark: Mark) -> Option<Position> {
    Position::valid_moves(board)
        .into_iter()
        .find(|&pos| evaluate(&board.with(pos, mark)).winner() == Some(mark))
}

/// Win for `mark` if possible, else block the other side's win.
pub fn tactical_move(board: &Board, mark: Mark) -> Option<Position> {
    winning_move(board, mark).or_else(|| winning_move(board, mark.opponent()))
}
