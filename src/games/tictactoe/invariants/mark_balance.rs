//! Mark balance invariant: X leads O by zero or one.

use super::super::{GameInProgress, Mark};
use super::Invariant;

/// Invariant: the X count equals the O count or exceeds it by one.
///
/// X always moves first and turns strictly alternate.
pub struct MarkBalanceInvariant;

impl Invariant<GameInProgress> for MarkBalanceInvariant {
    fn holds(game: &GameInProgress) -> bool {
        let x = game.board().count(Mark::X);
        let o = game.board().count(Mark::O);
        x == o || x == o + 1
    }

    fn description() -> &'static str {
        "X count equals O count or leads by one"
    }
}
