//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`](super::Board). Rules are separated from
//! board storage so the typestate machine, the AI search and the simulated
//! contract all judge positions the same way.

pub mod draw;
pub mod outcome;
pub mod win;

pub use draw::{is_draw, is_full};
pub use outcome::{GameOutcome, evaluate};
pub use win::{Line, check_winner};
