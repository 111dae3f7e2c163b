//! Klondike rules over immutable [`GameState`](crate::model::state::GameState) values.
//!
//! - `generate`: the legal move generator.
//! - `apply`: the state transition function and its rejection reasons.

mod apply;
mod generate;

pub use apply::{MoveError, apply, try_apply};
pub use generate::legal_moves;
