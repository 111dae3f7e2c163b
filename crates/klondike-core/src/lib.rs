#![deny(warnings)]
pub mod canon;
pub mod model;
pub mod moves;
pub mod rules;
pub mod snapshot;

pub use canon::{CanonicalKey, canonical_key};
pub use model::card::Card;
pub use model::state::GameState;
pub use moves::{Move, describe};
pub use rules::{MoveError, apply, legal_moves, try_apply};

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "klondike-advisor"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::AppInfo;

    #[test]
    fn exposes_static_metadata() {
        assert_eq!(AppInfo::name(), "klondike-advisor");
        assert!(!AppInfo::version().is_empty());
    }
}
