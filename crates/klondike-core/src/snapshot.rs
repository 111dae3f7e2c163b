use crate::model::state::GameState;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug)]
pub enum SnapshotError {
    Json(serde_json::Error),
    UnsupportedVersion(u32),
    IncompleteDeck,
    FoundationOutOfOrder(usize),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Json(err) => write!(f, "snapshot json: {err}"),
            SnapshotError::UnsupportedVersion(version) => {
                write!(f, "unsupported snapshot version {version}")
            }
            SnapshotError::IncompleteDeck => {
                write!(f, "snapshot does not hold exactly one standard deck")
            }
            SnapshotError::FoundationOutOfOrder(index) => {
                write!(f, "foundation {index} is not an ascending single-suit pile")
            }
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        SnapshotError::Json(err)
    }
}

/// Serializable copy of a full position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub version: u32,
    pub state: GameState,
}

impl StateSnapshot {
    pub fn capture(state: &GameState) -> Self {
        StateSnapshot {
            version: SNAPSHOT_VERSION,
            state: state.clone(),
        }
    }

    pub fn restore(self) -> Result<GameState, SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }
        if !self.state.deck_is_complete() {
            return Err(SnapshotError::IncompleteDeck);
        }
        for (index, foundation) in self.state.foundations().iter().enumerate() {
            let ordered = foundation
                .cards()
                .iter()
                .enumerate()
                .all(|(depth, card)| {
                    card.suit == foundation.suit() && usize::from(card.rank.value()) == depth + 1
                });
            if foundation.suit().index() != index || !ordered {
                return Err(SnapshotError::FoundationOutOfOrder(index));
            }
        }
        Ok(self.state)
    }

    pub fn to_json(state: &GameState) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&Self::capture(state))
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}
