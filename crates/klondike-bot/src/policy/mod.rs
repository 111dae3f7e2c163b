mod search;

pub use search::{GraphPolicy, GreedyPolicy, TreePolicy};

use crate::bot::{ScoreWeights, SearchConfig};
use klondike_core::model::state::GameState;
use klondike_core::moves::Move;
use std::fmt;
use std::str::FromStr;

/// Context provided to policies for decision-making
pub struct PolicyContext<'a> {
    pub state: &'a GameState,
    /// Moves already played in the live game, oldest first.
    pub history: &'a [Move],
}

/// Unified interface for move selection
pub trait Policy: Send {
    fn name(&self) -> &'static str;

    /// `None` when the position offers no legal move.
    fn choose(&mut self, ctx: &PolicyContext) -> Option<Move>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Greedy,
    Tree,
    Graph,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Greedy, Strategy::Tree, Strategy::Graph];

    pub const fn as_str(self) -> &'static str {
        match self {
            Strategy::Greedy => "greedy",
            Strategy::Tree => "tree",
            Strategy::Graph => "graph",
        }
    }

    pub fn build(self, config: SearchConfig, weights: ScoreWeights) -> Box<dyn Policy> {
        match self {
            Strategy::Greedy => Box::new(GreedyPolicy),
            Strategy::Tree => Box::new(TreePolicy::new(config, weights)),
            Strategy::Graph => Box::new(GraphPolicy::new(config, weights)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStrategy(pub String);

impl fmt::Display for UnknownStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown strategy '{}' (expected greedy, tree or graph)", self.0)
    }
}

impl std::error::Error for UnknownStrategy {}

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "greedy" | "simple" => Ok(Strategy::Greedy),
            "tree" | "dfs" => Ok(Strategy::Tree),
            "graph" | "bfs" => Ok(Strategy::Graph),
            _ => Err(UnknownStrategy(raw.to_string())),
        }
    }
}
