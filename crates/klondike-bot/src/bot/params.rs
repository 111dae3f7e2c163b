/// Tunable weights for the position heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    /// Linear reward per foundation card.
    pub foundation_card: f64,
    /// Multiplier on the squared size of each foundation.
    pub foundation_square: f64,
    /// Staged bonuses once the foundation total exceeds 20, 30 and 40 cards.
    pub progress_bonus_20: f64,
    pub progress_bonus_30: f64,
    pub progress_bonus_40: f64,
    pub revealed_card: f64,
    pub empty_column: f64,
    /// Applied to the empty-column reward while a King waits to move there.
    pub empty_column_king_factor: f64,
    pub run_card: f64,
    pub stock_card_penalty: f64,
    pub waste_card_penalty: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            foundation_card: 30.0,
            foundation_square: 2.0,
            progress_bonus_20: 100.0,
            progress_bonus_30: 200.0,
            progress_bonus_40: 500.0,
            revealed_card: 2.5,
            empty_column: 5.0,
            empty_column_king_factor: 3.0,
            run_card: 0.3,
            stock_card_penalty: 0.5,
            waste_card_penalty: 1.0,
        }
    }
}

/// Knobs shared by the tree and graph searches.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub tree_depth: usize,
    pub graph_depth: usize,
    /// Child scores within this distance of the best are treated as ties.
    pub tie_window: f64,
    /// Upper bound of the uniform noise added to every child score.
    pub noise: f64,
    /// Added to a child score when the move lands on a foundation.
    pub foundation_bonus: f64,
    /// Maximum node expansions per call; `None` leaves only the depth bound.
    pub node_budget: Option<usize>,
    pub memo: bool,
    /// Fixed tie-break seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    pub history: HistoryFilter,
}

/// Root-level suppression of moves the live game has been repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryFilter {
    pub immediate_window: usize,
    pub recurrence_window: usize,
    pub recurrence_limit: usize,
    /// Lets `DrawStock` through like a foundation move.
    pub exempt_draws: bool,
}

impl Default for HistoryFilter {
    fn default() -> Self {
        Self {
            immediate_window: 3,
            recurrence_window: 10,
            recurrence_limit: 3,
            exempt_draws: false,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tree_depth: 6,
            graph_depth: 4,
            tie_window: 5.0,
            noise: 1.0,
            foundation_bonus: 1000.0,
            node_budget: Some(200_000),
            memo: true,
            seed: None,
            history: HistoryFilter::default(),
        }
    }
}

impl SearchConfig {
    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    pub fn with_tree_depth(mut self, depth: usize) -> Self {
        self.tree_depth = depth;
        self
    }

    pub fn with_graph_depth(mut self, depth: usize) -> Self {
        self.graph_depth = depth;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_node_budget(mut self, budget: Option<usize>) -> Self {
        self.node_budget = budget;
        self
    }

    pub fn with_memo(mut self, enabled: bool) -> Self {
        self.memo = enabled;
        self
    }

    pub(crate) fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let tree_depth = read("KLD_TREE_DEPTH")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|depth| (1..=12).contains(depth))
            .unwrap_or(defaults.tree_depth);

        let graph_depth = read("KLD_GRAPH_DEPTH")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|depth| (1..=12).contains(depth))
            .unwrap_or(defaults.graph_depth);

        // "0", "none" and "off" remove the budget entirely.
        let node_budget = match read("KLD_NODE_BUDGET") {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "0" | "none" | "off" => None,
                other => other.parse::<usize>().ok().or(defaults.node_budget),
            },
            None => defaults.node_budget,
        };

        let memo = read("KLD_SEARCH_MEMO")
            .map(|raw| matches!(raw.trim(), "1" | "true" | "TRUE" | "on" | "ON"))
            .unwrap_or(defaults.memo);

        let seed = read("KLD_SEARCH_SEED").and_then(|raw| raw.trim().parse::<u64>().ok());

        Self {
            tree_depth,
            graph_depth,
            node_budget,
            memo,
            seed,
            ..defaults
        }
    }
}
