use klondike_bot::SearchConfig;

use super::RunnerError;
use crate::config::{AgentConfig, AgentKind};

/// A configured agent resolved into search settings.
pub(super) struct AgentBlueprint {
    pub(super) name: String,
    pub(super) kind: AgentKind,
    search: SearchConfig,
}

impl AgentBlueprint {
    pub(super) fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, RunnerError> {
        configs
            .iter()
            .map(|config| {
                Ok(Self {
                    name: config.name.clone(),
                    kind: config.kind,
                    search: config.search_config()?,
                })
            })
            .collect()
    }

    /// Unseeded agents take the deal seed so reruns replay identically.
    pub(super) fn search_for_deal(&self, deal_seed: u64) -> SearchConfig {
        match self.search.seed {
            Some(_) => self.search.clone(),
            None => self.search.clone().with_seed(deal_seed),
        }
    }
}
