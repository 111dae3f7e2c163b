use klondike_bot::{SearchConfig, Strategy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_MAX_MOVES: usize = 500;
const DEFAULT_LATENCY_BUDGET_MS: u64 = 250;
const MAX_SEARCH_DEPTH: u64 = 12;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root benchmark configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchmarkConfig {
    pub run_id: String,
    pub deals: DealConfig,
    pub agents: Vec<AgentConfig>,
    #[serde(default)]
    pub limits: LimitsConfig,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchmarkConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: BenchmarkConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.deals.validate()?;
        self.limits.validate()?;
        self.outputs.validate(&self.run_id)?;
        validate_agents(&mut self.agents)?;
        self.metrics.validate(&self.agents)?;
        self.logging.normalize();
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }
}

/// Deal sampling configuration block.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DealConfig {
    /// Seeds the deal sequence; `None` draws one from entropy.
    pub seed: Option<u64>,
    pub games: usize,
}

impl DealConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.games == 0 {
            return Err(ValidationError::invalid(
                "deals.games",
                "number of games must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Per-game limits shared by every agent.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LimitsConfig {
    #[serde(default = "default_max_moves")]
    pub max_moves: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_moves: DEFAULT_MAX_MOVES,
        }
    }
}

impl LimitsConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.max_moves == 0 {
            return Err(ValidationError::invalid(
                "limits.max_moves",
                "move limit must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_max_moves() -> usize {
    DEFAULT_MAX_MOVES
}

/// Definition of a benchmark participant.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    pub kind: AgentKind,
    #[serde(default)]
    pub params: serde_yaml::Value,
}

impl AgentConfig {
    /// Search settings for this agent: defaults overlaid with `params`.
    ///
    /// Recognised keys are `depth`, `node_budget` (null disables the budget),
    /// `memo` and `seed`. Any other key is rejected.
    pub fn search_config(&self) -> Result<SearchConfig, ValidationError> {
        let mut config = SearchConfig::default();
        let Some(mapping) = self.params.as_mapping() else {
            if self.params.is_null() {
                return Ok(config);
            }
            return Err(self.invalid_param("params", "params must be a mapping"));
        };

        for (key, value) in mapping {
            let Some(key) = key.as_str() else {
                return Err(self.invalid_param("params", "parameter names must be strings"));
            };
            match key {
                "depth" => {
                    let depth = value
                        .as_u64()
                        .filter(|depth| (1..=MAX_SEARCH_DEPTH).contains(depth))
                        .ok_or_else(|| {
                            self.invalid_param(
                                key,
                                &format!("depth must be an integer in 1..={MAX_SEARCH_DEPTH}"),
                            )
                        })? as usize;
                    config = match self.kind {
                        AgentKind::Graph => config.with_graph_depth(depth),
                        _ => config.with_tree_depth(depth),
                    };
                }
                "node_budget" => {
                    let budget = if value.is_null() {
                        None
                    } else {
                        let raw = value.as_u64().filter(|budget| *budget > 0).ok_or_else(|| {
                            self.invalid_param(key, "node budget must be positive or null")
                        })?;
                        Some(raw as usize)
                    };
                    config = config.with_node_budget(budget);
                }
                "memo" => {
                    let memo = value
                        .as_bool()
                        .ok_or_else(|| self.invalid_param(key, "memo must be a boolean"))?;
                    config = config.with_memo(memo);
                }
                "seed" => {
                    let seed = value
                        .as_u64()
                        .ok_or_else(|| self.invalid_param(key, "seed must be a u64"))?;
                    config = config.with_seed(seed);
                }
                other => {
                    return Err(self.invalid_param(other, "unknown parameter"));
                }
            }
        }
        Ok(config)
    }

    fn invalid_param(&self, key: &str, message: &str) -> ValidationError {
        ValidationError::invalid(format!("agents[{}].params.{key}", self.name), message)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Greedy,
    Tree,
    Graph,
}

impl AgentKind {
    pub const fn strategy(self) -> Strategy {
        match self {
            AgentKind::Greedy => Strategy::Greedy,
            AgentKind::Tree => Strategy::Tree,
            AgentKind::Graph => Strategy::Graph,
        }
    }
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::invalid(label, "path must not be empty"));
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::invalid(label, "resolved path is invalid"));
            }
        }
        Ok(())
    }
}

/// Metrics configuration block.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MetricsConfig {
    /// Agent the others are compared against; defaults to the first agent.
    #[serde(default)]
    pub baseline: Option<String>,
    #[serde(default = "default_latency_budget_ms")]
    pub latency_budget_ms: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            baseline: None,
            latency_budget_ms: DEFAULT_LATENCY_BUDGET_MS,
        }
    }
}

impl MetricsConfig {
    fn validate(&self, agents: &[AgentConfig]) -> Result<(), ValidationError> {
        if let Some(baseline) = self.baseline.as_ref() {
            if !agents.iter().any(|a| &a.name == baseline) {
                return Err(ValidationError::invalid(
                    "metrics.baseline",
                    format!("baseline agent '{baseline}' is not defined in agents list"),
                ));
            }
        }

        if self.latency_budget_ms == 0 {
            return Err(ValidationError::invalid(
                "metrics.latency_budget_ms",
                "latency budget must be greater than zero",
            ));
        }

        Ok(())
    }

    pub fn baseline_name<'a>(&'a self, agents: &'a [AgentConfig]) -> Option<&'a str> {
        self.baseline
            .as_deref()
            .or_else(|| agents.first().map(|agent| agent.name.as_str()))
    }
}

fn default_latency_budget_ms() -> u64 {
    DEFAULT_LATENCY_BUDGET_MS
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    /// Emits per-node search events (sets `KLD_DEBUG_LOGS`).
    #[serde(default)]
    pub search_details: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
            search_details: false,
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::invalid("run_id", "run_id must not be empty"));
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::invalid(
            "run_id",
            "run_id may only contain alphanumeric characters, '.', '_' or '-'",
        ));
    }

    Ok(())
}

fn validate_agents(agents: &mut [AgentConfig]) -> Result<(), ValidationError> {
    if agents.is_empty() {
        return Err(ValidationError::invalid("agents", "at least one agent must be specified"));
    }

    let mut seen = HashSet::new();
    for agent in agents.iter_mut() {
        if agent.name.trim().is_empty() {
            return Err(ValidationError::invalid("agents.name", "agent name must not be empty"));
        }

        if !agent.name.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
            return Err(ValidationError::invalid(
                format!("agents[{}].name", agent.name),
                "agent name contains invalid characters",
            ));
        }

        if !seen.insert(agent.name.clone()) {
            return Err(ValidationError::invalid(
                "agents",
                format!("agent name '{}' defined more than once", agent.name),
            ));
        }

        if agent.params.is_null() {
            agent.params = serde_yaml::Value::Mapping(Default::default());
        }
        agent.search_config()?;
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

impl ValidationError {
    fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }
}
