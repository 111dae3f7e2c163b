mod params;

pub use params::{HistoryFilter, ScoreWeights, SearchConfig};

use std::sync::OnceLock;

/// Per-node search diagnostics, enabled with `KLD_DEBUG_LOGS`.
pub fn debug_logs_enabled() -> bool {
    static CACHED: OnceLock<bool> = OnceLock::new();
    *CACHED.get_or_init(|| {
        std::env::var("KLD_DEBUG_LOGS")
            .map(|raw| matches!(raw.trim(), "1" | "true" | "TRUE" | "on" | "ON"))
            .unwrap_or(false)
    })
}
