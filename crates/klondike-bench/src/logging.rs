use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use crate::config::{LoggingConfig, ResolvedOutputs};

pub const TELEMETRY_FILE: &str = "telemetry.jsonl";

/// Keeps the background writer alive; dropping it flushes pending events.
pub struct LoggingGuard {
    _worker: WorkerGuard,
    pub telemetry_path: PathBuf,
}

/// Directory holding the summary, and therefore the telemetry log.
pub fn telemetry_dir(outputs: &ResolvedOutputs) -> PathBuf {
    outputs
        .summary_md
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Installs a JSON subscriber writing to `telemetry.jsonl` when structured
/// logging is enabled. `RUST_LOG` overrides the configured level.
pub fn init_logging(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
    run_id: &str,
) -> Result<Option<LoggingGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    // The search crate caches KLD_DEBUG_LOGS on first use.
    unsafe {
        std::env::set_var("KLD_BENCH_RUN_ID", run_id);
        if logging.search_details {
            std::env::set_var("KLD_DEBUG_LOGS", "1");
        }
    }

    let dir = telemetry_dir(outputs);
    fs::create_dir_all(&dir)
        .with_context(|| format!("creating telemetry directory at {}", dir.display()))?;
    let telemetry_path = dir.join(TELEMETRY_FILE);
    let sink = File::create(&telemetry_path)
        .with_context(|| format!("creating telemetry file at {}", telemetry_path.display()))?;

    let (writer, worker) = NonBlockingBuilder::default().lossy(false).finish(sink);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(logging.level().unwrap_or(Level::INFO).as_str())
    });

    // Fails only when a global subscriber already exists; keep that one.
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .try_init();

    Ok(Some(LoggingGuard {
        _worker: worker,
        telemetry_path,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_logging_installs_nothing() {
        let outputs = ResolvedOutputs {
            jsonl: PathBuf::from("does/not/matter.jsonl"),
            summary_md: PathBuf::from("does/not/matter.md"),
        };
        let guard = init_logging(&LoggingConfig::default(), &outputs, "r").expect("no-op");
        assert!(guard.is_none());
        assert!(!Path::new("does").exists());
    }

    #[test]
    fn telemetry_sits_beside_the_summary() {
        let outputs = ResolvedOutputs {
            jsonl: PathBuf::from("out/games.jsonl"),
            summary_md: PathBuf::from("out/run/summary.md"),
        };
        assert_eq!(telemetry_dir(&outputs), PathBuf::from("out/run"));

        let bare = ResolvedOutputs {
            jsonl: PathBuf::from("games.jsonl"),
            summary_md: PathBuf::from("summary.md"),
        };
        assert_eq!(telemetry_dir(&bare), PathBuf::from("."));
    }
}
