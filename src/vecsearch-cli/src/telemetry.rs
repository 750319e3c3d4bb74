//! Where the `vecsearch` demo writes its logs.
//!
//! Every client call runs inside a span named after the operation (`create_index`,
//! `bulk_insert_documents`, `search_by_knn`, ...) carrying the index name and, for
//! bulk calls, the batch size. The JSON file keeps those spans with their timing
//! on close, plus one `warn` record per document the engine rejected or the
//! codec left out. The console carries the same events as plain text, which at the
//! default levels is mostly the demo's step-by-step progress.
//!
//! `VECSEARCH_LOG_DIR` moves the file (default `./logs/vecsearch.log`), `RUST_LOG`
//! overrides the levels.

use std::path::PathBuf;

use anyhow::{Context, Result};
use rolling_file::{RollingConditionBasic, RollingFileAppender};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_DIR_VAR: &str = "VECSEARCH_LOG_DIR";
const LOG_FILE: &str = "vecsearch.log";

/// Client internals at debug, so request spans and per-item bulk outcomes reach the file
const DEFAULT_FILTER: &str = "vecsearch=info,vecsearch_rs=debug,vecsearch_core=debug";

fn log_dir(var: Option<String>) -> PathBuf {
    var.filter(|dir| !dir.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Install the file and console layers.
///
/// Keep the returned guard alive until exit or buffered records are lost.
pub fn init_telemetry() -> Result<WorkerGuard> {
    let log_dir = log_dir(std::env::var(LOG_DIR_VAR).ok());
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    // daily or 10MB, up to 9 rolled files
    let file_appender = RollingFileAppender::new(
        log_dir.join(LOG_FILE),
        RollingConditionBasic::new()
            .daily()
            .max_size(10 * 1024 * 1024),
        9,
    )?;
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let file_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_span_events(FmtSpan::CLOSE)
        .with_current_span(true)
        .with_target(true);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    tracing::debug!(dir = %log_dir.display(), "logging to {}", LOG_FILE);

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_defaults_when_unset_or_blank() {
        assert_eq!(log_dir(None), PathBuf::from("./logs"));
        assert_eq!(log_dir(Some("  ".to_string())), PathBuf::from("./logs"));
        assert_eq!(
            log_dir(Some("/var/log/vecsearch".to_string())),
            PathBuf::from("/var/log/vecsearch")
        );
    }
}
