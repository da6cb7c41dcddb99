//! Logging setup for the CLI.
//!
//! Human-readable events go to stderr. When a log directory can be resolved,
//! the same events are also written as JSON lines to a daily-rolling file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

const LOG_PATH_VAR: &str = "REPRISE_LOG_PATH";
const LOG_DIR_VAR: &str = "REPRISE_LOG_DIR";
const LOG_FILE_PREFIX: &str = "reprise.jsonl";

/// Where the JSON log file goes, if anywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Directory holding the rolling log files.
    pub log_dir: Option<PathBuf>,
    /// File name prefix inside `log_dir`.
    pub file_prefix: String,
}

impl ObservabilityConfig {
    /// Resolve the log location.
    ///
    /// Precedence: `REPRISE_LOG_PATH`, then `REPRISE_LOG_DIR`, then the
    /// configured directory, then the platform data directory.
    pub fn from_env_with_overrides(config_log_dir: Option<PathBuf>) -> Self {
        Self::resolve(
            std::env::var_os(LOG_PATH_VAR).map(PathBuf::from),
            std::env::var_os(LOG_DIR_VAR).map(PathBuf::from),
            config_log_dir,
            reprise_core::config::user_data_local_dir().map(|dir| dir.join("logs").into()),
        )
    }

    fn resolve(
        log_path: Option<PathBuf>,
        env_dir: Option<PathBuf>,
        config_dir: Option<PathBuf>,
        data_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(path) = log_path.filter(|p| !p.as_os_str().is_empty()) {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            let file_prefix = path
                .file_name()
                .map_or_else(|| LOG_FILE_PREFIX.to_string(), |n| n.to_string_lossy().into_owned());
            return Self {
                log_dir: Some(dir),
                file_prefix,
            };
        }

        Self {
            log_dir: env_dir
                .filter(|p| !p.as_os_str().is_empty())
                .or(config_dir)
                .or(data_dir),
            file_prefix: LOG_FILE_PREFIX.to_string(),
        }
    }
}

/// Build the event filter.
///
/// `RUST_LOG` wins when set. Otherwise `--quiet` means errors only, each
/// `-v` raises the level one step, and the configured level is the base.
pub fn env_filter(quiet: bool, verbose: u8, config_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(level_directive(quiet, verbose, config_level))
}

fn level_directive(quiet: bool, verbose: u8, config_level: &str) -> &str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => config_level,
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// life of the process. A log directory that cannot be created only costs
/// the file layer.
pub fn init_observability(
    config: &ObservabilityConfig,
    filter: EnvFilter,
) -> anyhow::Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let (file_layer, guard) = match config.log_dir.as_deref().map(open_log_dir) {
        Some(Ok(dir)) => {
            let appender = tracing_appender::rolling::daily(dir, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_current_span(true)
                .with_span_list(false);
            (Some(layer.boxed()), Some(guard))
        }
        Some(Err(err)) => {
            eprintln!("warning: file logging disabled: {err:#}");
            (None, None)
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    Ok(guard)
}

fn open_log_dir(dir: &Path) -> anyhow::Result<&Path> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    Ok(dir)
}
