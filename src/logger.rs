use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::Config;

const DEFAULT_LOG_FILE: &str = "expense-session.log";

/// Set up application logging based on configuration.
///
/// `RUST_LOG` wins over the configured level. The returned guard must be kept
/// alive for the file writer to flush.
pub fn setup_logging(config: &Config) -> WorkerGuard {
    let env_filter = build_filter(config.log_level());

    let file_logger = config
        .log_file_path()
        .as_deref()
        .and_then(|path| match create_file_logger(Path::new(path)) {
            Ok(logger) => Some(logger),
            Err(e) => {
                eprintln!("Failed to open log file {}: {}. Logging to stderr.", path, e);
                None
            }
        });

    let (writer, guard) = match file_logger {
        Some(logger) => logger,
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global tracing subscriber: {}", e);
    }

    guard
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

// Non-rotating appender at the exact path the user configured
fn create_file_logger(path: &Path) -> std::io::Result<(NonBlocking, WorkerGuard)> {
    let log_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => default_log_dir(),
    };
    std::fs::create_dir_all(&log_dir)?;

    let file_name = path
        .file_name()
        .unwrap_or(std::ffi::OsStr::new(DEFAULT_LOG_FILE));

    let file_appender = tracing_appender::rolling::never(&log_dir, file_name);
    Ok(tracing_appender::non_blocking(file_appender))
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
        .join("expense-session")
        .join("logs")
}
