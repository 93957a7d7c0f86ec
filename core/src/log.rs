//! Logging setup.
//!
//! Writes to a log file when one is given, stderr otherwise. The config
//! file's verbosity sets the default; `RUST_LOG` still overrides it.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;
use upkeep_types::LogLevel;

/// Initialize the global subscriber. Returns a guard that must be held for
/// the lifetime of the process when logging to a file.
pub fn init_logging(level: LogLevel, log_file: Option<&Path>) -> Option<WorkerGuard> {
    let default = match level {
        LogLevel::Off => return None,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();

    if let Some(path) = log_file {
        if let (Some(dir), Some(name)) = (path.parent(), path.file_name()) {
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            return Some(guard);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
    None
}
