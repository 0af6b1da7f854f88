//! Log sink wiring for a single command invocation.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Subscriber plus the guard that flushes its background writer on drop.
///
/// Keep the guard alive until the command returns or buffered lines are lost.
pub struct LogSink {
    pub subscriber: Box<dyn Subscriber + Send + Sync>,
    pub guard: WorkerGuard,
}

/// Build a fmt subscriber writing to stderr, or to `log_file` when given.
///
/// The filter comes from `RUST_LOG` and defaults to `info`.
pub fn build(log_file: Option<&Path>, json: bool) -> Result<LogSink> {
    let (writer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("log file path has no file name: {}", path.display()))?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log dir: {}", dir.display()))?;
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name))
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer);

    let subscriber: Box<dyn Subscriber + Send + Sync> = if json {
        Box::new(builder.json().finish())
    } else {
        Box::new(builder.with_ansi(log_file.is_none()).finish())
    };

    Ok(LogSink { subscriber, guard })
}
