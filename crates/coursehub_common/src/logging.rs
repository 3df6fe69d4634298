//! Logging setup shared by the coursehub binaries and tests.
//!
//! Console output is always on. When `logging.directory` is configured a
//! second, non-blocking layer writes to a daily rolling file; the returned
//! guard must be kept alive for the lifetime of the process so buffered
//! lines are flushed on shutdown.

use coursehub_config::LoggingConfig;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_LEVEL: &str = "info";
const LOG_FILE_PREFIX: &str = "coursehub.log";

/// Initialize the tracing subscriber from the logging section of the config.
///
/// `RUST_LOG` wins over `logging.level`. Calling this twice is harmless: the
/// second call keeps the already installed subscriber.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let level = config.level.as_deref().unwrap_or(DEFAULT_LEVEL);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match config.directory.as_deref() {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .with(file_layer)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }

    guard
}
