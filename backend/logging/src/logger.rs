//! Structured Logger
//!
//! Wraps `tracing` with a console layer, a daily-rolling NDJSON file, and
//! environment-based level control.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log file prefix inside the log directory.
pub const LOG_FILE_PREFIX: &str = "snaptext.log";

/// Initialize the global logger. `RUST_LOG` overrides `level` when set.
///
/// Writes NDJSON to `<log_dir>/snaptext.log.YYYY-MM-DD`; the console gets
/// compact text, or JSON when `json_console` is set.
pub fn init_logger<P: AsRef<Path>>(log_dir: P, level: &str, json_console: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);

    let file_layer = fmt::layer()
        .json()
        .with_writer(file_appender)
        .with_ansi(false);

    let console_layer = if json_console {
        fmt::layer().json().with_writer(std::io::stdout).boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(false)
            .with_ansi(true)
            .boxed()
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
}
