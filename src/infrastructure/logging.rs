//! Logging initialization.
//!
//! Console output is always on; file output (daily-rolled, under the data
//! directory) is opt-in via configuration. `RUST_LOG` overrides the
//! configured level. The non-blocking writer guard must stay alive for the
//! life of the process, so it is parked in a static.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::infrastructure::config::LoggingConfig;

static LOG_GUARDS: Lazy<Mutex<Vec<WorkerGuard>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Initialize the logging system. Call once at startup.
pub fn init_logging(config: &LoggingConfig, log_dir: &Path) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .context("invalid log filter")?;

    let console_layer = fmt::layer().with_target(false);

    if config.file_output {
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
        let appender = rolling::daily(log_dir, "virtual-closet.log");
        let (writer, guard) = non_blocking(appender);
        if let Ok(mut guards) = LOG_GUARDS.lock() {
            guards.push(guard);
        }

        let file_layer = fmt::layer().with_ansi(false).with_writer(writer);
        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .context("logging already initialized")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .try_init()
            .context("logging already initialized")?;
    }

    Ok(())
}
