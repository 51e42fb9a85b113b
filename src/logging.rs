//! File-based tracing setup
//!
//! The terminal is in raw mode on the alternate screen while the dashboard
//! runs, so log output goes to a daily-rolling file instead.

use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "vbox_monitor=info";

/// Keeps the background log writer alive; drop it last
pub struct LoggingGuard {
    _guard: WorkerGuard,
    log_dir: PathBuf,
}

impl LoggingGuard {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Default log directory under the system temp dir
pub fn default_log_dir() -> PathBuf {
    std::env::temp_dir().join("vbox-monitor").join("logs")
}

/// Install the global subscriber writing to `log_dir`.
///
/// The filter comes from `RUST_LOG` when set. Returns `None` if a subscriber
/// is already installed.
pub fn init(log_dir: &Path) -> io::Result<Option<LoggingGuard>> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "vbox-monitor.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_thread_names(true),
    );

    if subscriber.try_init().is_err() {
        return Ok(None);
    }

    std::panic::set_hook(Box::new(|panic_info| {
        tracing::error!(panic = %panic_info, "panic");
    }));

    tracing::info!(log_dir = %log_dir.display(), "tracing initialized");

    Ok(Some(LoggingGuard {
        _guard: guard,
        log_dir: log_dir.to_path_buf(),
    }))
}
