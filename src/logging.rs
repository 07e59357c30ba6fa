use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Environment variable naming a log file path.
pub const LOG_PATH_ENV: &str = "FLOWKIT_LOG";

/// Initialize tracing.
///
/// Logs go to stderr unless `FLOWKIT_LOG` names a file path, in which case
/// a uniquely named file `{path}.{timestamp}.{pid}` is created so several
/// instances never share one. `RUST_LOG` overrides the configured filter.
///
/// Returns the log file path when logging to a file.
pub fn init_tracing(config: &LoggingConfig) -> Option<PathBuf> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let Some(log_path) = std::env::var(LOG_PATH_ENV).ok() else {
        let layer = fmt::layer().with_writer(std::io::stderr).with_target(true);
        if tracing_subscriber::registry().with(filter).with(layer).try_init().is_err() {
            eprintln!("Warning: tracing was already initialised");
        }
        return None;
    };

    let path = PathBuf::from(unique_log_path(&log_path));
    let Ok(file) = std::fs::File::create(&path) else {
        eprintln!("Warning: Failed to create log file: {}", path.display());
        return None;
    };

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    if tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing was already initialised");
        return None;
    }
    Some(path)
}

fn unique_log_path(base: &str) -> String {
    let pid = std::process::id();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{base}.{timestamp}.{pid}")
}
