//! Logging setup
//!
//! Command mode logs to stderr at the level in `PWKEEP_LOG` (default
//! `warn`). The TUI owns the terminal, so it logs to a file and only when
//! `PWKEEP_LOG` is set.

use std::fs::File;
use std::sync::Mutex;

use pwkeep_core::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log level
const LOG_ENV: &str = "PWKEEP_LOG";

/// Initialize stderr logging for one-shot commands
pub fn init_cli_logging() {
    let level = std::env::var(LOG_ENV).unwrap_or_else(|_| "warn".to_string());

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_for(&level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Initialize logging for TUI mode
///
/// Logs to `config.log_file` or `{data_dir}/debug.log`.
pub fn init_tui_logging(config: &Config) {
    let Ok(level) = std::env::var(LOG_ENV) else {
        return;
    };

    let log_path = config.log_path();
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_for(&level))
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .try_init();

    info!("TUI logging initialized to {:?}", log_path);
}

fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::new(format!("pwkeep_core={},pwkeep={}", level, level))
}
