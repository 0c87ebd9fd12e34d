//! Tracing setup: console output on stderr plus a daily log file.
//!
//! Stdout is left to command output such as `ask --json`.

use crate::config::LoggingConfig;
use crate::error::{AgentError, Result};
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Log file for the current day, e.g. `logs/sql_agent_2024-03-01.log`.
pub fn log_file_path(config: &LoggingConfig) -> PathBuf {
    let today = Local::now().format("%Y-%m-%d");
    config.log_dir.join(format!("sql_agent_{}.log", today))
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn init_logging(config: &LoggingConfig) -> Result<PathBuf> {
    fs::create_dir_all(&config.log_dir)?;
    let path = log_file_path(config);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(io::stderr().is_terminal())
                .with_writer(io::stderr),
        )
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()
        .map_err(|e| AgentError::Config(format!("failed to install tracing subscriber: {}", e)))?;

    info!("Logging configured, writing to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_is_dated_inside_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            log_dir: dir.path().to_path_buf(),
        };
        let path = log_file_path(&config);
        assert!(path.starts_with(dir.path()));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("sql_agent_"));
        assert!(name.ends_with(".log"));
        // sql_agent_YYYY-MM-DD.log
        assert_eq!(name.len(), "sql_agent_".len() + 10 + ".log".len());
    }
}
