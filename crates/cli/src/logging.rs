use anyhow::{Context, Result};
use biomentor_core::StateDir;
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE: &str = "cli.log";

/// Initialize logging for the CLI
///
/// Logs always go to stderr so command output on stdout stays parseable.
pub fn init_logging(log_level: Level, state_dir: &StateDir, no_file_log: bool) -> Result<()> {
    if no_file_log {
        init_stderr_logging(log_level)
    } else {
        init_file_logging(log_level, log_file_path(state_dir))
    }
}

fn env_filter(level: Level) -> EnvFilter {
    let level_str = level.as_str().to_lowercase();
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("biomentor={level_str},biomentor_core={level_str},biomentor_http={level_str}")
            .into()
    })
}

fn init_file_logging(level: Level, log_file_path: PathBuf) -> Result<()> {
    if let Some(parent) = log_file_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&log_file_path)
        .with_context(|| format!("opening log file {}", log_file_path.display()))?;

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .init();

    Ok(())
}

fn init_stderr_logging(level: Level) -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

fn log_file_path(state_dir: &StateDir) -> PathBuf {
    state_dir.log_dir().join(LOG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_lives_in_state_dir() {
        let state_dir = StateDir::with_override("/tmp/biomentor-test");
        assert_eq!(
            log_file_path(&state_dir),
            PathBuf::from("/tmp/biomentor-test/data/logs/cli.log")
        );
    }
}
