//! BioMentor CLI - quizzes and progress tracking from the terminal

mod commands;
mod config;
mod logging;

use anyhow::Result;
use biomentor_core::StateDir;
use clap::{Parser, ValueEnum};
use commands::Commands;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, debug, error};

#[derive(Parser)]
#[command(name = "biomentor")]
#[command(about = "Practice biology quizzes and track your progress")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// State directory for configuration, session and logs
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<PathBuf>,

    /// Configuration file (defaults to config.toml in the state directory)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Timeout for the whole command in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true, default_value = "120")]
    timeout: u64,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let state_dir = StateDir::resolve(cli.data_dir);
    logging::init_logging(cli.log_level.into(), &state_dir, cli.no_file_log)?;

    debug!("Starting BioMentor CLI");

    let command = cli.command.execute(state_dir, cli.config);
    let outcome = if cli.timeout == 0 {
        Ok(command.await)
    } else {
        tokio::time::timeout(Duration::from_secs(cli.timeout), command).await
    };

    match outcome {
        Ok(Ok(())) => {
            debug!("Command completed successfully");
        }
        Ok(Err(e)) => {
            error!("Command failed: {e:#}");
            std::process::exit(1);
        }
        Err(_) => {
            error!("Command timed out after {} seconds", cli.timeout);
            std::process::exit(1);
        }
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
