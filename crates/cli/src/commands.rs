//! CLI commands

use anyhow::{Context, Result, bail};
use biomentor_core::{ClientConfig, ExpiryReason, FileCredentialStore, SessionEvent, StateDir};
use biomentor_http::client::topic::DEFAULT_UNIT_QUESTION_COUNT;
use biomentor_http::types::{
    GeneratedQuiz, Options, QuizAnswer, QuizSummary, RegisterRequest, SubmitQuizRequest,
    SubmitUnitQuizRequest, UnitAnswer, UnitGradedResponse,
};
use biomentor_http::{ApiClient, ApiClientBuilder};
use clap::Subcommand;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info};

use crate::config;

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    #[command(flatten)]
    Session(SessionCommands),
}

/// Commands that talk to the API with the stored session
#[derive(Subcommand)]
pub enum SessionCommands {
    /// Log in and store the session
    Login {
        #[arg(long, env = "BIOMENTOR_EMAIL")]
        email: String,

        #[arg(long, env = "BIOMENTOR_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account (does not log in)
    Register {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "BIOMENTOR_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        full_name: String,

        #[arg(long)]
        education_level: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged in user
    Whoami,

    /// Adaptive and difficulty-mixed quizzes
    Quiz {
        #[command(subcommand)]
        command: QuizCommands,
    },

    /// Quizzes drawn from one syllabus unit
    Topic {
        #[command(subcommand)]
        command: TopicCommands,
    },

    /// Performance statistics
    Dashboard {
        #[command(subcommand)]
        command: DashboardCommands,
    },

    /// Explain the answer to a question
    Explain {
        #[arg(long)]
        question: String,

        /// Answer option as LETTER=TEXT, repeatable
        #[arg(long = "option", value_parser = parse_option, required = true)]
        options: Vec<(String, String)>,

        /// Verify this answer letter before explaining
        #[arg(long)]
        answer: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum QuizCommands {
    /// Generate a quiz across all difficulty levels
    Generate,

    /// Generate a quiz matched to your ability
    Adaptive {
        #[arg(long, default_value_t = 10)]
        count: u32,
    },

    /// Show a stored quiz
    Show { quiz_id: String },

    /// Submit answers from a JSON file
    ///
    /// The file holds a list of `{question_text, selected_answer, time_taken}`.
    Submit {
        quiz_id: String,

        #[arg(long)]
        answers: PathBuf,
    },

    /// List past attempts
    History,

    /// Show the graded answers of one attempt
    Results {
        quiz_id: String,

        #[arg(long, default_value_t = 1)]
        attempt: u32,
    },
}

#[derive(Subcommand)]
pub enum TopicCommands {
    /// Generate a quiz for one unit
    Generate {
        unit: String,

        #[arg(long, default_value_t = DEFAULT_UNIT_QUESTION_COUNT)]
        count: u32,
    },

    /// Submit answers from a JSON file of `{question_text, selected_answer}`
    Submit {
        quiz_id: String,

        #[arg(long)]
        answers: PathBuf,
    },

    /// Completed unit quizzes grouped by unit
    Status,

    /// Show the graded answers of a unit quiz
    Results { quiz_id: String },
}

#[derive(Subcommand)]
pub enum DashboardCommands {
    /// Accuracy per difficulty, comparison and engagement
    Summary,

    /// Top users by accuracy
    Leaderboard,

    /// Daily quiz streak
    Streak,

    /// Progress insights and recent performance
    Insights,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a default configuration file
    Init {
        /// Output file path (defaults to the state directory's config.toml)
        output: Option<PathBuf>,

        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

impl Commands {
    pub async fn execute(self, state_dir: StateDir, config_path: Option<PathBuf>) -> Result<()> {
        match self {
            Commands::Config { command } => command.execute(&state_dir, config_path.as_deref()),
            Commands::Session(command) => {
                let config = config::load_client_config(&state_dir, config_path.as_deref())?;
                state_dir.create_directories().await?;
                let client = build_client(&config, &state_dir)?;

                let mut events = client.subscribe();
                let result = command.run(&client).await;
                if let Some(reason) = session_expired(&mut events) {
                    eprintln!(
                        "Your session has ended ({reason}). Run `biomentor login` to sign in again."
                    );
                    bail!("session expired");
                }
                result
            }
        }
    }
}

impl SessionCommands {
    async fn run(self, client: &ApiClient) -> Result<()> {
        match self {
            SessionCommands::Login { email, password } => {
                let user = client.login(&email, &password).await?;
                println!("Logged in as {} ({})", user.username, user.email);
                Ok(())
            }
            SessionCommands::Register {
                username,
                email,
                password,
                full_name,
                education_level,
            } => {
                register(
                    client,
                    RegisterRequest {
                        username,
                        email,
                        password,
                        full_name,
                        education_level,
                    },
                )
                .await
            }
            SessionCommands::Logout => {
                client.logout().await?;
                println!("Logged out");
                Ok(())
            }
            SessionCommands::Whoami => {
                match client.current_user().await? {
                    Some(user) => {
                        println!("{} <{}>", user.username, user.email);
                        println!("user id: {}", user.user_id);
                    }
                    None => println!("Not logged in. Run `biomentor login`."),
                }
                Ok(())
            }
            SessionCommands::Quiz { command } => command.execute(client).await,
            SessionCommands::Topic { command } => command.execute(client).await,
            SessionCommands::Dashboard { command } => command.execute(client).await,
            SessionCommands::Explain {
                question,
                options,
                answer,
            } => {
                let options: Options = options.into_iter().collect();
                let explanation = match answer {
                    Some(answer) => {
                        client
                            .verify_and_explain(&question, options, &answer)
                            .await?
                    }
                    None => client.explain(&question, options).await?,
                };
                print_json(&explanation)
            }
        }
    }
}

impl QuizCommands {
    async fn execute(self, client: &ApiClient) -> Result<()> {
        let user = client.require_user().await?;

        match self {
            QuizCommands::Generate => {
                let quiz = client.generate_quiz(&user.user_id).await?;
                print_generated(&quiz);
                Ok(())
            }
            QuizCommands::Adaptive { count } => {
                let quiz = client.generate_adaptive_quiz(&user.user_id, count).await?;
                print_generated(&quiz);
                Ok(())
            }
            QuizCommands::Show { quiz_id } => {
                let quiz = client.get_quiz(&quiz_id).await?;
                println!("Quiz {} ({} questions)", quiz.quiz_id, quiz.questions.len());
                for (number, question) in quiz.questions.iter().enumerate() {
                    print_question(number + 1, &question.question_text, &question.options());
                }
                Ok(())
            }
            QuizCommands::Submit { quiz_id, answers } => {
                let responses: Vec<QuizAnswer> = read_json(&answers)?;
                let attempt = client
                    .submit_quiz(&SubmitQuizRequest {
                        user_id: user.user_id,
                        quiz_id,
                        responses,
                    })
                    .await?;
                println!("Attempt {} submitted", attempt.attempt_number);
                print_summary(&attempt.summary);
                Ok(())
            }
            QuizCommands::History => {
                let history = client.quiz_history(&user.user_id).await?;
                if history.quiz_history.is_empty() {
                    println!(
                        "{}",
                        history.message.as_deref().unwrap_or("No quizzes taken yet")
                    );
                }
                for entry in &history.quiz_history {
                    println!("Quiz {}", entry.quiz_id);
                    for attempt in &entry.attempts {
                        println!(
                            "  #{} {}  {}/{} correct ({:.1}%)",
                            attempt.attempt_number,
                            format_timestamp(attempt.submitted_at),
                            attempt.summary.correct_answers,
                            attempt.summary.total_questions,
                            attempt.summary.accuracy
                        );
                    }
                }
                Ok(())
            }
            QuizCommands::Results { quiz_id, attempt } => {
                let attempt = client
                    .attempt_results(&user.user_id, &quiz_id, attempt)
                    .await?;
                println!(
                    "Quiz {} attempt {} submitted {}",
                    attempt.quiz_id,
                    attempt.attempt_number,
                    format_timestamp(attempt.submitted_at)
                );
                for response in &attempt.responses {
                    println!(
                        "{} {}\n    answered {}, correct {}",
                        mark(response.is_correct),
                        response.question_text,
                        response.selected_answer,
                        response.correct_answer
                    );
                }
                print_summary(&attempt.summary);
                Ok(())
            }
        }
    }
}

impl TopicCommands {
    async fn execute(self, client: &ApiClient) -> Result<()> {
        let user = client.require_user().await?;

        match self {
            TopicCommands::Generate { unit, count } => {
                let quiz = client
                    .generate_unit_quiz(&user.user_id, &unit, count)
                    .await?;
                if let Some(message) = &quiz.message {
                    println!("{message}");
                }
                println!("Quiz {} ({} questions)", quiz.quiz_id, quiz.questions.len());
                for (number, question) in quiz.questions.iter().enumerate() {
                    print_question(number + 1, &question.question_text, &question.options);
                }
                Ok(())
            }
            TopicCommands::Submit { quiz_id, answers } => {
                let responses: Vec<UnitAnswer> = read_json(&answers)?;
                let result = client
                    .submit_unit_quiz(&user.user_id, &SubmitUnitQuizRequest { quiz_id, responses })
                    .await?;
                print_unit_responses(&result.responses);
                println!("Score: {}/{}", result.score, result.total_questions);
                Ok(())
            }
            TopicCommands::Status => {
                let status = client.unit_quiz_status(&user.user_id).await?;
                if status.is_empty() {
                    println!("No unit quizzes taken yet");
                }
                for (unit, attempts) in &status {
                    println!("{unit}");
                    for attempt in attempts {
                        println!(
                            "  {}  {}  {}/{}",
                            attempt.quiz_id,
                            attempt.submitted_at,
                            attempt.score,
                            attempt.total_questions
                        );
                    }
                }
                Ok(())
            }
            TopicCommands::Results { quiz_id } => {
                let results = client.unit_quiz_results(&quiz_id).await?;
                println!(
                    "{} (submitted {})",
                    results.unit_name, results.submitted_at
                );
                print_unit_responses(&results.responses);
                println!(
                    "Score: {}/{}",
                    results.correct_count, results.total_questions
                );
                Ok(())
            }
        }
    }
}

impl DashboardCommands {
    async fn execute(self, client: &ApiClient) -> Result<()> {
        match self {
            DashboardCommands::Leaderboard => {
                let board = client.leaderboard().await?;
                for (rank, entry) in board.leaderboard.iter().enumerate() {
                    println!("{:>3}. {:<24} {:.1}%", rank + 1, entry.name, entry.accuracy);
                }
                Ok(())
            }
            DashboardCommands::Streak => {
                let user = client.require_user().await?;
                let streak = client.user_streak(&user.user_id).await?;
                println!(
                    "Current streak: {} days (longest {})",
                    streak.streak, streak.longest_streak
                );
                Ok(())
            }
            DashboardCommands::Summary => {
                let user = client.require_user().await?;
                let dashboard = client.dashboard_data(&user.user_id).await?;
                let comparison = client.performance_comparison(&user.user_id).await?;
                let engagement = client.engagement_score(&user.user_id).await?;
                print_json(&serde_json::json!({
                    "dashboard": dashboard,
                    "comparison": comparison,
                    "engagement": engagement,
                }))
            }
            DashboardCommands::Insights => {
                let user = client.require_user().await?;
                let insights = client.progress_insights(&user.user_id).await?;
                let performance = client.performance_graph(&user.user_id).await?;
                print_json(&serde_json::json!({
                    "insights": insights,
                    "performance": performance,
                }))
            }
        }
    }
}

impl ConfigCommands {
    fn execute(self, state_dir: &StateDir, config_path: Option<&Path>) -> Result<()> {
        match self {
            ConfigCommands::Init { output, force } => {
                let path = config::default_config_path(state_dir, output);
                config::generate_default_config(&path, force)?;
                println!("Generated configuration at: {}", path.display());
                Ok(())
            }
            ConfigCommands::Show => {
                let config = config::load_client_config(state_dir, config_path)?;
                print!("{}", config.to_toml_string()?);
                Ok(())
            }
        }
    }
}

fn build_client(config: &ClientConfig, state_dir: &StateDir) -> Result<ApiClient> {
    let store = FileCredentialStore::new(state_dir.session_path());
    debug!(path = %store.path().display(), "Using session file");

    ApiClientBuilder::from_config(config)
        .credential_store(Arc::new(store))
        .build()
        .context("building API client")
}

async fn register(client: &ApiClient, request: RegisterRequest) -> Result<()> {
    if client.auth().user_exists(&request.email).await? {
        bail!("an account for {} already exists", request.email);
    }
    let response = client.register(&request).await?;
    info!(user_id = %response.user_id, "Registered");
    println!("{}. Run `biomentor login` to sign in.", response.message);
    Ok(())
}

/// First expiry published while the command ran, if any
fn session_expired(events: &mut broadcast::Receiver<SessionEvent>) -> Option<ExpiryReason> {
    loop {
        match events.try_recv() {
            Ok(SessionEvent::Expired(reason)) => return Some(reason),
            Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
        }
    }
}

/// Parse `LETTER=TEXT`
fn parse_option(raw: &str) -> Result<(String, String), String> {
    let (letter, text) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected LETTER=TEXT, got `{raw}`"))?;
    let letter = letter.trim().to_uppercase();
    if letter.is_empty() || text.trim().is_empty() {
        return Err(format!("expected LETTER=TEXT, got `{raw}`"));
    }
    Ok((letter, text.trim().to_string()))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn print_json(value: &JsonValue) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_generated(quiz: &GeneratedQuiz) {
    if let Some(error) = &quiz.error {
        eprintln!("warning: {error}");
    }
    println!("Quiz {} ({} questions)", quiz.quiz_id, quiz.total_questions);
    for (number, question) in quiz.mcqs.iter().enumerate() {
        print_question(number + 1, &question.question_text, &question.options());
    }
}

fn print_question(number: usize, text: &str, options: &Options) {
    println!("\n{number}. {text}");
    for (letter, option) in options {
        println!("   {letter}) {option}");
    }
}

fn print_unit_responses(responses: &[UnitGradedResponse]) {
    for response in responses {
        println!(
            "{} {}\n    answered {}, correct {}",
            mark(response.is_correct),
            response.question_text,
            response.selected_answer,
            response.correct_answer
        );
    }
}

fn print_summary(summary: &QuizSummary) {
    println!(
        "Score: {}/{} ({:.1}%), {:.1}s total, {:.1}s per question",
        summary.correct_answers,
        summary.total_questions,
        summary.accuracy,
        summary.total_time,
        summary.avg_time_per_question
    );
}

fn mark(correct: bool) -> &'static str {
    if correct { "[x]" } else { "[ ]" }
}

fn format_timestamp(seconds: f64) -> String {
    chrono::DateTime::from_timestamp(seconds as i64, 0)
        .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| seconds.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use biomentor_core::SessionEvents;

    #[test]
    fn test_parse_option() {
        assert_eq!(
            parse_option("a=Mitochondria").unwrap(),
            ("A".to_string(), "Mitochondria".to_string())
        );
        assert_eq!(
            parse_option("B= Has = sign ").unwrap(),
            ("B".to_string(), "Has = sign".to_string())
        );
        assert!(parse_option("Mitochondria").is_err());
        assert!(parse_option("C=").is_err());
    }

    #[test]
    fn test_session_expired_finds_expiry_among_events() {
        let events = SessionEvents::new();
        let mut receiver = events.subscribe();

        events.emit(SessionEvent::Refreshed);
        events.emit(SessionEvent::Expired(ExpiryReason::MissingRefreshToken));
        events.emit(SessionEvent::LoggedOut);

        assert_eq!(
            session_expired(&mut receiver),
            Some(ExpiryReason::MissingRefreshToken)
        );
    }

    #[test]
    fn test_session_expired_none_without_expiry() {
        let events = SessionEvents::new();
        let mut receiver = events.subscribe();
        events.emit(SessionEvent::LoggedOut);

        assert_eq!(session_expired(&mut receiver), None);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "1970-01-01 00:00 UTC");
        assert_eq!(format_timestamp(1718000000.5), "2024-06-10 06:13 UTC");
    }
}
