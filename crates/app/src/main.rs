use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use quiz_core::time::format_record_date;
use services::{Clock, DeckQuestionSource, QuizConfig, QuizRuntime, StatisticsStore};
use storage::repository::Storage;
use tokio::io::BufReader;

mod console;
mod logging;
mod questions;

use console::TerminalPresenter;
use logging::{LogFormat, LoggingConfig};

/// True/false quiz in the terminal, ten questions per round.
#[derive(Debug, Parser)]
#[command(name = "quiz", version, about)]
struct Args {
    /// SQLite database holding the statistics.
    #[arg(long = "db", env = "QUIZ_DB_URL", default_value = "sqlite://quiz.sqlite3")]
    db_url: String,

    /// JSON question file; the built-in deck is used when omitted.
    #[arg(long, env = "QUIZ_QUESTIONS")]
    questions: Option<PathBuf>,

    /// Pause between answering and the next question.
    #[arg(long, default_value_t = 1000)]
    reveal_delay_ms: u64,

    /// Log output format: text, json or pretty.
    #[arg(long, env = "QUIZ_LOG_FORMAT", default_value = "text")]
    log_format: LogFormat,

    /// Log filter, e.g. `info` or `services=debug`. `RUST_LOG` takes precedence.
    #[arg(long, env = "QUIZ_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
enum Command {
    /// Play rounds until you quit (default).
    Play,
    /// Print the stored statistics and exit.
    Stats,
}

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_string();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Make sure the directory of a file database exists; `SQLite` creates the file itself.
fn prepare_sqlite_dir(db_url: &str) -> anyhow::Result<()> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid --db value: {db_url}");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid --db value: {db_url}");
    }

    if let Some(parent) = std::path::Path::new(path).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}

async fn play(args: &Args, statistics: StatisticsStore, clock: Clock) -> anyhow::Result<()> {
    let deck = match &args.questions {
        Some(path) => questions::load_deck(path)?,
        None => questions::builtin_deck(),
    };
    tracing::info!(questions = deck.len(), "question deck loaded");

    let config =
        QuizConfig::default().with_reveal_delay(Duration::from_millis(args.reveal_delay_ms));
    let runtime = QuizRuntime::new(
        config,
        clock,
        Arc::new(DeckQuestionSource::new(deck)),
        Arc::new(TerminalPresenter::new(std::io::stdout())),
        statistics,
    );
    let (handle, session) = runtime.spawn();

    handle.start()?;
    let input = BufReader::new(tokio::io::stdin());
    let driven = console::drive_session(input, &handle).await;
    let controller = session.await.context("quiz session task failed")?;
    tracing::debug!(phase = ?controller.phase(), "session finished");
    driven
}

async fn print_stats(statistics: &StatisticsStore) -> anyhow::Result<()> {
    let snapshot = statistics.snapshot().await?;
    println!("Quizzes played: {}", snapshot.games_count);
    if snapshot.games_count > 0 {
        let best = &snapshot.best_game;
        println!(
            "Record: {} ({})",
            best.score_label(),
            format_record_date(best.completed_at())
        );
    }
    println!("Average accuracy: {:.2}%", snapshot.total_accuracy());
    println!(
        "Answers correct overall: {}/{} ({:.2}%)",
        snapshot.total_correct_ever,
        snapshot.total_questions_ever,
        snapshot.cumulative_accuracy()
    );
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    LoggingConfig::new(args.log_format, args.log_level.clone()).init()?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    let db_url = normalize_sqlite_url(&args.db_url);
    prepare_sqlite_dir(&db_url)?;
    let storage = Storage::sqlite(&db_url)
        .await
        .with_context(|| format!("failed to open statistics database {db_url}"))?;
    tracing::debug!(db = %db_url, "statistics database ready");

    let clock = Clock::default();
    let statistics = StatisticsStore::new(clock, Arc::clone(&storage.values));

    match args.command.unwrap_or(Command::Play) {
        Command::Play => play(&args, statistics, clock).await,
        Command::Stats => print_stats(&statistics).await,
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(err) = run(args).await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err:#}");
        std::process::exit(2);
    }
}
