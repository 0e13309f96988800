//! Terminal rendering and keyboard input for a quiz session.

use std::io::Write;
use std::sync::Mutex;

use services::{LoadErrorView, Presentation, QuestionViewModel, RoundSummary, SessionHandle};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Draws a session as plain text lines.
pub struct TerminalPresenter<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> TerminalPresenter<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_lines(&self, lines: &[&str]) {
        let Ok(mut out) = self.out.lock() else {
            tracing::warn!("terminal output lock poisoned");
            return;
        };
        let written = lines
            .iter()
            .try_for_each(|line| writeln!(out, "{line}"))
            .and_then(|()| out.flush());
        if let Err(err) = written {
            tracing::warn!(error = %err, "failed to write to terminal");
        }
    }
}

impl<W: Write + Send> Presentation for TerminalPresenter<W> {
    fn show_loading(&self) {
        self.write_lines(&["Loading..."]);
    }

    fn show_question(&self, view: &QuestionViewModel) {
        let header = format!("\nQuestion {}", view.counter_label);
        let image = if view.image_data.is_empty() {
            String::new()
        } else {
            format!("[image, {} bytes]", view.image_data.len())
        };
        let mut lines = vec![header.as_str()];
        if !image.is_empty() {
            lines.push(image.as_str());
        }
        lines.push(view.question_text.as_str());
        lines.push("Answer [y]es or [n]o (r restarts, q quits)");
        self.write_lines(&lines);
    }

    fn show_answer_feedback(&self, is_correct: bool) {
        self.write_lines(&[if is_correct { "Correct!" } else { "Wrong." }]);
    }

    fn show_round_summary(&self, summary: &RoundSummary) {
        let title = format!("\n{}", summary.title);
        let button = format!("[r] {}  [q] Quit", summary.button_text);
        self.write_lines(&[title.as_str(), summary.text.as_str(), button.as_str()]);
    }

    fn show_load_error(&self, error: &LoadErrorView) {
        let title = format!("\n{}", error.title);
        let button = format!("[r] {}  [q] Quit", error.button_text);
        self.write_lines(&[title.as_str(), error.message.as_str(), button.as_str()]);
    }
}

/// One line of keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Answer(bool),
    Restart,
    Quit,
}

impl Input {
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "y" | "yes" | "t" | "true" | "1" => Some(Self::Answer(true)),
            "n" | "no" | "f" | "false" | "0" => Some(Self::Answer(false)),
            "r" | "restart" | "again" => Some(Self::Restart),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Forward keyboard input to the session until the user quits or input ends.
///
/// The session is told to shut down however input handling ends, so the caller
/// can always join it.
///
/// # Errors
///
/// Fails if input cannot be read or the session has already stopped.
pub async fn drive_session<R>(input: R, handle: &SessionHandle) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let forwarded = forward_input(input, handle).await;
    let stopped = handle.shutdown();
    forwarded?;
    stopped?;
    Ok(())
}

async fn forward_input<R>(input: R, handle: &SessionHandle) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        match Input::parse(&line) {
            Some(Input::Answer(given)) => handle.submit_answer(given)?,
            Some(Input::Restart) => handle.restart()?,
            Some(Input::Quit) => break,
            None if line.trim().is_empty() => {}
            None => tracing::debug!(input = %line.trim(), "ignored unrecognised input"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use quiz_core::model::{
        GameResult, QuizQuestion, SessionPhase, SessionState, StatisticsSnapshot,
    };
    use quiz_core::time::fixed_now;
    use services::{
        Clock, DeckQuestionSource, QuizConfig, QuizRuntime, SessionController, StatisticsStore,
    };
    use storage::repository::Storage;
    use tokio::task::JoinHandle;
    use tokio::time::timeout;

    fn rendered(presenter: TerminalPresenter<Vec<u8>>) -> String {
        String::from_utf8(presenter.into_inner()).unwrap()
    }

    fn spawn_session() -> (SessionHandle, JoinHandle<SessionController>) {
        let clock = Clock::fixed(fixed_now());
        let storage = Storage::in_memory();
        let runtime = QuizRuntime::new(
            QuizConfig::default(),
            clock,
            Arc::new(DeckQuestionSource::seeded(
                crate::questions::builtin_deck(),
                7,
            )),
            Arc::new(TerminalPresenter::new(std::io::sink())),
            StatisticsStore::new(clock, Arc::clone(&storage.values)),
        );
        runtime.spawn()
    }

    #[test]
    fn parses_answers_and_commands() {
        assert_eq!(Input::parse("y"), Some(Input::Answer(true)));
        assert_eq!(Input::parse(" YES "), Some(Input::Answer(true)));
        assert_eq!(Input::parse("n"), Some(Input::Answer(false)));
        assert_eq!(Input::parse("0"), Some(Input::Answer(false)));
        assert_eq!(Input::parse("r"), Some(Input::Restart));
        assert_eq!(Input::parse("q"), Some(Input::Quit));
        assert_eq!(Input::parse("maybe"), None);
    }

    #[test]
    fn question_shows_counter_text_and_image_size() {
        let presenter = TerminalPresenter::new(Vec::new());
        let question = QuizQuestion::new(vec![1, 2, 3], "Is it?", true);
        presenter.show_question(&QuestionViewModel::from_question(
            &question,
            &SessionState::new(),
        ));

        let out = rendered(presenter);
        assert!(out.contains("Question 1/10"));
        assert!(out.contains("[image, 3 bytes]"));
        assert!(out.contains("Is it?"));
    }

    #[test]
    fn summary_prints_title_text_and_button() {
        let presenter = TerminalPresenter::new(Vec::new());
        let result = GameResult::new(8, 10, fixed_now()).unwrap();
        let snapshot = StatisticsSnapshot {
            games_count: 1,
            total_correct_ever: 8,
            total_questions_ever: 10,
            best_game: result,
        };
        presenter.show_round_summary(&RoundSummary::new(result, Some(snapshot)));

        let out = rendered(presenter);
        assert!(out.contains("This round is over!"));
        assert!(out.contains("Your result: 8/10"));
        assert!(out.contains("[r] Play again"));
    }

    #[test]
    fn load_error_offers_retry() {
        let presenter = TerminalPresenter::new(Vec::new());
        presenter.show_load_error(&LoadErrorView::new("deck is empty"));

        let out = rendered(presenter);
        assert!(out.contains("Error"));
        assert!(out.contains("deck is empty"));
        assert!(out.contains("[r] Try again"));
    }

    #[tokio::test]
    async fn unreadable_input_still_stops_the_session() {
        let (handle, session) = spawn_session();
        handle.start().unwrap();

        let input: &[u8] = &[0xFF, 0xFE, b'\n'];
        let driven = drive_session(input, &handle).await;
        assert!(driven.is_err());

        let controller = timeout(Duration::from_secs(3), session)
            .await
            .expect("session stops after unreadable input")
            .unwrap();
        assert_ne!(controller.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn quit_stops_the_session() {
        let (handle, session) = spawn_session();
        handle.start().unwrap();

        let input: &[u8] = b"y\nq\n";
        drive_session(input, &handle).await.unwrap();

        timeout(Duration::from_secs(3), session)
            .await
            .expect("session stops after quit")
            .unwrap();
        assert!(handle.restart().is_err());
    }
}
