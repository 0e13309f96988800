use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::{QuizQuestion, SessionPhase};
use quiz_core::time::fixed_now;
use services::{
    Clock, DeckQuestionSource, LoadErrorView, Presentation, QuestionSource, QuestionSourceError,
    QuestionViewModel, QuizConfig, QuizRuntime, RoundSummary, StatisticsStore,
};
use storage::repository::Storage;
use tokio::sync::mpsc;
use tokio::time::timeout;

#[derive(Debug)]
enum Seen {
    Question(QuestionViewModel),
    Feedback(bool),
    Summary(RoundSummary),
    LoadError(LoadErrorView),
}

struct ChannelPresenter {
    tx: mpsc::UnboundedSender<Seen>,
}

impl Presentation for ChannelPresenter {
    fn show_question(&self, view: &QuestionViewModel) {
        let _ = self.tx.send(Seen::Question(view.clone()));
    }

    fn show_answer_feedback(&self, is_correct: bool) {
        let _ = self.tx.send(Seen::Feedback(is_correct));
    }

    fn show_round_summary(&self, summary: &RoundSummary) {
        let _ = self.tx.send(Seen::Summary(summary.clone()));
    }

    fn show_load_error(&self, error: &LoadErrorView) {
        let _ = self.tx.send(Seen::LoadError(error.clone()));
    }
}

async fn next_seen(rx: &mut mpsc::UnboundedReceiver<Seen>) -> Seen {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("presentation event in time")
        .expect("presenter channel open")
}

fn all_true_deck() -> Vec<QuizQuestion> {
    (1..=10)
        .map(|i| QuizQuestion::text_only(format!("Is movie {i} rated above 6?"), true))
        .collect()
}

fn runtime(
    config: QuizConfig,
    source: Arc<dyn QuestionSource>,
    storage: &Storage,
) -> (QuizRuntime, mpsc::UnboundedReceiver<Seen>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let clock = Clock::fixed(fixed_now());
    let statistics = StatisticsStore::new(clock, Arc::clone(&storage.values));
    let runtime = QuizRuntime::new(
        config,
        clock,
        source,
        Arc::new(ChannelPresenter { tx }),
        statistics,
    );
    (runtime, rx)
}

#[tokio::test]
async fn full_round_persists_statistics() {
    let storage = Storage::sqlite("sqlite:file:memdb_quiz_round?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    let source = Arc::new(DeckQuestionSource::seeded(all_true_deck(), 1));
    let (runtime, mut rx) = runtime(
        QuizConfig::default().with_reveal_delay(Duration::ZERO),
        source,
        &storage,
    );
    let (handle, task) = runtime.spawn();

    handle.start().unwrap();
    let answers = [true, false, true, true, false, true, true, false, true, true];
    for (i, given) in answers.into_iter().enumerate() {
        match next_seen(&mut rx).await {
            Seen::Question(view) => assert_eq!(view.counter_label, format!("{}/10", i + 1)),
            other => panic!("expected question, got {other:?}"),
        }
        handle.submit_answer(given).unwrap();
        // A second tap on the same question is dropped.
        handle.submit_answer(given).unwrap();
        match next_seen(&mut rx).await {
            Seen::Feedback(is_correct) => assert_eq!(is_correct, given),
            other => panic!("expected feedback, got {other:?}"),
        }
    }

    let summary = match next_seen(&mut rx).await {
        Seen::Summary(summary) => summary,
        other => panic!("expected summary, got {other:?}"),
    };
    assert_eq!(summary.result.correct(), 7);
    assert_eq!(summary.statistics.map(|s| s.games_count), Some(1));
    assert!(summary.text.starts_with("Your result: 7/10\nQuizzes played: 1\n"));

    // Acknowledging the summary starts a new round.
    handle.restart().unwrap();
    match next_seen(&mut rx).await {
        Seen::Question(view) => assert_eq!(view.counter_label, "1/10"),
        other => panic!("expected question, got {other:?}"),
    }

    handle.shutdown().unwrap();
    let controller = task.await.expect("session task");
    assert_eq!(controller.phase(), SessionPhase::AwaitingAnswer);
    assert_eq!(controller.state().correct_count(), 0);

    let reloaded = StatisticsStore::new(Clock::fixed(fixed_now()), Arc::clone(&storage.values));
    assert_eq!(reloaded.games_count().await.unwrap(), 1);
    assert_eq!(reloaded.best_game().await.unwrap().correct(), 7);
}

struct FlakySource {
    attempts: AtomicUsize,
    deck: DeckQuestionSource,
}

#[async_trait]
impl QuestionSource for FlakySource {
    async fn prepare(&self) -> Result<(), QuestionSourceError> {
        if self.attempts.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(QuestionSourceError::Load("offline".into()));
        }
        Ok(())
    }

    async fn next_question(&self) -> Result<QuizQuestion, QuestionSourceError> {
        self.deck.next_question().await
    }
}

#[tokio::test]
async fn load_failure_is_recovered_by_restart() {
    let storage = Storage::in_memory();
    let source = Arc::new(FlakySource {
        attempts: AtomicUsize::new(0),
        deck: DeckQuestionSource::seeded(all_true_deck(), 2),
    });
    let (runtime, mut rx) = runtime(QuizConfig::default(), source.clone(), &storage);
    let (handle, task) = runtime.spawn();

    handle.start().unwrap();
    match next_seen(&mut rx).await {
        Seen::LoadError(error) => {
            assert_eq!(error.message, "failed to load questions: offline");
            assert_eq!(error.button_text, "Try again");
        }
        other => panic!("expected load error, got {other:?}"),
    }

    handle.restart().unwrap();
    match next_seen(&mut rx).await {
        Seen::Question(view) => assert_eq!(view.counter_label, "1/10"),
        other => panic!("expected question, got {other:?}"),
    }
    assert_eq!(source.attempts.load(Ordering::SeqCst), 2);

    handle.shutdown().unwrap();
    task.await.expect("session task");
}

#[tokio::test]
async fn restart_during_reveal_cancels_advance() {
    let storage = Storage::in_memory();
    let source = Arc::new(DeckQuestionSource::seeded(all_true_deck(), 3));
    let (runtime, mut rx) = runtime(
        QuizConfig::default().with_reveal_delay(Duration::from_secs(60)),
        source,
        &storage,
    );
    let (handle, task) = runtime.spawn();

    handle.start().unwrap();
    assert!(matches!(next_seen(&mut rx).await, Seen::Question(_)));
    handle.submit_answer(true).unwrap();
    assert!(matches!(next_seen(&mut rx).await, Seen::Feedback(true)));

    handle.restart().unwrap();
    match next_seen(&mut rx).await {
        Seen::Question(view) => assert_eq!(view.counter_label, "1/10"),
        other => panic!("expected question, got {other:?}"),
    }

    handle.shutdown().unwrap();
    let controller = task.await.expect("session task");
    assert_eq!(controller.state().current_index(), 0);
    assert_eq!(controller.state().correct_count(), 0);
    assert_eq!(controller.pending_reveal(), None);
}
