use std::fmt;
use std::sync::Arc;

use quiz_core::model::{GameResult, QuizQuestion, SessionPhase, SessionState, StatisticsSnapshot};

use super::presentation::Presentation;
use super::scheduler::{RevealScheduler, RevealToken};
use super::source::{QuestionRequester, RequestTicket};
use super::view::{LoadErrorView, QuestionViewModel, RoundSummary};
use crate::config::QuizConfig;
use crate::statistics::StatisticsStore;
use crate::Clock;

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// State machine for one quiz round at a time.
///
/// `Idle → AwaitingQuestion → AwaitingAnswer → Revealing → (AwaitingQuestion … | RoundComplete)`.
///
/// Every method must be called from a single logical task; [`QuizRuntime`](super::QuizRuntime)
/// takes care of that in production. Calls that do not fit the current phase are
/// ignored rather than reported: they come from duplicate or late UI events.
pub struct SessionController {
    config: QuizConfig,
    clock: Clock,
    phase: SessionPhase,
    state: SessionState,
    current_question: Option<QuizQuestion>,
    pending_request: Option<RequestTicket>,
    pending_reveal: Option<RevealToken>,
    next_ticket: u64,
    next_token: u64,
    last_result: Option<GameResult>,
    statistics: StatisticsStore,
    requester: Arc<dyn QuestionRequester>,
    scheduler: Arc<dyn RevealScheduler>,
    presenter: Arc<dyn Presentation>,
}

impl SessionController {
    #[must_use]
    pub fn new(
        config: QuizConfig,
        clock: Clock,
        statistics: StatisticsStore,
        requester: Arc<dyn QuestionRequester>,
        scheduler: Arc<dyn RevealScheduler>,
        presenter: Arc<dyn Presentation>,
    ) -> Self {
        Self {
            config,
            clock,
            phase: SessionPhase::Idle,
            state: SessionState::new(),
            current_question: None,
            pending_request: None,
            pending_reveal: None,
            next_ticket: 0,
            next_token: 0,
            last_result: None,
            statistics,
            requester,
            scheduler,
            presenter,
        }
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.current_question.as_ref()
    }

    /// Ticket of the question request the controller is waiting on, if any.
    #[must_use]
    pub fn pending_request(&self) -> Option<RequestTicket> {
        self.pending_request
    }

    /// Reveal delay the controller is waiting on, if any.
    #[must_use]
    pub fn pending_reveal(&self) -> Option<RevealToken> {
        self.pending_reveal
    }

    /// Result of the most recently completed round.
    #[must_use]
    pub fn last_result(&self) -> Option<GameResult> {
        self.last_result
    }

    #[must_use]
    pub fn statistics(&self) -> &StatisticsStore {
        &self.statistics
    }

    /// Begin the first round. Same as [`Self::restart`].
    pub fn start(&mut self) {
        self.restart();
    }

    /// Reset index and score and request the first question of a new round.
    ///
    /// A reveal delay still pending from the previous round is cancelled and
    /// its eventual firing ignored.
    pub fn restart(&mut self) {
        if let Some(token) = self.pending_reveal.take() {
            self.scheduler.cancel(token);
        }
        self.state = SessionState::new();
        self.current_question = None;
        self.phase = SessionPhase::AwaitingQuestion;
        tracing::debug!("round started");
        self.request_question();
    }

    /// Deliver the answer to a question request.
    ///
    /// Ignored unless the controller is waiting for exactly this `ticket`.
    /// `None` models a source that answered without a question; it is ignored too.
    pub fn on_question_received(&mut self, ticket: RequestTicket, question: Option<QuizQuestion>) {
        if !self.is_awaiting(ticket) {
            tracing::debug!(
                ticket = ticket.value(),
                phase = ?self.phase,
                "ignoring question outside of request"
            );
            return;
        }
        let Some(question) = question else {
            tracing::debug!(ticket = ticket.value(), "ignoring empty question");
            return;
        };

        self.pending_request = None;
        let view = QuestionViewModel::from_question(&question, &self.state);
        self.current_question = Some(question);
        self.phase = SessionPhase::AwaitingAnswer;

        self.presenter.hide_loading();
        self.presenter.show_question(&view);
        self.presenter.set_answers_enabled(true);
    }

    /// Report that a question request failed.
    ///
    /// The controller stays in `AwaitingQuestion` without retrying; only
    /// [`Self::restart`] gets the round going again.
    pub fn on_question_load_failed(&mut self, ticket: RequestTicket, reason: &str) {
        if !self.is_awaiting(ticket) {
            tracing::debug!(ticket = ticket.value(), "ignoring stale load failure");
            return;
        }

        self.pending_request = None;
        tracing::warn!(ticket = ticket.value(), reason, "question failed to load");
        self.presenter.hide_loading();
        self.presenter.show_load_error(&LoadErrorView::new(reason));
    }

    /// Judge the player's answer to the current question.
    ///
    /// Returns whether the answer was correct, or `None` when there is no
    /// question waiting for an answer (the call is then ignored).
    pub fn submit_answer(&mut self, given: bool) -> Option<bool> {
        if self.phase != SessionPhase::AwaitingAnswer {
            tracing::debug!(phase = ?self.phase, "ignoring answer");
            return None;
        }
        let is_correct = self.current_question.as_ref()?.is_correct(given);

        self.state.record_answer(is_correct);
        self.phase = SessionPhase::Revealing;

        let token = RevealToken::new(self.next_token);
        self.next_token += 1;
        self.pending_reveal = Some(token);

        tracing::debug!(
            index = self.state.current_index(),
            is_correct,
            correct = self.state.correct_count(),
            "answer judged"
        );
        self.presenter.set_answers_enabled(false);
        self.presenter.show_answer_feedback(is_correct);
        self.scheduler.schedule(token, self.config.reveal_delay);

        Some(is_correct)
    }

    /// The reveal delay for `token` has elapsed: move on.
    ///
    /// Tokens that were cancelled by a restart, or already handled, are ignored.
    pub async fn on_reveal_elapsed(&mut self, token: RevealToken) {
        if self.phase != SessionPhase::Revealing || self.pending_reveal != Some(token) {
            tracing::debug!(token = token.value(), "ignoring stale reveal");
            return;
        }
        self.pending_reveal = None;
        self.advance().await;
    }

    async fn advance(&mut self) {
        self.current_question = None;

        if self.state.advance() {
            self.phase = SessionPhase::AwaitingQuestion;
            self.request_question();
            return;
        }

        self.phase = SessionPhase::RoundComplete;
        self.complete_round().await;
    }

    async fn complete_round(&mut self) {
        let correct = self.state.correct_count();
        let total = self.state.total_questions();
        let result = match GameResult::new(correct, total, self.clock.now()) {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(%err, "round produced an impossible result");
                return;
            }
        };
        self.last_result = Some(result);

        let before = self.read_statistics().await;
        let stored = match self.statistics.store(correct, total).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(%err, "failed to store game result");
                false
            }
        };
        // If the record cannot be read back, show the last one read, with this
        // game folded in when it was stored.
        let statistics = match self.read_statistics().await {
            Some(snapshot) => Some(snapshot),
            None if stored => before.map(|snapshot| snapshot.with_game(result)),
            None => before,
        };

        tracing::info!(
            correct,
            total,
            games = ?statistics.map(|s| s.games_count),
            "round complete"
        );
        self.presenter
            .show_round_summary(&RoundSummary::new(result, statistics));
    }

    async fn read_statistics(&self) -> Option<StatisticsSnapshot> {
        match self.statistics.snapshot().await {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                tracing::error!(%err, "failed to read statistics");
                None
            }
        }
    }

    fn request_question(&mut self) {
        let ticket = RequestTicket::new(self.next_ticket);
        self.next_ticket += 1;
        self.pending_request = Some(ticket);

        tracing::debug!(
            ticket = ticket.value(),
            index = self.state.current_index(),
            "requesting question"
        );
        self.presenter.show_loading();
        self.requester.request_next(ticket);
    }

    fn is_awaiting(&self, ticket: RequestTicket) -> bool {
        self.phase == SessionPhase::AwaitingQuestion && self.pending_request == Some(ticket)
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("phase", &self.phase)
            .field("state", &self.state)
            .field("pending_request", &self.pending_request)
            .field("pending_reveal", &self.pending_reveal)
            .field("last_result", &self.last_result)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
