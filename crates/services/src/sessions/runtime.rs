use std::sync::Arc;

use quiz_core::model::QuizQuestion;
use tokio::sync::OnceCell;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use super::controller::SessionController;
use super::presentation::Presentation;
use super::scheduler::{RevealToken, TokioRevealScheduler};
use super::source::{QuestionRequester, QuestionSource, RequestTicket};
use crate::config::QuizConfig;
use crate::error::{QuestionSourceError, RuntimeError};
use crate::statistics::StatisticsStore;
use crate::Clock;

/// Everything that can change a running session, in arrival order.
#[derive(Debug)]
pub enum SessionEvent {
    Start,
    Restart,
    Answer(bool),
    QuestionLoaded {
        ticket: RequestTicket,
        result: Result<QuizQuestion, QuestionSourceError>,
    },
    RevealElapsed(RevealToken),
    Shutdown,
}

/// User-input side of a running session. Cheap to clone.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    events: UnboundedSender<SessionEvent>,
}

impl SessionHandle {
    /// # Errors
    ///
    /// Returns `RuntimeError::Closed` if the session loop has stopped.
    pub fn start(&self) -> Result<(), RuntimeError> {
        self.send(SessionEvent::Start)
    }

    /// Start over; also used to acknowledge a round summary or retry after a load error.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Closed` if the session loop has stopped.
    pub fn restart(&self) -> Result<(), RuntimeError> {
        self.send(SessionEvent::Restart)
    }

    /// # Errors
    ///
    /// Returns `RuntimeError::Closed` if the session loop has stopped.
    pub fn submit_answer(&self, given: bool) -> Result<(), RuntimeError> {
        self.send(SessionEvent::Answer(given))
    }

    /// Stop the session loop once the events queued before it are handled.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Closed` if the session loop has already stopped.
    pub fn shutdown(&self) -> Result<(), RuntimeError> {
        self.send(SessionEvent::Shutdown)
    }

    fn send(&self, event: SessionEvent) -> Result<(), RuntimeError> {
        self.events.send(event).map_err(|_| RuntimeError::Closed)
    }
}

/// Runs question requests on tokio tasks and posts their results back as events.
///
/// The source is prepared once, before its first question; a failed preparation
/// is retried with the next request.
pub struct ChannelQuestionRequester {
    source: Arc<dyn QuestionSource>,
    prepared: Arc<OnceCell<()>>,
    events: UnboundedSender<SessionEvent>,
}

impl ChannelQuestionRequester {
    #[must_use]
    pub fn new(source: Arc<dyn QuestionSource>, events: UnboundedSender<SessionEvent>) -> Self {
        Self {
            source,
            prepared: Arc::new(OnceCell::new()),
            events,
        }
    }
}

impl QuestionRequester for ChannelQuestionRequester {
    fn request_next(&self, ticket: RequestTicket) {
        let source = Arc::clone(&self.source);
        let prepared = Arc::clone(&self.prepared);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = match prepared.get_or_try_init(|| source.prepare()).await {
                Ok(_) => source.next_question().await,
                Err(err) => Err(err),
            };
            if events
                .send(SessionEvent::QuestionLoaded { ticket, result })
                .is_err()
            {
                tracing::debug!(ticket = ticket.value(), "session closed before question arrived");
            }
        });
    }
}

/// Owns a [`SessionController`] and feeds it events one at a time.
///
/// User input, question results and reveal timers all go through one channel,
/// so the controller never sees two of them concurrently.
pub struct QuizRuntime {
    controller: SessionController,
    events: UnboundedReceiver<SessionEvent>,
    handle: SessionHandle,
}

impl QuizRuntime {
    /// Wire a session with tokio-backed question requests and reveal timers.
    #[must_use]
    pub fn new(
        config: QuizConfig,
        clock: Clock,
        source: Arc<dyn QuestionSource>,
        presenter: Arc<dyn Presentation>,
        statistics: StatisticsStore,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let requester = Arc::new(ChannelQuestionRequester::new(source, tx.clone()));
        let scheduler = Arc::new(TokioRevealScheduler::new(tx.clone()));
        let controller =
            SessionController::new(config, clock, statistics, requester, scheduler, presenter);
        Self {
            controller,
            events: rx,
            handle: SessionHandle { events: tx },
        }
    }

    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    #[must_use]
    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    /// Process events until `Shutdown`, then hand the controller back.
    pub async fn run(mut self) -> SessionController {
        while let Some(event) = self.events.recv().await {
            if !self.dispatch(event).await {
                break;
            }
        }
        tracing::debug!("quiz session stopped");
        self.controller
    }

    /// Run the session on its own task.
    #[must_use]
    pub fn spawn(self) -> (SessionHandle, JoinHandle<SessionController>) {
        let handle = self.handle();
        (handle, tokio::spawn(self.run()))
    }

    async fn dispatch(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::Start => self.controller.start(),
            SessionEvent::Restart => self.controller.restart(),
            SessionEvent::Answer(given) => {
                self.controller.submit_answer(given);
            }
            SessionEvent::QuestionLoaded { ticket, result } => match result {
                Ok(question) => self.controller.on_question_received(ticket, Some(question)),
                Err(err) => self
                    .controller
                    .on_question_load_failed(ticket, &err.to_string()),
            },
            SessionEvent::RevealElapsed(token) => self.controller.on_reveal_elapsed(token).await,
            SessionEvent::Shutdown => return false,
        }
        true
    }
}
