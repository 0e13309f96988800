mod controller;
mod presentation;
mod runtime;
mod scheduler;
mod source;
mod view;

// Public API of the session subsystem.
pub use controller::SessionController;
pub use presentation::Presentation;
pub use runtime::{ChannelQuestionRequester, QuizRuntime, SessionEvent, SessionHandle};
pub use scheduler::{ManualRevealScheduler, RevealScheduler, RevealToken, TokioRevealScheduler};
pub use source::{DeckQuestionSource, QuestionRequester, QuestionSource, RequestTicket};
pub use view::{LoadErrorView, QuestionViewModel, RoundSummary, format_summary_text};
