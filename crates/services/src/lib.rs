#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod sessions;
pub mod statistics;

pub use quiz_core::Clock;

pub use config::QuizConfig;
pub use error::{QuestionSourceError, RuntimeError, StatisticsError};
pub use sessions::{
    ChannelQuestionRequester, DeckQuestionSource, LoadErrorView, ManualRevealScheduler,
    Presentation, QuestionRequester, QuestionSource, QuestionViewModel, QuizRuntime,
    RequestTicket, RevealScheduler, RevealToken, RoundSummary, SessionController, SessionEvent,
    SessionHandle, TokioRevealScheduler,
};
pub use statistics::StatisticsStore;
