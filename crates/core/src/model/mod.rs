mod game;
mod question;
mod session;
mod stats;

pub use game::{GameResult, GameResultError};
pub use question::QuizQuestion;
pub use session::{ROUND_LENGTH, SessionPhase, SessionState};
pub use stats::{StatKey, StatisticsSnapshot};
