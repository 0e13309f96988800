//! Tunables for a quiz session.

use std::time::Duration;

/// Default pause between judging an answer and moving on.
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_secs(1);

/// Configuration for a quiz session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizConfig {
    /// How long answer feedback stays on screen before the session advances.
    pub reveal_delay: Duration,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            reveal_delay: DEFAULT_REVEAL_DELAY,
        }
    }
}

impl QuizConfig {
    #[must_use]
    pub fn with_reveal_delay(mut self, delay: Duration) -> Self {
        self.reveal_delay = delay;
        self
    }
}
