/// Number of questions in every round.
pub const ROUND_LENGTH: u32 = 10;

/// Where the session state machine currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No round has been started yet.
    #[default]
    Idle,
    /// A question has been requested and not yet delivered.
    AwaitingQuestion,
    /// A question is on screen and accepts exactly one answer.
    AwaitingAnswer,
    /// The answer was judged; feedback is showing until the reveal delay elapses.
    Revealing,
    /// All questions were judged and the result was recorded.
    RoundComplete,
}

/// Position and score of the round in progress.
///
/// `current_index` stays below `total_questions`; `correct_count` never exceeds
/// the number of answers judged so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    current_index: u32,
    correct_count: u32,
    judged_count: u32,
    total_questions: u32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            current_index: 0,
            correct_count: 0,
            judged_count: 0,
            total_questions: ROUND_LENGTH,
        }
    }

    #[must_use]
    pub fn current_index(&self) -> u32 {
        self.current_index
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn judged_count(&self) -> u32 {
        self.judged_count
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.total_questions
    }

    /// Counter shown next to the question, e.g. `"3/10"`.
    #[must_use]
    pub fn counter_label(&self) -> String {
        format!("{}/{}", self.current_index + 1, self.total_questions)
    }

    /// Record the verdict for the current question.
    ///
    /// A question can only be judged once; repeated calls for the same index are ignored.
    pub fn record_answer(&mut self, is_correct: bool) {
        if self.judged_count > self.current_index {
            return;
        }
        self.judged_count += 1;
        if is_correct {
            self.correct_count += 1;
        }
    }

    /// Move to the next question.
    ///
    /// Returns `false` (and leaves the index alone) when the current question is the last one.
    pub fn advance(&mut self) -> bool {
        if self.is_last_question() {
            return false;
        }
        self.current_index += 1;
        true
    }
}
