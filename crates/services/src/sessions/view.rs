use quiz_core::model::{GameResult, QuizQuestion, SessionState, StatisticsSnapshot};
use quiz_core::time::format_record_date;

pub const ROUND_SUMMARY_TITLE: &str = "This round is over!";
pub const ROUND_SUMMARY_BUTTON: &str = "Play again";
pub const LOAD_ERROR_TITLE: &str = "Error";
pub const LOAD_ERROR_BUTTON: &str = "Try again";

/// What the presentation layer needs to draw one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionViewModel {
    pub image_data: Vec<u8>,
    pub question_text: String,
    /// Position in the round, e.g. `"3/10"`.
    pub counter_label: String,
}

impl QuestionViewModel {
    #[must_use]
    pub fn from_question(question: &QuizQuestion, state: &SessionState) -> Self {
        Self {
            image_data: question.image_data().to_vec(),
            question_text: question.text().to_owned(),
            counter_label: state.counter_label(),
        }
    }
}

/// Result dialog shown once a round is complete.
///
/// Acknowledging it starts a new round. `statistics` is `None` when the record
/// could not be read; the summary then shows the round result only.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSummary {
    pub title: String,
    pub text: String,
    pub button_text: String,
    pub result: GameResult,
    pub statistics: Option<StatisticsSnapshot>,
}

impl RoundSummary {
    #[must_use]
    pub fn new(result: GameResult, statistics: Option<StatisticsSnapshot>) -> Self {
        Self {
            title: ROUND_SUMMARY_TITLE.to_owned(),
            text: format_summary_text(&result, statistics.as_ref()),
            button_text: ROUND_SUMMARY_BUTTON.to_owned(),
            result,
            statistics,
        }
    }
}

/// Four lines: this round, games played, record with its date, accuracy.
#[must_use]
pub fn format_summary_text(
    result: &GameResult,
    statistics: Option<&StatisticsSnapshot>,
) -> String {
    let Some(statistics) = statistics else {
        return format!(
            "Your result: {}\nQuizzes played: unknown\nRecord: unknown\nAverage accuracy: unknown",
            result.score_label()
        );
    };
    let best = &statistics.best_game;
    format!(
        "Your result: {}\nQuizzes played: {}\nRecord: {} ({})\nAverage accuracy: {:.2}%",
        result.score_label(),
        statistics.games_count,
        best.score_label(),
        format_record_date(best.completed_at()),
        statistics.total_accuracy(),
    )
}

/// Dialog shown when a question could not be loaded. Retrying restarts the round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadErrorView {
    pub title: String,
    pub message: String,
    pub button_text: String,
}

impl LoadErrorView {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            title: LOAD_ERROR_TITLE.to_owned(),
            message: message.into(),
            button_text: LOAD_ERROR_BUTTON.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    #[test]
    fn question_view_uses_one_based_counter() {
        let question = QuizQuestion::new(vec![1, 2, 3], "Question Text", true);
        let view = QuestionViewModel::from_question(&question, &SessionState::new());

        assert_eq!(view.question_text, "Question Text");
        assert_eq!(view.counter_label, "1/10");
        assert_eq!(view.image_data, vec![1, 2, 3]);
    }

    #[test]
    fn summary_text_lists_result_games_record_and_accuracy() {
        let now = fixed_now();
        let result = GameResult::new(6, 10, now).unwrap();
        let statistics = StatisticsSnapshot {
            games_count: 3,
            total_correct_ever: 21,
            total_questions_ever: 30,
            best_game: GameResult::new(9, 10, now).unwrap(),
        };

        let summary = RoundSummary::new(result, Some(statistics));

        assert_eq!(summary.title, "This round is over!");
        assert_eq!(summary.button_text, "Play again");
        assert_eq!(
            summary.text,
            "Your result: 6/10\nQuizzes played: 3\nRecord: 9/10 (14.11.23 22:13)\nAverage accuracy: 30.00%"
        );
    }

    #[test]
    fn summary_without_statistics_marks_them_unknown() {
        let result = GameResult::new(7, 10, fixed_now()).unwrap();

        let summary = RoundSummary::new(result, None);

        assert_eq!(
            summary.text,
            "Your result: 7/10\nQuizzes played: unknown\nRecord: unknown\nAverage accuracy: unknown"
        );
    }

    #[test]
    fn load_error_offers_retry() {
        let view = LoadErrorView::new("offline");
        assert_eq!(view.title, "Error");
        assert_eq!(view.message, "offline");
        assert_eq!(view.button_text, "Try again");
    }
}
