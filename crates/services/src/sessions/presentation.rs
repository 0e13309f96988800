use super::view::{LoadErrorView, QuestionViewModel, RoundSummary};

/// Rendering side of a quiz session.
///
/// Implementations only draw; user input goes back through a
/// [`SessionHandle`](super::SessionHandle). Acknowledging a round summary or
/// retrying after a load error both map to `SessionHandle::restart`.
pub trait Presentation: Send + Sync {
    /// A question has been requested and is on its way.
    fn show_loading(&self) {}

    fn hide_loading(&self) {}

    fn show_question(&self, view: &QuestionViewModel);

    /// Enables or disables the yes/no controls.
    fn set_answers_enabled(&self, _enabled: bool) {}

    /// Highlight the judged answer.
    fn show_answer_feedback(&self, is_correct: bool);

    fn show_round_summary(&self, summary: &RoundSummary);

    fn show_load_error(&self, error: &LoadErrorView);
}
