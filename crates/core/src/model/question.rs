use serde::{Deserialize, Serialize};

/// A single true/false question shown to the player.
///
/// Questions are immutable once received from a question source; the session
/// holds on to the current one only until it has been judged.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    #[serde(default)]
    image_data: Vec<u8>,
    text: String,
    correct_answer: bool,
}

impl QuizQuestion {
    #[must_use]
    pub fn new(image_data: impl Into<Vec<u8>>, text: impl Into<String>, correct_answer: bool) -> Self {
        Self {
            image_data: image_data.into(),
            text: text.into(),
            correct_answer,
        }
    }

    /// Build a question without an illustration.
    #[must_use]
    pub fn text_only(text: impl Into<String>, correct_answer: bool) -> Self {
        Self::new(Vec::new(), text, correct_answer)
    }

    #[must_use]
    pub fn image_data(&self) -> &[u8] {
        &self.image_data
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn correct_answer(&self) -> bool {
        self.correct_answer
    }

    /// Returns true when `given` matches the expected answer.
    #[must_use]
    pub fn is_correct(&self, given: bool) -> bool {
        given == self.correct_answer
    }
}

impl std::fmt::Debug for QuizQuestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizQuestion")
            .field("text", &self.text)
            .field("correct_answer", &self.correct_answer)
            .field("image_len", &self.image_data.len())
            .finish()
    }
}
