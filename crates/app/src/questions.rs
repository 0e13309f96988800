//! Question decks for the terminal quiz.
//!
//! A deck file is a JSON array of records:
//!
//! ```json
//! [
//!   { "text": "Is the rating of this film greater than 6?", "correct_answer": true, "image": "posters/godfather.jpg" }
//! ]
//! ```
//!
//! `image` is optional and resolved relative to the deck file.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use quiz_core::model::QuizQuestion;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct QuestionRecord {
    text: String,
    correct_answer: bool,
    #[serde(default)]
    image: Option<PathBuf>,
}

/// Read a deck file, loading any referenced images.
///
/// # Errors
///
/// Fails if the file or one of its images cannot be read, the JSON is malformed,
/// or the deck is empty.
pub fn load_deck(path: &Path) -> anyhow::Result<Vec<QuizQuestion>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question file {}", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    parse_deck(&raw, base).with_context(|| format!("invalid question file {}", path.display()))
}

fn parse_deck(raw: &str, base: &Path) -> anyhow::Result<Vec<QuizQuestion>> {
    let records: Vec<QuestionRecord> = serde_json::from_str(raw)?;
    if records.is_empty() {
        bail!("deck contains no questions");
    }

    records
        .into_iter()
        .map(|record| {
            let image_data = match &record.image {
                Some(image) => {
                    let image_path = base.join(image);
                    std::fs::read(&image_path).with_context(|| {
                        format!("failed to read image {}", image_path.display())
                    })?
                }
                None => Vec::new(),
            };
            Ok(QuizQuestion::new(image_data, record.text, record.correct_answer))
        })
        .collect()
}

const RATING_QUESTION: &str = "Is the rating of this film greater than 6?";

/// Deck used when no question file is given.
#[must_use]
pub fn builtin_deck() -> Vec<QuizQuestion> {
    [
        ("The Godfather", true),
        ("The Dark Knight", true),
        ("Kill Bill", true),
        ("The Avengers", true),
        ("Deadpool", true),
        ("The Green Knight", true),
        ("Old", false),
        ("The Ice Age Adventures of Buck Wild", false),
        ("Tesla", false),
        ("Vivarium", false),
    ]
    .into_iter()
    .map(|(title, rated_above_six)| {
        QuizQuestion::text_only(format!("{title}: {RATING_QUESTION}"), rated_above_six)
    })
    .collect()
}
