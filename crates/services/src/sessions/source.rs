use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use quiz_core::model::QuizQuestion;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{SeedableRng, rng};

use crate::error::QuestionSourceError;

/// Supplier of quiz questions (network, files, fixtures).
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// One-time setup before the first question, e.g. downloading a catalogue.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError` if the source cannot be made ready.
    async fn prepare(&self) -> Result<(), QuestionSourceError> {
        Ok(())
    }

    /// Produce the next question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError` if no question can be produced.
    async fn next_question(&self) -> Result<QuizQuestion, QuestionSourceError>;
}

/// Identifies one outstanding question request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Fire-and-forget question requests.
///
/// Every call must eventually be answered exactly once, by delivering either a
/// question or a load failure for the same ticket back to the session.
pub trait QuestionRequester: Send + Sync {
    fn request_next(&self, ticket: RequestTicket);
}

/// Draws questions at random from a fixed list.
///
/// Questions are not repeated until the whole list has been drawn.
pub struct DeckQuestionSource {
    questions: Vec<QuizQuestion>,
    draw: Mutex<DeckDraw>,
}

struct DeckDraw {
    rng: StdRng,
    remaining: Vec<usize>,
}

impl DeckQuestionSource {
    #[must_use]
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        Self::with_rng(questions, StdRng::from_rng(&mut rng()))
    }

    /// Deterministic draw order for tests and replays.
    #[must_use]
    pub fn seeded(questions: Vec<QuizQuestion>, seed: u64) -> Self {
        Self::with_rng(questions, StdRng::seed_from_u64(seed))
    }

    fn with_rng(questions: Vec<QuizQuestion>, rng: StdRng) -> Self {
        Self {
            questions,
            draw: Mutex::new(DeckDraw {
                rng,
                remaining: Vec::new(),
            }),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[async_trait]
impl QuestionSource for DeckQuestionSource {
    async fn prepare(&self) -> Result<(), QuestionSourceError> {
        if self.questions.is_empty() {
            return Err(QuestionSourceError::Exhausted);
        }
        Ok(())
    }

    async fn next_question(&self) -> Result<QuizQuestion, QuestionSourceError> {
        if self.questions.is_empty() {
            return Err(QuestionSourceError::Exhausted);
        }

        let mut draw = self.draw.lock().unwrap_or_else(PoisonError::into_inner);
        if draw.remaining.is_empty() {
            let DeckDraw { rng, remaining } = &mut *draw;
            remaining.extend(0..self.questions.len());
            remaining.shuffle(rng);
        }
        let index = draw.remaining.pop().ok_or(QuestionSourceError::Exhausted)?;
        Ok(self.questions[index].clone())
    }
}
