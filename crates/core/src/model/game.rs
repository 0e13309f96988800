use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameResultError {
    #[error("correct answers ({correct}) exceed total questions ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },
}

/// Outcome of one completed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    correct: u32,
    total: u32,
    completed_at: DateTime<Utc>,
}

impl GameResult {
    /// # Errors
    ///
    /// Returns `GameResultError::CorrectExceedsTotal` if `correct > total`.
    pub fn new(
        correct: u32,
        total: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, GameResultError> {
        if correct > total {
            return Err(GameResultError::CorrectExceedsTotal { correct, total });
        }
        Ok(Self {
            correct,
            total,
            completed_at,
        })
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Whether this result should replace `other` as the record.
    ///
    /// Compares raw correct counts, which only makes sense while every round
    /// has the same length.
    #[must_use]
    pub fn beats(&self, other: &GameResult) -> bool {
        self.correct > other.correct
    }

    /// `"correct/total"`, e.g. `"7/10"`.
    #[must_use]
    pub fn score_label(&self) -> String {
        format!("{}/{}", self.correct, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn rejects_more_correct_than_total() {
        let err = GameResult::new(11, 10, fixed_now()).unwrap_err();
        assert_eq!(
            err,
            GameResultError::CorrectExceedsTotal {
                correct: 11,
                total: 10
            }
        );
    }

    #[test]
    fn beats_only_on_strictly_more_correct() {
        let now = fixed_now();
        let seven = GameResult::new(7, 10, now).unwrap();
        let other_seven = GameResult::new(7, 10, now).unwrap();
        let eight = GameResult::new(8, 10, now).unwrap();

        assert!(eight.beats(&seven));
        assert!(!seven.beats(&eight));
        assert!(!other_seven.beats(&seven));
        assert_eq!(eight.score_label(), "8/10");
    }
}
