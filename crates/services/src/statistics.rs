//! Cross-session quiz statistics on top of a key/value store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use quiz_core::model::{GameResult, StatKey, StatisticsSnapshot};
use storage::repository::{KeyValueStore, StoredValue};

use crate::Clock;
use crate::error::StatisticsError;

/// Aggregates finished games into the persisted statistics record.
///
/// Missing keys read as zero. A missing record date reads as "now".
#[derive(Clone)]
pub struct StatisticsStore {
    clock: Clock,
    values: Arc<dyn KeyValueStore>,
}

impl StatisticsStore {
    #[must_use]
    pub fn new(clock: Clock, values: Arc<dyn KeyValueStore>) -> Self {
        Self { clock, values }
    }

    /// Fold one finished game into the record.
    ///
    /// The new counters and, if beaten, the new best game are written in a single
    /// batch, so readers never see a half-updated record.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError::InvalidResult` if `correct > total`,
    /// `StatisticsError::Corrupt` if the stored record cannot be read back,
    /// or `StatisticsError::Storage` if the write fails.
    pub async fn store(&self, correct: u32, total: u32) -> Result<(), StatisticsError> {
        let new_game = GameResult::new(correct, total, self.clock.now())?;
        let current = self.snapshot().await?;
        let updated = current.with_game(new_game);

        let mut entries = vec![
            (
                StatKey::GamesCount.as_str(),
                StoredValue::Int(i64::from(updated.games_count)),
            ),
            (
                StatKey::TotalCorrectAnswers.as_str(),
                StoredValue::Int(to_i64(
                    StatKey::TotalCorrectAnswers,
                    updated.total_correct_ever,
                )?),
            ),
            (
                StatKey::TotalQuestions.as_str(),
                StoredValue::Int(to_i64(StatKey::TotalQuestions, updated.total_questions_ever)?),
            ),
        ];

        let new_record = new_game.beats(&current.best_game);
        if new_record {
            entries.extend([
                (
                    StatKey::BestGameCorrectAnswersCount.as_str(),
                    StoredValue::Int(i64::from(new_game.correct())),
                ),
                (
                    StatKey::BestGameTotalAnswersCount.as_str(),
                    StoredValue::Int(i64::from(new_game.total())),
                ),
                (
                    StatKey::BestGameDate.as_str(),
                    StoredValue::Timestamp(new_game.completed_at()),
                ),
            ]);
        }

        self.values.set_many(&entries).await?;

        tracing::debug!(
            correct,
            total,
            games_count = updated.games_count,
            "stored game result"
        );
        if new_record {
            tracing::info!(
                correct,
                previous = current.best_game.correct(),
                "new best game"
            );
        }
        Ok(())
    }

    /// Number of games stored so far.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError` if the counter cannot be read.
    pub async fn games_count(&self) -> Result<u32, StatisticsError> {
        let count = self.read_count(StatKey::GamesCount).await?;
        u32::try_from(count).map_err(|_| StatisticsError::Corrupt {
            key: StatKey::GamesCount.as_str(),
            reason: format!("{count} is out of range"),
        })
    }

    /// The game with the most correct answers so far.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError` if the record cannot be read.
    pub async fn best_game(&self) -> Result<GameResult, StatisticsError> {
        let correct = self.read_u32(StatKey::BestGameCorrectAnswersCount).await?;
        let total = self.read_u32(StatKey::BestGameTotalAnswersCount).await?;
        let date = self
            .read_timestamp(StatKey::BestGameDate)
            .await?
            .unwrap_or_else(|| self.clock.now());

        GameResult::new(correct, total, date).map_err(|err| StatisticsError::Corrupt {
            key: StatKey::BestGameCorrectAnswersCount.as_str(),
            reason: err.to_string(),
        })
    }

    /// Accuracy shown in the round summary; see [`StatisticsSnapshot::total_accuracy`].
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError` if the record cannot be read.
    pub async fn total_accuracy(&self) -> Result<f64, StatisticsError> {
        Ok(self.snapshot().await?.total_accuracy())
    }

    /// Share of all answers ever given that were correct, in percent.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError` if the record cannot be read.
    pub async fn cumulative_accuracy(&self) -> Result<f64, StatisticsError> {
        Ok(self.snapshot().await?.cumulative_accuracy())
    }

    /// Read the whole record.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError` if any value cannot be read.
    pub async fn snapshot(&self) -> Result<StatisticsSnapshot, StatisticsError> {
        Ok(StatisticsSnapshot {
            games_count: self.games_count().await?,
            total_correct_ever: self.read_count(StatKey::TotalCorrectAnswers).await?,
            total_questions_ever: self.read_count(StatKey::TotalQuestions).await?,
            best_game: self.best_game().await?,
        })
    }

    async fn read_count(&self, key: StatKey) -> Result<u64, StatisticsError> {
        let Some(value) = self.values.get(key.as_str()).await? else {
            return Ok(0);
        };
        let count = value.as_int().ok_or_else(|| StatisticsError::Corrupt {
            key: key.as_str(),
            reason: "expected an integer, found a timestamp".into(),
        })?;
        u64::try_from(count).map_err(|_| StatisticsError::Corrupt {
            key: key.as_str(),
            reason: format!("negative count {count}"),
        })
    }

    async fn read_u32(&self, key: StatKey) -> Result<u32, StatisticsError> {
        let value = self.read_count(key).await?;
        u32::try_from(value).map_err(|_| StatisticsError::Corrupt {
            key: key.as_str(),
            reason: format!("{value} is out of range"),
        })
    }

    async fn read_timestamp(&self, key: StatKey) -> Result<Option<DateTime<Utc>>, StatisticsError> {
        let Some(value) = self.values.get(key.as_str()).await? else {
            return Ok(None);
        };
        value
            .as_timestamp()
            .map(Some)
            .ok_or_else(|| StatisticsError::Corrupt {
                key: key.as_str(),
                reason: "expected a timestamp, found an integer".into(),
            })
    }
}

fn to_i64(key: StatKey, value: u64) -> Result<i64, StatisticsError> {
    i64::try_from(value).map_err(|_| StatisticsError::Overflow { key: key.as_str() })
}
