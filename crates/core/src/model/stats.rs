use crate::model::{GameResult, ROUND_LENGTH};

/// Stable keys of the persisted statistics record.
///
/// The string forms are part of the on-disk layout and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKey {
    GamesCount,
    TotalCorrectAnswers,
    TotalQuestions,
    BestGameCorrectAnswersCount,
    BestGameTotalAnswersCount,
    BestGameDate,
}

impl StatKey {
    pub const ALL: [StatKey; 6] = [
        StatKey::GamesCount,
        StatKey::TotalCorrectAnswers,
        StatKey::TotalQuestions,
        StatKey::BestGameCorrectAnswersCount,
        StatKey::BestGameTotalAnswersCount,
        StatKey::BestGameDate,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StatKey::GamesCount => "gamesCount",
            StatKey::TotalCorrectAnswers => "totalCorrectAnswers",
            StatKey::TotalQuestions => "totalQuestions",
            StatKey::BestGameCorrectAnswersCount => "bestGameCorrectAnswersCount",
            StatKey::BestGameTotalAnswersCount => "bestGameTotalAnswersCount",
            StatKey::BestGameDate => "bestGameDate",
        }
    }
}

impl std::fmt::Display for StatKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the statistics record holds, read in one go.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticsSnapshot {
    pub games_count: u32,
    pub total_correct_ever: u64,
    pub total_questions_ever: u64,
    pub best_game: GameResult,
}

impl StatisticsSnapshot {
    /// The record after one more finished game.
    ///
    /// The best game is replaced only when `game` has strictly more correct answers.
    #[must_use]
    pub fn with_game(&self, game: GameResult) -> Self {
        Self {
            games_count: self.games_count.saturating_add(1),
            total_correct_ever: self
                .total_correct_ever
                .saturating_add(u64::from(game.correct())),
            total_questions_ever: self
                .total_questions_ever
                .saturating_add(u64::from(game.total())),
            best_game: if game.beats(&self.best_game) {
                game
            } else {
                self.best_game
            },
        }
    }

    /// Accuracy as shown in the round summary, in percent.
    ///
    /// Derived from the best game only: `best.correct / (ROUND_LENGTH * games) * 100`.
    /// This is not an average over all games; see [`Self::cumulative_accuracy`] for that.
    /// Returns `0.0` when no games were played or the value is not positive.
    #[must_use]
    pub fn total_accuracy(&self) -> f64 {
        if self.games_count == 0 {
            return 0.0;
        }
        let accuracy = f64::from(self.best_game.correct())
            / (f64::from(ROUND_LENGTH) * f64::from(self.games_count))
            * 100.0;
        if accuracy > 0.0 { accuracy } else { 0.0 }
    }

    /// Share of all questions ever answered correctly, in percent.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cumulative_accuracy(&self) -> f64 {
        if self.total_questions_ever == 0 {
            return 0.0;
        }
        self.total_correct_ever as f64 / self.total_questions_ever as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn snapshot(games: u32, correct_ever: u64, questions_ever: u64, best: u32) -> StatisticsSnapshot {
        StatisticsSnapshot {
            games_count: games,
            total_correct_ever: correct_ever,
            total_questions_ever: questions_ever,
            best_game: GameResult::new(best, ROUND_LENGTH, fixed_now()).unwrap(),
        }
    }

    #[test]
    fn keys_are_stable() {
        let names: Vec<_> = StatKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            [
                "gamesCount",
                "totalCorrectAnswers",
                "totalQuestions",
                "bestGameCorrectAnswersCount",
                "bestGameTotalAnswersCount",
                "bestGameDate",
            ]
        );
    }

    #[test]
    fn accuracy_is_zero_without_games() {
        let empty = snapshot(0, 0, 0, 0);
        assert_eq!(empty.total_accuracy(), 0.0);
        assert_eq!(empty.cumulative_accuracy(), 0.0);
    }

    #[test]
    fn accuracy_uses_best_game_not_all_games() {
        // Two games: 8/10 then 4/10. The best-game formula gives 8 / 20.
        let stats = snapshot(2, 12, 20, 8);
        assert!((stats.total_accuracy() - 40.0).abs() < f64::EPSILON);
        assert!((stats.cumulative_accuracy() - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn with_game_counts_and_keeps_better_record() {
        let stats = snapshot(2, 15, 20, 8);

        let worse = stats.with_game(GameResult::new(5, 10, fixed_now()).unwrap());
        assert_eq!(worse.games_count, 3);
        assert_eq!(worse.total_correct_ever, 20);
        assert_eq!(worse.total_questions_ever, 30);
        assert_eq!(worse.best_game.correct(), 8);

        let tie = stats.with_game(GameResult::new(8, 10, fixed_now()).unwrap());
        assert_eq!(tie.best_game, stats.best_game);

        let better = stats.with_game(GameResult::new(9, 10, fixed_now()).unwrap());
        assert_eq!(better.best_game.correct(), 9);
    }

    #[test]
    fn zero_best_game_clamps_to_zero() {
        let stats = snapshot(3, 0, 30, 0);
        assert_eq!(stats.total_accuracy(), 0.0);
    }
}
