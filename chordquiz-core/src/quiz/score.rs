/// Running tally across every answered question in this process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Score {
    pub correct: u32,
    pub total: u32,
    pub streak: u32,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one evaluated answer
    pub fn record(&mut self, is_correct: bool) {
        self.total += 1;
        if is_correct {
            self.correct += 1;
            self.streak += 1;
        } else {
            self.streak = 0;
        }
    }

    /// Percentage of correct answers, rounded. 0 before any answer.
    pub fn accuracy(&self) -> u32 {
        accuracy(self.correct, self.total)
    }

    /// Zero everything. Callers confirm with the user first.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// `round(correct / total * 100)`, 0 when `total` is 0
pub fn accuracy(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 / total as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_tracks_streak() {
        let mut score = Score::new();
        score.record(true);
        score.record(true);
        assert_eq!(score.streak, 2);

        score.record(false);
        assert_eq!(
            score,
            Score {
                correct: 2,
                total: 3,
                streak: 0
            }
        );
    }

    #[test]
    fn test_accuracy_rounds() {
        assert_eq!(accuracy(0, 0), 0);
        assert_eq!(accuracy(1, 3), 33);
        assert_eq!(accuracy(2, 3), 67);
        assert_eq!(accuracy(17, 20), 85);
        assert_eq!(accuracy(20, 20), 100);
    }

    #[test]
    fn test_reset() {
        let mut score = Score::new();
        score.record(true);
        score.reset();
        assert_eq!(score, Score::default());
        assert_eq!(score.accuracy(), 0);
    }
}
