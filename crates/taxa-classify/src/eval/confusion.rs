use serde::{Deserialize, Serialize};

use crate::category::Category;

/// One-vs-rest confusion counts for a single category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfusionCounts {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionCounts {
    /// Tally `(true, predicted)` label pairs against `category`.
    pub fn tally<I>(category: Category, pairs: I) -> Self
    where
        I: IntoIterator<Item = (Category, Category)>,
    {
        let mut counts = Self::default();
        for (truth, predicted) in pairs {
            match (predicted == category, truth == category) {
                (true, true) => counts.true_positive += 1,
                (true, false) => counts.false_positive += 1,
                (false, false) => counts.true_negative += 1,
                (false, true) => counts.false_negative += 1,
            }
        }
        counts
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    /// Every record must land in exactly one cell.
    #[must_use]
    pub fn is_consistent_with(&self, num_records: usize) -> bool {
        self.total() == num_records
    }
}
