use serde::{Deserialize, Serialize};

use super::confusion::ConfusionCounts;

/// `num / den`, or 0 when `den` is 0.
#[inline]
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Rates derived from one set of confusion counts.
///
/// Each rate is in `[0, 1]` and is exactly 0 when its denominator is 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricRow {
    /// (TP + TN) / all
    pub accuracy: f64,
    /// TP / (TP + FP)
    pub precision: f64,
    /// TP / (TP + FN)
    pub recall: f64,
    /// TN / (TN + FP)
    pub specificity: f64,
    /// FP / (FP + TN)
    pub fpr: f64,
}

impl MetricRow {
    /// Unweighted mean of each metric; all zeros for no rows.
    pub fn mean<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a MetricRow>,
    {
        let mut sum = Self::default();
        let mut n = 0usize;
        for row in rows {
            sum.accuracy += row.accuracy;
            sum.precision += row.precision;
            sum.recall += row.recall;
            sum.specificity += row.specificity;
            sum.fpr += row.fpr;
            n += 1;
        }
        if n == 0 {
            return sum;
        }
        let n = n as f64;
        Self {
            accuracy: sum.accuracy / n,
            precision: sum.precision / n,
            recall: sum.recall / n,
            specificity: sum.specificity / n,
            fpr: sum.fpr / n,
        }
    }
}

impl From<&ConfusionCounts> for MetricRow {
    fn from(c: &ConfusionCounts) -> Self {
        let (tp, fp, tn, fn_) = (
            c.true_positive,
            c.false_positive,
            c.true_negative,
            c.false_negative,
        );
        Self {
            accuracy: ratio(tp + tn, tp + tn + fp + fn_),
            precision: ratio(tp, tp + fp),
            recall: ratio(tp, tp + fn_),
            specificity: ratio(tn, tn + fp),
            fpr: ratio(fp, fp + tn),
        }
    }
}
