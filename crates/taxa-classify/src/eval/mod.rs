//! Multi-class evaluation of category predictions.
//!
//! A [`DecisionRule`] turns each post's probability mapping into one
//! predicted category. For every category of the closed set, predictions are
//! then scored one-vs-rest: confusion counts, then the rates in
//! [`MetricRow`]. The same function serves the arg-max evaluation and every
//! step of the threshold sweep in [`sweep`].
//!
//! # Example
//!
//! ```rust
//! use taxa_classify::{Category, DecisionRule, eval::{self, LabeledPrediction}};
//!
//! let records = vec![
//!     LabeledPrediction::without_text(Category::Others),
//!     LabeledPrediction::without_text(Category::Insects),
//! ];
//! let evaluations = eval::evaluate(&records, DecisionRule::ArgMax)?;
//! assert_eq!(evaluations.len(), Category::COUNT);
//! # Ok::<(), taxa_classify::Error>(())
//! ```

mod confusion;
mod metrics;
pub mod sweep;

pub use confusion::ConfusionCounts;
pub use metrics::MetricRow;
use serde::{Deserialize, Serialize};
pub use sweep::{
    SummaryRow, SweepReport, ThresholdEvaluation, ThresholdMetricRow, Thresholds,
    evaluate_threshold, sweep,
};
use tracing::debug;

use crate::{
    category::Category,
    error::{Error, Result},
    probabilities::CategoryProbabilities,
    rule::DecisionRule,
};

/// A post's true category next to the classifier's probability mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledPrediction {
    true_category: Category,
    probabilities: Option<CategoryProbabilities>,
}

impl LabeledPrediction {
    #[must_use]
    pub fn new(true_category: Category, probabilities: CategoryProbabilities) -> Self {
        Self {
            true_category,
            probabilities: Some(probabilities),
        }
    }

    /// A post that had no text and therefore no probability mapping.
    #[must_use]
    pub fn without_text(true_category: Category) -> Self {
        Self {
            true_category,
            probabilities: None,
        }
    }

    #[must_use]
    pub fn true_category(&self) -> Category {
        self.true_category
    }

    #[must_use]
    pub fn probabilities(&self) -> Option<&CategoryProbabilities> {
        self.probabilities.as_ref()
    }
}

/// Confusion counts and rates of one category under one rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryEvaluation {
    pub category: Category,
    pub counts: ConfusionCounts,
    pub metrics: MetricRow,
}

/// Output row of an evaluation without a threshold (arg-max).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMetricRow {
    pub category: Category,
    #[serde(rename = "TP")]
    pub tp: usize,
    #[serde(rename = "FP")]
    pub fp: usize,
    #[serde(rename = "TN")]
    pub tn: usize,
    #[serde(rename = "FN")]
    pub fn_: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub specificity: f64,
    pub fpr: f64,
}

impl From<&CategoryEvaluation> for CategoryMetricRow {
    fn from(e: &CategoryEvaluation) -> Self {
        Self {
            category: e.category,
            tp: e.counts.true_positive,
            fp: e.counts.false_positive,
            tn: e.counts.true_negative,
            fn_: e.counts.false_negative,
            accuracy: e.metrics.accuracy,
            precision: e.metrics.precision,
            recall: e.metrics.recall,
            specificity: e.metrics.specificity,
            fpr: e.metrics.fpr,
        }
    }
}

/// Predicted category of every record under `rule`, in record order.
#[must_use]
pub fn predicted_labels(records: &[LabeledPrediction], rule: DecisionRule) -> Vec<Category> {
    records
        .iter()
        .map(|r| rule.predict(r.probabilities()))
        .collect()
}

/// Score `rule` against the true labels, one entry per category in canonical order.
///
/// Fails on an empty record set, and with [`Error::Integrity`] if the
/// confusion counts of any category do not cover every record.
pub fn evaluate(
    records: &[LabeledPrediction],
    rule: DecisionRule,
) -> Result<Vec<CategoryEvaluation>> {
    if records.is_empty() {
        return Err(Error::invalid_input("no records to evaluate"));
    }

    let predicted = predicted_labels(records, rule);
    debug!(%rule, num_records = records.len(), "Evaluating predictions");

    Category::ALL
        .into_iter()
        .map(|category| {
            let pairs = records
                .iter()
                .map(LabeledPrediction::true_category)
                .zip(predicted.iter().copied());
            let counts = ConfusionCounts::tally(category, pairs);
            if !counts.is_consistent_with(records.len()) {
                return Err(Error::Integrity {
                    rule: rule.to_string(),
                    category,
                    counted: counts.total(),
                    expected: records.len(),
                });
            }
            Ok(CategoryEvaluation {
                category,
                counts,
                metrics: MetricRow::from(&counts),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryMap;

    fn one_hot(category: Category, p: f64) -> CategoryProbabilities {
        let mut map = CategoryMap::default();
        map[category] = p;
        CategoryProbabilities::new(map).unwrap()
    }

    fn worked_example() -> Vec<LabeledPrediction> {
        use crate::category::Category::{Insects as A, Plants as B};
        // true [A, A, B, B], arg-max predicted [A, B, B, B]
        vec![
            LabeledPrediction::new(A, one_hot(A, 0.8)),
            LabeledPrediction::new(A, one_hot(B, 0.8)),
            LabeledPrediction::new(B, one_hot(B, 0.6)),
            LabeledPrediction::new(B, one_hot(B, 0.9)),
        ]
    }

    #[test]
    fn test_worked_example_arg_max() {
        let evaluations = evaluate(&worked_example(), DecisionRule::ArgMax).unwrap();
        let a = &evaluations[Category::Insects.index()];
        assert_eq!(a.category, Category::Insects);
        assert_eq!(
            (
                a.counts.true_positive,
                a.counts.false_positive,
                a.counts.true_negative,
                a.counts.false_negative
            ),
            (1, 0, 2, 1)
        );
        assert_eq!(a.metrics.precision, 1.0);
        assert_eq!(a.metrics.recall, 0.5);
        assert_eq!(a.metrics.specificity, 1.0);
        assert_eq!(a.metrics.accuracy, 0.75);

        let b = &evaluations[Category::Plants.index()];
        assert_eq!(b.metrics.accuracy, 0.75);
    }

    #[test]
    fn test_every_category_is_reported_in_order() {
        let evaluations = evaluate(&worked_example(), DecisionRule::Threshold(0.5)).unwrap();
        let categories: Vec<_> = evaluations.iter().map(|e| e.category).collect();
        assert_eq!(categories, Category::ALL.to_vec());
        assert!(evaluations.iter().all(|e| e.counts.total() == 4));
    }

    #[test]
    fn test_empty_record_set_is_rejected() {
        assert!(matches!(
            evaluate(&[], DecisionRule::ArgMax),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_posts_without_text_count_as_others() {
        let records = vec![
            LabeledPrediction::without_text(Category::Others),
            LabeledPrediction::without_text(Category::Birds),
        ];
        let evaluations = evaluate(&records, DecisionRule::ArgMax).unwrap();
        let others = &evaluations[Category::Others.index()];
        assert_eq!(others.counts.true_positive, 1);
        assert_eq!(others.counts.false_positive, 1);
        let birds = &evaluations[Category::Birds.index()];
        assert_eq!(birds.counts.false_negative, 1);
    }

    #[test]
    fn test_metric_row_column_names() {
        let evaluations = evaluate(&worked_example(), DecisionRule::ArgMax).unwrap();
        let row = CategoryMetricRow::from(&evaluations[0]);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["category"], "Insects");
        assert_eq!(json["TP"], 1);
        assert_eq!(json["FN"], 1);
    }
}
