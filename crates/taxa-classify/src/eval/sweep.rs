//! Threshold sweep: the evaluation repeated at a range of probability cutoffs.
//!
//! Each threshold is evaluated independently with
//! [`DecisionRule::Threshold`], so thresholds run in parallel and the report
//! keeps ascending threshold order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{CategoryEvaluation, LabeledPrediction, MetricRow, evaluate};
use crate::{
    category::Category,
    error::{Error, Result},
    rule::DecisionRule,
};

/// Default sweep, in percent: 10, 15, ..., 95.
pub const DEFAULT_START_PERCENT: u32 = 10;
pub const DEFAULT_END_PERCENT: u32 = 95;
pub const DEFAULT_STEP_PERCENT: u32 = 5;

/// Ascending, distinct probability cutoffs, each within `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds(Vec<f64>);

impl Thresholds {
    /// Sorts and deduplicates `values`.
    pub fn new(mut values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::invalid_input("at least one threshold is required"));
        }
        if let Some(bad) = values.iter().find(|t| !(0.0..=1.0).contains(*t)) {
            return Err(Error::invalid_input(format!(
                "threshold {bad} is outside [0, 1]"
            )));
        }
        values.sort_by(f64::total_cmp);
        values.dedup();
        Ok(Self(values))
    }

    /// `start..=end` in steps of `step`, all in percent. Values are exact
    /// quotients (`15 / 100`), not accumulated sums.
    pub fn from_percent_range(start: u32, end: u32, step: u32) -> Result<Self> {
        if step == 0 {
            return Err(Error::invalid_input("threshold step must be positive"));
        }
        if start > end || end > 100 {
            return Err(Error::invalid_input(format!(
                "invalid threshold range {start}..={end} (percent, at most 100)"
            )));
        }
        Self::new(
            (start..=end)
                .step_by(step as usize)
                .map(|t| f64::from(t) / 100.0)
                .collect(),
        )
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self(
            (DEFAULT_START_PERCENT..=DEFAULT_END_PERCENT)
                .step_by(DEFAULT_STEP_PERCENT as usize)
                .map(|t| f64::from(t) / 100.0)
                .collect(),
        )
    }
}

/// Output row: one category at one threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdMetricRow {
    pub threshold: f64,
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

/// Output row: metrics at one threshold, averaged over all categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub threshold: f64,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub specificity: f64,
    pub fpr: f64,
}

/// All categories at one threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdEvaluation {
    pub threshold: f64,
    pub categories: Vec<CategoryEvaluation>,
    /// Unweighted mean over `categories`
    pub summary: MetricRow,
}

impl ThresholdEvaluation {
    pub fn rows(&self) -> impl Iterator<Item = ThresholdMetricRow> + '_ {
        self.categories.iter().map(|e| ThresholdMetricRow {
            threshold: self.threshold,
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
        })
    }

    #[must_use]
    pub fn summary_row(&self) -> SummaryRow {
        SummaryRow {
            threshold: self.threshold,
            accuracy: self.summary.accuracy,
            precision: self.summary.precision,
            recall: self.summary.recall,
            specificity: self.summary.specificity,
            fpr: self.summary.fpr,
        }
    }
}

/// Evaluate a single threshold.
pub fn evaluate_threshold(
    records: &[LabeledPrediction],
    threshold: f64,
) -> Result<ThresholdEvaluation> {
    let categories = evaluate(records, DecisionRule::Threshold(threshold))?;
    let summary = MetricRow::mean(categories.iter().map(|e| &e.metrics));
    debug!(
        threshold,
        accuracy = summary.accuracy,
        recall = summary.recall,
        "Threshold evaluated"
    );
    Ok(ThresholdEvaluation {
        threshold,
        categories,
        summary,
    })
}

/// Results of a full sweep, in threshold order.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport {
    pub evaluations: Vec<ThresholdEvaluation>,
}

impl SweepReport {
    /// Per-(threshold, category) rows: threshold order, then category order.
    #[must_use]
    pub fn metric_rows(&self) -> Vec<ThresholdMetricRow> {
        self.evaluations
            .iter()
            .flat_map(ThresholdEvaluation::rows)
            .collect()
    }

    /// One averaged row per threshold.
    #[must_use]
    pub fn summary_rows(&self) -> Vec<SummaryRow> {
        self.evaluations
            .iter()
            .map(ThresholdEvaluation::summary_row)
            .collect()
    }

    /// Averaged `(fpr, recall)` points sorted by fpr, closed with (0, 0) and (1, 1).
    #[must_use]
    pub fn roc_points(&self) -> Vec<(f64, f64)> {
        let mut points: Vec<(f64, f64)> = self
            .evaluations
            .iter()
            .map(|e| (e.summary.fpr, e.summary.recall))
            .collect();
        points.push((0.0, 0.0));
        points.push((1.0, 1.0));
        points.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        points
    }

    /// Trapezoidal area under [`Self::roc_points`].
    #[must_use]
    pub fn roc_auc(&self) -> f64 {
        self.roc_points()
            .windows(2)
            .map(|w| (w[1].0 - w[0].0) * (w[0].1 + w[1].1) / 2.0)
            .sum()
    }

    /// Threshold with the highest averaged accuracy; ties go to the lowest threshold.
    #[must_use]
    pub fn best_by_accuracy(&self) -> Option<&ThresholdEvaluation> {
        self.evaluations.iter().fold(None, |best, e| match best {
            Some(b) if b.summary.accuracy >= e.summary.accuracy => Some(b),
            _ => Some(e),
        })
    }
}

/// Evaluate every threshold.
pub fn sweep(records: &[LabeledPrediction], thresholds: &Thresholds) -> Result<SweepReport> {
    info!(
        num_records = records.len(),
        num_thresholds = thresholds.len(),
        "Running threshold sweep"
    );
    let evaluations = thresholds
        .as_slice()
        .par_iter()
        .map(|&threshold| evaluate_threshold(records, threshold))
        .collect::<Result<Vec<_>>>()?;
    Ok(SweepReport { evaluations })
}

// =============================================================================
// Display Helpers
// =============================================================================

/// Format the averaged sweep as an ASCII table, with an optional arg-max
/// baseline row for comparison.
#[must_use]
pub fn format_summary_table(report: &SweepReport, baseline: Option<&MetricRow>) -> String {
    let mut output = String::new();

    output.push_str("Threshold   Accuracy   Precision   Recall   Specificity     FPR\n");
    output.push_str("-----------------------------------------------------------------\n");

    let line = |label: &str, m: &MetricRow| {
        format!(
            "{label:>9}   {:7.1}%   {:8.1}%   {:5.1}%   {:10.1}%   {:5.1}%\n",
            m.accuracy * 100.0,
            m.precision * 100.0,
            m.recall * 100.0,
            m.specificity * 100.0,
            m.fpr * 100.0,
        )
    };

    for e in &report.evaluations {
        output.push_str(&line(&format!("{:.2}", e.threshold), &e.summary));
    }

    output.push_str("-----------------------------------------------------------------\n");
    if let Some(baseline) = baseline {
        output.push_str(&line("arg-max", baseline));
    }
    if let Some(best) = report.best_by_accuracy() {
        output.push_str(&format!(
            "Best threshold by accuracy: {:.2} ({:.1}%)\n",
            best.threshold,
            best.summary.accuracy * 100.0
        ));
    }
    output.push_str(&format!("ROC AUC (averaged): {:.3}\n", report.roc_auc()));

    output
}
