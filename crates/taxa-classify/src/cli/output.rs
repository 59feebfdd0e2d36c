//! Output destinations and terminal summaries.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};

use crate::eval::{CategoryEvaluation, MetricRow};

/// Buffered writer to `path`, or to stdout when no path is given.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
            format!("Failed to create output file: {}", path.display())
        })?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

/// Per-category arg-max table for the terminal.
pub fn format_category_table(evaluations: &[CategoryEvaluation], mean: &MetricRow) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<26} {:>5} {:>5} {:>5} {:>5}   {:>8} {:>9} {:>7}\n",
        "Category", "TP", "FP", "TN", "FN", "Accuracy", "Precision", "Recall"
    ));
    output.push_str(&"-".repeat(82));
    output.push('\n');

    for e in evaluations {
        output.push_str(&format!(
            "{:<26} {:>5} {:>5} {:>5} {:>5}   {:>7.1}% {:>8.1}% {:>6.1}%\n",
            e.category.label(),
            e.counts.true_positive,
            e.counts.false_positive,
            e.counts.true_negative,
            e.counts.false_negative,
            e.metrics.accuracy * 100.0,
            e.metrics.precision * 100.0,
            e.metrics.recall * 100.0,
        ));
    }

    output.push_str(&"-".repeat(82));
    output.push('\n');
    output.push_str(&format!(
        "{:<26} {:>26}   {:>7.1}% {:>8.1}% {:>6.1}%\n",
        "Mean", "", mean.accuracy * 100.0, mean.precision * 100.0, mean.recall * 100.0,
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Category, DecisionRule,
        eval::{self, LabeledPrediction},
    };

    #[test]
    fn test_category_table_lists_every_category() {
        let records = vec![
            LabeledPrediction::without_text(Category::Others),
            LabeledPrediction::without_text(Category::Fish),
        ];
        let evaluations = eval::evaluate(&records, DecisionRule::ArgMax).unwrap();
        let mean = MetricRow::mean(evaluations.iter().map(|e| &e.metrics));
        let table = format_category_table(&evaluations, &mean);
        for category in Category::ALL {
            assert!(table.contains(category.label()));
        }
        assert!(table.contains("Mean"));
    }

    #[test]
    fn test_open_output_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        {
            let mut out = open_output(Some(&path)).unwrap();
            out.write_all(b"a,b\n").unwrap();
            out.flush().unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b\n");
    }
}
