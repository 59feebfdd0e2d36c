use std::{path::Path, time::Instant};

use anyhow::{Context, Result, ensure};
use tracing::info;

use super::{
    ApplyArgs, CleanArgs, EvaluateArgs, PredictArgs, SentimentArgs, SweepArgs, TrainArgs,
    output::{format_category_table, open_output},
};
use crate::{
    DecisionRule, NaiveBayesClassifier, NaiveBayesParams, TextCleaner, VectorizerParams,
    dataset::{
        self, APPLIED_CATEGORY_COLUMN, PREDICTED_CATEGORY_COLUMN, PREDICTION_COLUMN,
        SENTIMENT_COLUMNS, Table,
    },
    eval::{self, CategoryMetricRow, MetricRow, Thresholds, sweep::format_summary_table},
    model::{PostPrediction, predict_dataset},
    sentiment::{VaderScorer, score_captions},
};

/// Cell written for posts that had no text.
const ABSENT_CELL: &str = "NA";

fn read_table(path: &Path) -> Result<Table> {
    Table::read(path).with_context(|| format!("Failed to read table: {}", path.display()))
}

fn write_table(table: &Table, path: Option<&Path>) -> Result<()> {
    table
        .write(open_output(path)?)
        .context("Failed to write output table")
}

fn load_model(path: &Path) -> Result<NaiveBayesClassifier> {
    NaiveBayesClassifier::load(path)
        .with_context(|| format!("Failed to load model: {}", path.display()))
}

fn load_records(args: &EvaluateArgs) -> Result<Vec<eval::LabeledPrediction>> {
    let table = read_table(&args.io.input)?;
    dataset::load_labeled_predictions(&table, &args.category_column, &args.prediction_column)
        .with_context(|| format!("Invalid evaluation data in {}", args.io.input.display()))
}

fn prediction_cells(predictions: &[PostPrediction]) -> Result<(Vec<String>, Vec<String>)> {
    let cells = predictions
        .iter()
        .map(|p| -> Result<(String, String)> {
            let dict = match &p.probabilities {
                Some(probs) => probs.to_json()?,
                None => ABSENT_CELL.to_string(),
            };
            Ok((dict, p.category.to_string()))
        })
        .collect::<Result<Vec<_>>>()
        .context("Failed to serialise prediction probabilities")?;
    Ok(cells.into_iter().unzip())
}

pub fn clean(args: &CleanArgs) -> Result<()> {
    let mut table = read_table(&args.io.input)?;
    let captions = table.text_column(&args.text_column)?;

    let cleaner = TextCleaner::new().add_stopwords(args.stopwords.iter().map(String::as_str));
    let cleaned = cleaner.clean_batch(&captions);
    info!(num_posts = cleaned.len(), "Captions cleaned");

    table.set_column(&args.cleaned_column, cleaned)?;
    write_table(&table, args.io.output.as_deref())
}

pub fn train(args: &TrainArgs) -> Result<()> {
    let table = read_table(&args.input)?;
    let examples = dataset::load_training_examples(&table, &args.text_column, &args.category_column)
        .with_context(|| format!("Invalid training data in {}", args.input.display()))?;

    let vectorizer = VectorizerParams::new(1..=args.max_ngram, args.min_df, args.max_df)
        .map_err(anyhow::Error::msg)
        .context("Invalid vectorizer parameters")?;
    let params = NaiveBayesParams {
        alpha: args.alpha,
        vectorizer,
    };

    let start = Instant::now();
    let model = NaiveBayesClassifier::train(&examples, &params)?;
    info!(
        num_features = model.num_features(),
        elapsed = ?start.elapsed(),
        "Model trained"
    );

    model
        .save(&args.model)
        .with_context(|| format!("Failed to save model: {}", args.model.display()))
}

pub fn predict(args: &PredictArgs) -> Result<()> {
    let model = load_model(&args.model)?;
    let mut table = read_table(&args.io.input)?;
    let texts = table.text_column(&args.text_column)?;

    let predictions = predict_dataset(&model, &texts, DecisionRule::ArgMax);
    let (dicts, labels) = prediction_cells(&predictions)?;
    table.set_column(PREDICTION_COLUMN, dicts)?;
    table.set_column(PREDICTED_CATEGORY_COLUMN, labels)?;
    write_table(&table, args.io.output.as_deref())
}

pub fn evaluate(args: &EvaluateArgs, quiet: bool) -> Result<()> {
    let records = load_records(args)?;
    let evaluations = eval::evaluate(&records, DecisionRule::ArgMax)?;

    let rows: Vec<CategoryMetricRow> = evaluations.iter().map(CategoryMetricRow::from).collect();
    dataset::write_rows(open_output(args.io.output.as_deref())?, &rows)
        .context("Failed to write arg-max metrics")?;

    if !quiet {
        let mean = MetricRow::mean(evaluations.iter().map(|e| &e.metrics));
        eprint!("{}", format_category_table(&evaluations, &mean));
    }
    Ok(())
}

pub fn sweep(args: &SweepArgs, quiet: bool) -> Result<()> {
    let thresholds = Thresholds::from_percent_range(args.start, args.end, args.step)?;
    let records = load_records(&args.evaluate)?;

    let start = Instant::now();
    let report = eval::sweep(&records, &thresholds)?;
    info!(
        num_thresholds = thresholds.len(),
        elapsed = ?start.elapsed(),
        "Sweep complete"
    );

    dataset::write_rows(
        open_output(args.evaluate.io.output.as_deref())?,
        &report.metric_rows(),
    )
    .context("Failed to write threshold metrics")?;

    if let Some(path) = &args.summary_output {
        dataset::write_rows(open_output(Some(path))?, &report.summary_rows())
            .context("Failed to write threshold summary")?;
    }

    if !quiet {
        let arg_max = eval::evaluate(&records, DecisionRule::ArgMax)?;
        let baseline = MetricRow::mean(arg_max.iter().map(|e| &e.metrics));
        eprint!("{}", format_summary_table(&report, Some(&baseline)));
    }
    Ok(())
}

pub fn apply(args: &ApplyArgs) -> Result<()> {
    let rule = match args.threshold {
        Some(t) => {
            ensure!((0.0..=1.0).contains(&t), "threshold {t} is outside [0, 1]");
            DecisionRule::Threshold(t)
        }
        None => DecisionRule::ArgMax,
    };

    let model = load_model(&args.model)?;
    let mut table = read_table(&args.io.input)?;
    let texts = table.text_column(&args.text_column)?;

    let predictions = predict_dataset(&model, &texts, rule);
    let (dicts, labels) = prediction_cells(&predictions)?;
    if args.with_probabilities {
        table.set_column(PREDICTION_COLUMN, dicts)?;
    }
    table.set_column(APPLIED_CATEGORY_COLUMN, labels)?;
    write_table(&table, args.io.output.as_deref())
}

pub fn sentiment(args: &SentimentArgs) -> Result<()> {
    let mut table = read_table(&args.io.input)?;
    let captions = table.text_column(&args.caption_column)?;

    let scores = score_captions(&VaderScorer, &captions);

    let mut columns: [Vec<String>; 5] = Default::default();
    for score in &scores {
        let cells = match score {
            Some(s) => [
                s.sentiment().to_string(),
                s.compound.to_string(),
                s.pos.to_string(),
                s.neu.to_string(),
                s.neg.to_string(),
            ],
            None => Default::default(),
        };
        for (column, cell) in columns.iter_mut().zip(cells) {
            column.push(cell);
        }
    }
    for (name, values) in SENTIMENT_COLUMNS.into_iter().zip(columns) {
        table.set_column(name, values)?;
    }
    write_table(&table, args.io.output.as_deref())
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use tempfile::TempDir;

    use super::*;
    use crate::{Category, CategoryProbabilities, cli::IoArgs};

    const POSTS: &str = "\
id,cleaned_text
1,bee butterfly pollinator
2,NA
3,eagle heron bird
";

    fn write_csv(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn io(input: PathBuf, output: PathBuf) -> IoArgs {
        IoArgs {
            input,
            output: Some(output),
        }
    }

    fn trained_model(dir: &TempDir) -> PathBuf {
        let examples = vec![
            ("bee pollinator decline", Category::Insects),
            ("butterfly moth pollinator", Category::Insects),
            ("orchid forest tree", Category::Plants),
            ("eagle nest bird", Category::Birds),
            ("heron wetland bird", Category::Birds),
            ("tiger elephant poaching", Category::Mammals),
            ("climate event donate", Category::Others),
        ];
        let path = dir.path().join("model.bin");
        NaiveBayesClassifier::train(&examples, &NaiveBayesParams::default())
            .unwrap()
            .save(&path)
            .unwrap();
        path
    }

    fn apply_args(dir: &TempDir, threshold: Option<f64>, with_probabilities: bool) -> ApplyArgs {
        ApplyArgs {
            io: io(write_csv(dir, "posts.csv", POSTS), dir.path().join("applied.csv")),
            model: trained_model(dir),
            text_column: "cleaned_text".to_string(),
            threshold,
            with_probabilities,
        }
    }

    #[test]
    fn test_clean_adds_cleaned_column() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_csv(&dir, "raw.csv", "id,text\n1,Wild BEES declining FAST!!\n2,\n");
        let output = dir.path().join("cleaned.csv");
        let args = CleanArgs {
            io: io(input, output.clone()),
            text_column: "text".to_string(),
            cleaned_column: "cleaned_text".to_string(),
            stopwords: vec!["fast".to_string()],
        };
        clean(&args).unwrap();

        let table = Table::read(&output).unwrap();
        let cleaned = table.column("cleaned_text").unwrap();
        assert!(cleaned[0].contains("bees declining"));
        assert!(!cleaned[0].contains("fast"));
        assert_eq!(cleaned[1], "NA");
        assert_eq!(table.column("id").unwrap(), vec!["1", "2"]);
    }

    #[test]
    fn test_predict_writes_absent_cell_for_missing_text() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("evaluation.csv");
        let args = PredictArgs {
            io: io(write_csv(&dir, "posts.csv", POSTS), output.clone()),
            model: trained_model(&dir),
            text_column: "cleaned_text".to_string(),
        };
        predict(&args).unwrap();

        let table = Table::read(&output).unwrap();
        let dicts = table.column(PREDICTION_COLUMN).unwrap();
        assert_eq!(dicts[1], ABSENT_CELL);
        let first = CategoryProbabilities::parse(dicts[0]).unwrap().unwrap();
        assert_eq!(first.arg_max(), Category::Insects);
        assert_eq!(
            table.column(PREDICTED_CATEGORY_COLUMN).unwrap(),
            vec!["Insects", "Others", "Birds"]
        );
    }

    #[test]
    fn test_apply_labels_every_post() {
        let dir = tempfile::tempdir().unwrap();
        let args = apply_args(&dir, None, false);
        apply(&args).unwrap();

        let table = Table::read(dir.path().join("applied.csv")).unwrap();
        assert_eq!(
            table.headers().collect::<Vec<_>>(),
            vec!["id", "cleaned_text", APPLIED_CATEGORY_COLUMN]
        );
        assert_eq!(
            table.column(APPLIED_CATEGORY_COLUMN).unwrap(),
            vec!["Insects", "Others", "Birds"]
        );
    }

    #[test]
    fn test_apply_with_probabilities_and_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let args = apply_args(&dir, Some(1.0), true);
        apply(&args).unwrap();

        let table = Table::read(dir.path().join("applied.csv")).unwrap();
        let dicts = table.column(PREDICTION_COLUMN).unwrap();
        assert_eq!(dicts[1], ABSENT_CELL);
        assert!(CategoryProbabilities::parse(dicts[2]).unwrap().is_some());
        // No probability can exceed 1
        assert!(
            table
                .column(APPLIED_CATEGORY_COLUMN)
                .unwrap()
                .iter()
                .all(|c| *c == "Others")
        );
    }

    #[test]
    fn test_apply_rejects_threshold_outside_unit_interval() {
        let dir = tempfile::tempdir().unwrap();
        let args = apply_args(&dir, Some(1.5), false);
        let err = apply(&args).unwrap_err();
        assert!(err.to_string().contains("outside [0, 1]"));
        assert!(!dir.path().join("applied.csv").exists());
    }

    #[test]
    fn test_sentiment_leaves_missing_captions_empty() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_csv(
            &dir,
            "captions.csv",
            "id,caption\n\
             1,I love these beautiful butterflies. Wonderful news!\n\
             2,\n\
             3,NA\n\
             4,This is a terrible and horrible loss. Awful.\n",
        );
        let output = dir.path().join("sentiment.csv");
        let args = SentimentArgs {
            io: io(input, output.clone()),
            caption_column: "caption".to_string(),
        };
        sentiment(&args).unwrap();

        let table = Table::read(&output).unwrap();
        assert_eq!(table.headers().count(), 2 + SENTIMENT_COLUMNS.len());
        let labels = table.column(SENTIMENT_COLUMNS[0]).unwrap();
        assert_eq!(labels, vec!["pos", "", "", "neg"]);
        for name in &SENTIMENT_COLUMNS[1..] {
            let cells = table.column(name).unwrap();
            assert!(cells[1].is_empty() && cells[2].is_empty());
            assert!(cells[0].parse::<f64>().is_ok());
        }
        let compound: f64 = table.column(SENTIMENT_COLUMNS[1]).unwrap()[3].parse().unwrap();
        assert!(compound <= -0.05);
    }
}
