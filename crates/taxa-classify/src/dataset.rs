//! CSV tables consumed and produced by the pipelines.
//!
//! Input tables are kept as raw string records so that columns this crate does
//! not know about pass through to the output unchanged.

use std::{
    io::{Read, Write},
    path::Path,
};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::Serialize;
use tracing::debug;

use crate::{
    category::Category,
    error::{Error, Result},
    eval::LabeledPrediction,
    probabilities::CategoryProbabilities,
};

/// Cell values read as "no text".
const MISSING_CELLS: &[&str] = &["", "NA", "nan", "NaN"];

pub const TEXT_COLUMN: &str = "text";
pub const CLEANED_TEXT_COLUMN: &str = "cleaned_text";
pub const CATEGORY_COLUMN: &str = "category";
pub const PREDICTION_COLUMN: &str = "pred_dict";
pub const PREDICTED_CATEGORY_COLUMN: &str = "pred_cat";
pub const APPLIED_CATEGORY_COLUMN: &str = "Category";
pub const CAPTION_COLUMN: &str = "caption";
pub const SENTIMENT_COLUMNS: [&str; 5] = [
    "caption_sentiment_new",
    "caption_compound_score",
    "caption_pos_score",
    "caption_neu_score",
    "caption_neg_score",
];

/// An in-memory CSV table with a header row.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl Table {
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let table = Self::from_reader(std::fs::File::open(path)?)?;
        debug!(
            path = %path.display(),
            num_rows = table.len(),
            num_columns = table.headers.len(),
            "Table loaded"
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = csv.headers()?.clone();
        let rows = csv.records().collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { headers, rows })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.headers.iter()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers.iter().position(|h| h == name).ok_or_else(|| {
            Error::invalid_input(format!(
                "missing column {name:?} (found: {})",
                self.headers.iter().collect::<Vec<_>>().join(", ")
            ))
        })
    }

    /// Raw cell values of one column.
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| r.get(idx).unwrap_or("")).collect())
    }

    /// Text column with missing cells (`""`, `NA`, `nan`) as `None`.
    pub fn text_column(&self, name: &str) -> Result<Vec<Option<String>>> {
        Ok(self
            .column(name)?
            .into_iter()
            .map(|cell| (!is_missing(cell)).then(|| cell.to_string()))
            .collect())
    }

    /// Set a column, appending it when absent and overwriting it otherwise.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(Error::invalid_input(format!(
                "column {name:?} has {} values for {} rows",
                values.len(),
                self.rows.len()
            )));
        }

        match self.headers.iter().position(|h| h == name) {
            Some(idx) => {
                self.headers = replace_field(&self.headers, idx, name);
                for (row, value) in self.rows.iter_mut().zip(values) {
                    *row = replace_field(row, idx, &value);
                }
            }
            None => {
                self.headers.push_field(name);
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push_field(&value);
                }
            }
        }
        Ok(())
    }

    pub fn write<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = WriterBuilder::new().flexible(true).from_writer(writer);
        csv.write_record(&self.headers)?;
        for row in &self.rows {
            csv.write_record(row)?;
        }
        csv.flush()?;
        Ok(())
    }
}

fn is_missing(cell: &str) -> bool {
    MISSING_CELLS.contains(&cell.trim())
}

fn replace_field(record: &StringRecord, idx: usize, value: &str) -> StringRecord {
    record
        .iter()
        .enumerate()
        .map(|(i, field)| if i == idx { value } else { field })
        .collect()
}

/// Line number of data row `i` in the file, counting the header as line 1.
fn line_of(i: usize) -> usize {
    i + 2
}

/// `(text, category)` pairs for training; rows without text are skipped.
pub fn load_training_examples(
    table: &Table,
    text_column: &str,
    category_column: &str,
) -> Result<Vec<(String, Category)>> {
    let texts = table.text_column(text_column)?;
    let categories = table.column(category_column)?;

    let mut examples = Vec::with_capacity(texts.len());
    for (i, (text, label)) in texts.into_iter().zip(categories).enumerate() {
        let category = label
            .parse::<Category>()
            .map_err(|e| Error::parse(format!("line {}: {e}", line_of(i))))?;
        if let Some(text) = text {
            examples.push((text, category));
        }
    }
    debug!(
        num_examples = examples.len(),
        num_skipped = table.len() - examples.len(),
        "Training examples loaded"
    );
    Ok(examples)
}

/// Records for evaluation from a category column and a serialised
/// probability-mapping column.
pub fn load_labeled_predictions(
    table: &Table,
    category_column: &str,
    prediction_column: &str,
) -> Result<Vec<LabeledPrediction>> {
    let categories = table.column(category_column)?;
    let predictions = table.column(prediction_column)?;

    categories
        .into_iter()
        .zip(predictions)
        .enumerate()
        .map(|(i, (label, field))| {
            let category = label
                .parse::<Category>()
                .map_err(|e| Error::parse(format!("line {}: {e}", line_of(i))))?;
            let probabilities = CategoryProbabilities::parse(field)
                .map_err(|e| Error::parse(format!("line {}: {e}", line_of(i))))?;
            Ok(match probabilities {
                Some(p) => LabeledPrediction::new(category, p),
                None => LabeledPrediction::without_text(category),
            })
        })
        .collect()
}

/// Write serde rows as CSV with a header derived from the row type.
pub fn write_rows<W: Write, S: Serialize>(writer: W, rows: &[S]) -> Result<()> {
    let mut csv = WriterBuilder::new().has_headers(true).from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}
