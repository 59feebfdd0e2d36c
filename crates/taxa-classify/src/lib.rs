//! # taxa-classify
//!
//! Taxonomic classification of conservation posts and evaluation of the
//! classifier, both under arg-max and across a sweep of probability
//! thresholds. Also buckets raw captions into positive, neutral or negative
//! sentiment.
//!
//! ## Quick Start
//!
//! ```rust
//! use taxa_classify::{
//!     Category, DecisionRule, NaiveBayesClassifier, NaiveBayesParams, TextClassifier,
//! };
//!
//! let examples = vec![
//!     ("bee pollinator decline", Category::Insects),
//!     ("orchid forest tree", Category::Plants),
//!     ("heron wetland bird", Category::Birds),
//! ];
//! let model = NaiveBayesClassifier::train(&examples, &NaiveBayesParams::default())?;
//!
//! let probabilities = model.classify("pollinator bee");
//! assert_eq!(DecisionRule::ArgMax.predict(Some(&probabilities)), Category::Insects);
//! # Ok::<(), taxa_classify::Error>(())
//! ```
//!
//! ## Threshold Sweep
//!
//! ```rust
//! use taxa_classify::{Category, CategoryProbabilities, eval::{self, LabeledPrediction, Thresholds}};
//!
//! let records = vec![
//!     LabeledPrediction::new(
//!         Category::Insects,
//!         CategoryProbabilities::new(Category::Insects.one_hot())?,
//!     ),
//!     LabeledPrediction::without_text(Category::Others),
//! ];
//! let report = eval::sweep(&records, &Thresholds::default())?;
//! assert_eq!(report.summary_rows().len(), 18);
//! # Ok::<(), taxa_classify::Error>(())
//! ```

#[cfg(feature = "cli")]
pub mod cli;

mod category;
pub mod dataset;
mod error;
pub mod eval;
mod model;
mod probabilities;
mod rule;
pub mod sentiment;

pub use category::{Category, CategoryMap};
pub use error::{Error, Result};
pub use model::{
    MODEL_FORMAT_VERSION, NaiveBayesClassifier, NaiveBayesParams, PostPrediction, TextClassifier,
    predict_dataset,
};
pub use probabilities::CategoryProbabilities;
pub use rule::DecisionRule;
pub use sentiment::{Sentiment, SentimentScorer, SentimentScores, VaderScorer};
pub use taxa_pre_processing::pre_processor::{TextCleaner, VectorizerParams};
