//! Text classifiers that map a cleaned caption to category probabilities.

mod naive_bayes;

use indicatif::ParallelProgressIterator;
use rayon::prelude::*;
use taxa_pre_processing::pre_processor::{progress_bar, should_use_parallel};
use tracing::{debug, info};

pub use naive_bayes::{MODEL_FORMAT_VERSION, NaiveBayesClassifier, NaiveBayesParams};

use crate::{category::Category, probabilities::CategoryProbabilities, rule::DecisionRule};

/// Anything that assigns a probability to every category for one text.
pub trait TextClassifier {
    /// Probabilities for `text`; they sum to 1.
    fn classify(&self, text: &str) -> CategoryProbabilities;

    fn classify_batch<T: AsRef<str> + Sync>(&self, texts: &[T]) -> Vec<CategoryProbabilities>
    where
        Self: Sized + Sync,
    {
        if should_use_parallel(texts) {
            texts.par_iter().map(|t| self.classify(t.as_ref())).collect()
        } else {
            texts.iter().map(|t| self.classify(t.as_ref())).collect()
        }
    }
}

/// Classifier output for one post of a dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostPrediction {
    /// `None` when the post had no text
    pub probabilities: Option<CategoryProbabilities>,
    pub category: Category,
}

/// Classify every post of a dataset under `rule`, in input order.
///
/// The output always has one entry per input post. Posts without text get no
/// probabilities and [`Category::NO_MATCH`].
pub fn predict_dataset<C, T>(
    classifier: &C,
    texts: &[Option<T>],
    rule: DecisionRule,
) -> Vec<PostPrediction>
where
    C: TextClassifier + Sync,
    T: AsRef<str> + Sync,
{
    let num_posts = texts.len();
    info!(num_posts, %rule, "Classifying posts");

    let predict_one = |text: &Option<T>| {
        let probabilities = text.as_ref().map(|t| classifier.classify(t.as_ref()));
        PostPrediction {
            category: rule.predict(probabilities.as_ref()),
            probabilities,
        }
    };

    let views: Vec<&str> = texts
        .iter()
        .map(|t| t.as_ref().map_or("", AsRef::as_ref))
        .collect();
    let pb = progress_bar(num_posts, "Classifying posts");
    let predictions: Vec<PostPrediction> = if should_use_parallel(&views) {
        debug!(num_posts, "Using parallel classification");
        texts
            .par_iter()
            .progress_with(pb.clone())
            .map(predict_one)
            .collect()
    } else {
        debug!(num_posts, "Using sequential classification");
        texts
            .iter()
            .map(|t| {
                pb.inc(1);
                predict_one(t)
            })
            .collect()
    };
    pb.finish_with_message("Classification complete");

    debug!(
        num_missing = predictions.iter().filter(|p| p.probabilities.is_none()).count(),
        "Posts without text"
    );
    predictions
}
