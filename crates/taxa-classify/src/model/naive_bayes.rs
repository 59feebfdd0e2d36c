use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use taxa_pre_processing::pre_processor::{CountVectorizer, VectorizerParams};
use tracing::{debug, info};

use super::TextClassifier;
use crate::{
    category::{Category, CategoryMap},
    error::{Error, Result},
    probabilities::CategoryProbabilities,
};

/// Bumped whenever the serialized layout of [`NaiveBayesClassifier`] changes.
pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayesParams {
    /// Additive (Laplace) smoothing, must be positive
    pub alpha: f64,
    pub vectorizer: VectorizerParams,
}

impl Default for NaiveBayesParams {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            vectorizer: VectorizerParams::default(),
        }
    }
}

/// Multinomial naive Bayes over word n-gram counts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NaiveBayesClassifier {
    format_version: u32,
    vectorizer: CountVectorizer,
    log_priors: CategoryMap<f64>,
    /// Indexed by feature, then category
    log_likelihoods: Vec<CategoryMap<f64>>,
}

impl NaiveBayesClassifier {
    /// Fit on `(cleaned text, category)` pairs.
    pub fn train<T: AsRef<str> + Sync>(
        examples: &[(T, Category)],
        params: &NaiveBayesParams,
    ) -> Result<Self> {
        if examples.is_empty() {
            return Err(Error::model("no training examples"));
        }
        if !(params.alpha > 0.0) {
            return Err(Error::model(format!(
                "smoothing alpha must be positive, got {}",
                params.alpha
            )));
        }

        let texts: Vec<&str> = examples.iter().map(|(t, _)| t.as_ref()).collect();
        let (vectorizer, counts) = CountVectorizer::fit_transform(&texts, params.vectorizer.clone());
        let num_features = vectorizer.num_features();
        if num_features == 0 {
            return Err(Error::model(
                "vocabulary is empty after document frequency filtering",
            ));
        }
        info!(
            num_examples = examples.len(),
            num_features, "Training naive Bayes classifier"
        );

        let mut class_docs = CategoryMap::<f64>::default();
        let mut feature_counts = vec![CategoryMap::<f64>::default(); num_features];
        for (row, (_, category)) in counts.outer_iterator().zip(examples) {
            let target = category.one_hot();
            for (class, weight) in target.iter() {
                class_docs[class] += weight;
            }
            for (feature, &count) in row.iter() {
                feature_counts[feature][*category] += count;
            }
        }

        let class_totals = CategoryMap::from_fn(|c| {
            feature_counts.iter().map(|counts| counts[c]).sum::<f64>()
        });

        let alpha = params.alpha;
        let num_docs = examples.len() as f64;
        let num_classes = Category::COUNT as f64;
        let vocab = num_features as f64;

        let log_priors = CategoryMap::from_fn(|c| {
            ((class_docs[c] + alpha) / (num_docs + alpha * num_classes)).ln()
        });
        let log_likelihoods = feature_counts
            .iter()
            .map(|counts| {
                CategoryMap::from_fn(|c| {
                    ((counts[c] + alpha) / (class_totals[c] + alpha * vocab)).ln()
                })
            })
            .collect();

        debug!(?class_docs, "Class document counts");
        Ok(Self {
            format_version: MODEL_FORMAT_VERSION,
            vectorizer,
            log_priors,
            log_likelihoods,
        })
    }

    #[must_use]
    pub fn num_features(&self) -> usize {
        self.vectorizer.num_features()
    }

    #[must_use]
    pub fn vectorizer(&self) -> &CountVectorizer {
        &self.vectorizer
    }

    /// Unnormalised joint log-probability of `text` under each category.
    fn joint_log_likelihood(&self, text: &str) -> CategoryMap<f64> {
        let mut scores = self.log_priors;
        for (feature, count) in self.vectorizer.transform_one(text) {
            let likelihoods = &self.log_likelihoods[feature];
            for category in Category::ALL {
                scores[category] += count * likelihoods[category];
            }
        }
        scores
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| Error::model(format!("failed to encode model: {e}")))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (model, _): (Self, usize) =
            bincode::serde::decode_from_slice(bytes, bincode::config::standard())
                .map_err(|e| Error::model(format!("failed to decode model: {e}")))?;
        if model.format_version != MODEL_FORMAT_VERSION {
            return Err(Error::model(format!(
                "unsupported model format version {} (expected {MODEL_FORMAT_VERSION})",
                model.format_version
            )));
        }
        if model.log_likelihoods.len() != model.vectorizer.num_features() {
            return Err(Error::model("model feature count does not match its vocabulary"));
        }
        Ok(model)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_bytes()?)?;
        debug!(path = %path.display(), "Model saved");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let model = Self::from_bytes(&fs::read(path)?)?;
        debug!(
            path = %path.display(),
            num_features = model.num_features(),
            "Model loaded"
        );
        Ok(model)
    }
}

impl TextClassifier for NaiveBayesClassifier {
    fn classify(&self, text: &str) -> CategoryProbabilities {
        let scores = self.joint_log_likelihood(text);
        let max = scores
            .values()
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let exp = scores.map(|s| (s - max).exp());
        let total: f64 = exp.values().iter().sum();
        CategoryProbabilities::from_normalised(exp.map(|e| (e / total).clamp(0.0, 1.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<(&'static str, Category)> {
        vec![
            ("bee pollinator decline", Category::Insects),
            ("butterfly moth pollinator", Category::Insects),
            ("firefly beetle insect", Category::Insects),
            ("orchid forest tree", Category::Plants),
            ("tree seedling planting", Category::Plants),
            ("eagle nest bird", Category::Birds),
            ("heron wetland bird", Category::Birds),
            ("tiger elephant poaching", Category::Mammals),
            ("rhino elephant ivory", Category::Mammals),
            ("climate event donate", Category::Others),
        ]
    }

    fn trained() -> NaiveBayesClassifier {
        NaiveBayesClassifier::train(&corpus(), &NaiveBayesParams::default()).unwrap()
    }

    #[test]
    fn test_ranks_training_category_highest() {
        let model = trained();
        assert_eq!(model.classify("pollinator bee").arg_max(), Category::Insects);
        assert_eq!(model.classify("elephant").arg_max(), Category::Mammals);
        assert_eq!(model.classify("bird heron").arg_max(), Category::Birds);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let model = trained();
        for text in ["bee", "unknown words only", ""] {
            let total: f64 = model.classify(text).iter().map(|(_, p)| p).sum();
            assert!((total - 1.0).abs() < 1e-9, "{text:?} sums to {total}");
        }
    }

    #[test]
    fn test_unseen_categories_get_probability() {
        let p = trained().classify("bee");
        assert!(p.get(Category::Fish) > 0.0);
        assert!(p.get(Category::Fish) < p.get(Category::Insects));
    }

    #[test]
    fn test_bigram_features() {
        let params = NaiveBayesParams {
            vectorizer: VectorizerParams::new(1..=2, 1.0, 1.0).unwrap(),
            ..Default::default()
        };
        let model = NaiveBayesClassifier::train(&corpus(), &params).unwrap();
        assert!(model.vectorizer().vocabulary().contains_key("bee pollinator"));
    }

    #[test]
    fn test_rejects_bad_training_input() {
        let empty: Vec<(&str, Category)> = vec![];
        assert!(NaiveBayesClassifier::train(&empty, &NaiveBayesParams::default()).is_err());

        let params = NaiveBayesParams {
            alpha: 0.0,
            ..Default::default()
        };
        assert!(NaiveBayesClassifier::train(&corpus(), &params).is_err());

        let blank = vec![("", Category::Others)];
        assert!(NaiveBayesClassifier::train(&blank, &NaiveBayesParams::default()).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let model = trained();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        model.save(&path).unwrap();

        let loaded = NaiveBayesClassifier::load(&path).unwrap();
        assert_eq!(loaded.num_features(), model.num_features());
        assert_eq!(loaded.classify("orchid tree"), model.classify("orchid tree"));
    }

    #[test]
    fn test_rejects_other_format_versions() {
        let mut model = trained();
        model.format_version = MODEL_FORMAT_VERSION + 1;
        let bytes = model.to_bytes().unwrap();
        assert!(matches!(
            NaiveBayesClassifier::from_bytes(&bytes),
            Err(Error::Model(_))
        ));
        assert!(NaiveBayesClassifier::from_bytes(b"not a model").is_err());
    }
}
