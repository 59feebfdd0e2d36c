use std::ops::RangeInclusive;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct VectorizerParams {
    ngram_range: Vec<usize>,
    /// Minimum document frequency for filtering vocabulary.
    /// - If `min_df` is in (0.0, 1.0), it's a proportion of documents
    /// - If `min_df` >= 1.0, it's an absolute document count
    min_df: f64,
    /// Maximum document frequency for filtering vocabulary.
    /// - If `max_df` is in (0.0, 1.0], it's a proportion of documents
    /// - If `max_df` > 1.0, it's an absolute document count
    max_df: f64,
}

impl VectorizerParams {
    /// Fails on an empty n-gram range or non-positive document frequencies.
    pub fn new(
        ngram_range: impl Into<RangeInclusive<usize>>,
        min_df: f64,
        max_df: f64,
    ) -> Result<Self, String> {
        let n_sizes = ngram_range
            .into()
            .filter(|&n| n > 0)
            .collect::<Vec<_>>();
        if n_sizes.is_empty() {
            return Err("ngram_range must contain at least one positive value".to_string());
        }
        if !(min_df > 0.0) {
            return Err(
                "min_df must be positive (proportion in (0.0, 1.0) or absolute count >= 1.0)"
                    .to_string(),
            );
        }
        if !(max_df > 0.0) {
            return Err(
                "max_df must be positive (proportion in (0.0, 1.0] or absolute count > 1.0)"
                    .to_string(),
            );
        }
        Ok(Self {
            ngram_range: n_sizes,
            min_df,
            max_df,
        })
    }

    #[must_use]
    pub fn ngram_sizes(&self) -> &[usize] {
        &self.ngram_range
    }

    #[must_use]
    pub fn ngram_range(&self) -> (usize, usize) {
        (
            self.ngram_range.first().copied().unwrap_or(1),
            self.ngram_range.last().copied().unwrap_or(1),
        )
    }

    #[must_use]
    pub fn min_df(&self) -> f64 {
        self.min_df
    }

    #[must_use]
    pub fn max_df(&self) -> f64 {
        self.max_df
    }

    /// Smallest document count an n-gram needs to enter the vocabulary.
    #[must_use]
    pub fn min_document_count(&self, n_docs: usize) -> usize {
        if self.min_df < 1.0 {
            (self.min_df * n_docs as f64).ceil() as usize
        } else {
            self.min_df as usize
        }
    }

    /// Largest document count an n-gram may have and still enter the vocabulary.
    #[must_use]
    pub fn max_document_count(&self, n_docs: usize) -> usize {
        if self.max_df <= 1.0 {
            (self.max_df * n_docs as f64).floor() as usize
        } else {
            self.max_df as usize
        }
    }
}

impl Default for VectorizerParams {
    /// Unigrams, every word kept.
    fn default() -> Self {
        Self {
            ngram_range: vec![1],
            min_df: 1.0,
            max_df: 1.0,
        }
    }
}

impl TryFrom<((usize, usize), f64, f64)> for VectorizerParams {
    type Error = String;

    fn try_from(((min_n, max_n), min_df, max_df): ((usize, usize), f64, f64)) -> Result<Self, String> {
        Self::new(min_n..=max_n, min_df, max_df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proportional_document_counts() {
        let params = VectorizerParams::new(1..=2, 0.1, 0.5).unwrap();
        assert_eq!(params.min_document_count(25), 3);
        assert_eq!(params.max_document_count(25), 12);
        assert_eq!(params.ngram_range(), (1, 2));
    }

    #[test]
    fn test_absolute_document_counts() {
        let params = VectorizerParams::new(1..=1, 2.0, 40.0).unwrap();
        assert_eq!(params.min_document_count(1000), 2);
        assert_eq!(params.max_document_count(1000), 40);
    }

    #[test]
    fn test_default_keeps_everything() {
        let params = VectorizerParams::default();
        assert_eq!(params.min_document_count(7), 1);
        assert_eq!(params.max_document_count(7), 7);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(VectorizerParams::new(1..=1, 0.0, 1.0).is_err());
        assert!(VectorizerParams::new(1..=1, 1.0, -1.0).is_err());
        assert!(VectorizerParams::new(0..=0, 1.0, 1.0).is_err());
        assert!(VectorizerParams::new(1..=1, f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_try_from_tuple() {
        let params = VectorizerParams::try_from(((1, 3), 2.0, 0.9)).unwrap();
        assert_eq!(params.ngram_sizes(), &[1, 2, 3]);
        assert_eq!(params.min_df(), 2.0);
        assert!(VectorizerParams::try_from(((2, 1), 1.0, 1.0)).is_err());
        assert!(VectorizerParams::try_from(((1, 1), 1.0, 0.0)).is_err());
    }
}
