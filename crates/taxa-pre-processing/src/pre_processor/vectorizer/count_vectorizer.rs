use ahash::{AHashMap, HashMap};
use sprs::CsMat;
use tracing::debug;

use super::{ngrams, params::VectorizerParams, tokenizer};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug)]
pub struct CountVectorizer {
    params: VectorizerParams,
    /// Vocabulary mapping n-gram (words joined by a space) to feature index
    vocab: HashMap<String, usize>,
}

impl CountVectorizer {
    pub fn fit<T: AsRef<str> + Sync>(texts: &[T], params: VectorizerParams) -> Self {
        debug!(num_texts = texts.len(), "Fitting CountVectorizer");
        let tokenized_texts = tokenizer::tokenize(texts);
        Self::fit_from_tokenized(&tokenized_texts, params, None)
    }

    /// Fit from pre-tokenized documents, reusing pre-computed n-gram counts when given.
    fn fit_from_tokenized(
        tokenized_texts: &[Vec<String>],
        params: VectorizerParams,
        precomputed_ngrams: Option<&[AHashMap<String, usize>]>,
    ) -> Self {
        debug!("Building vocabulary from tokenized texts");

        let vocab_df = precomputed_ngrams.map_or_else(
            || ngrams::build_vocabulary(tokenized_texts, params.ngram_sizes()),
            |ngram_maps| {
                debug!("Using pre-computed n-grams for vocabulary building");
                let vocab_df = dashmap::DashMap::with_hasher(ahash::RandomState::default());
                for ngram_map in ngram_maps {
                    for ngram in ngram_map.keys() {
                        vocab_df
                            .entry(ngram.clone())
                            .and_modify(|df| *df += 1)
                            .or_insert(1usize);
                    }
                }
                vocab_df
            },
        );

        let vocab_size = vocab_df.len();
        let n_docs = tokenized_texts.len();
        let min_count = params.min_document_count(n_docs);
        let max_count = params.max_document_count(n_docs);

        debug!(min_count, max_count, "Applying document frequency filtering");
        let mut sorted_tokens = vocab_df
            .into_iter()
            .filter(|(_, df)| *df >= min_count && *df <= max_count)
            .map(|(token, _)| token)
            .collect::<Vec<_>>();
        debug!(
            original_size = vocab_size,
            filtered_size = sorted_tokens.len(),
            "Vocabulary filtered by document frequency"
        );

        sorted_tokens.sort();
        let vocab = sorted_tokens
            .into_iter()
            .enumerate()
            .map(|(idx, token)| (token, idx))
            .collect::<HashMap<String, usize>>();

        debug!(vocab_size = vocab.len(), "CountVectorizer fitting complete");

        Self { params, vocab }
    }

    pub fn transform<T: AsRef<str> + Sync>(&self, texts: &[T]) -> CsMat<f64> {
        debug!(
            num_texts = texts.len(),
            "Transforming texts using CountVectorizer"
        );
        let tokenized_texts = tokenizer::tokenize(texts);
        let ngram_maps: Vec<_> = tokenized_texts
            .iter()
            .map(|tokens| ngrams::count_ngrams(tokens, self.params.ngram_sizes()))
            .collect();
        self.transform_from_ngrams(&ngram_maps)
    }

    /// Sparse count row of a single document as `(feature index, count)`
    /// pairs sorted by feature index. Out-of-vocabulary n-grams are dropped.
    ///
    /// No progress reporting, so it is safe to call per item inside a batch.
    #[must_use]
    pub fn transform_one(&self, text: &str) -> Vec<(usize, f64)> {
        let tokens = tokenizer::tokenize_one(text);
        self.row_entries(&ngrams::count_ngrams(&tokens, self.params.ngram_sizes()))
    }

    fn row_entries(&self, ngrams: &AHashMap<String, usize>) -> Vec<(usize, f64)> {
        let mut row_entries = ngrams
            .iter()
            .filter_map(|(ngram, &count)| {
                self.vocab
                    .get(ngram)
                    .map(|&col_idx| (col_idx, count as f64))
            })
            .collect::<Vec<_>>();
        row_entries.sort_by_key(|(col_idx, _)| *col_idx);
        row_entries
    }

    /// Build the CSR matrix directly from per-document n-gram counts.
    fn transform_from_ngrams(&self, ngram_maps: &[AHashMap<String, usize>]) -> CsMat<f64> {
        let mut indptr = Vec::with_capacity(ngram_maps.len() + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();

        indptr.push(0);
        for ngrams in ngram_maps {
            for (col_idx, count) in self.row_entries(ngrams) {
                indices.push(col_idx);
                data.push(count);
            }
            indptr.push(indices.len());
        }

        debug!(
            non_zero_entries = data.len(),
            "Text transformation complete"
        );
        CsMat::new(
            (ngram_maps.len(), self.num_features()),
            indptr,
            indices,
            data,
        )
    }

    /// `fit_transform` that tokenizes and counts n-grams only once.
    pub fn fit_transform<T: AsRef<str> + Sync>(
        texts: &[T],
        params: VectorizerParams,
    ) -> (Self, CsMat<f64>) {
        debug!(
            num_texts = texts.len(),
            "fit_transform: tokenizing and computing n-grams once"
        );

        let tokenized_texts = tokenizer::tokenize(texts);

        let ngram_maps: Vec<_> = tokenized_texts
            .iter()
            .map(|tokens| ngrams::count_ngrams(tokens, params.ngram_sizes()))
            .collect();

        let vectorizer = Self::fit_from_tokenized(&tokenized_texts, params, Some(&ngram_maps[..]));
        let transformed = vectorizer.transform_from_ngrams(&ngram_maps);

        (vectorizer, transformed)
    }

    pub fn num_features(&self) -> usize {
        self.vocab.len()
    }

    /// Vocabulary as n-gram text to feature index.
    pub fn vocabulary(&self) -> &HashMap<String, usize> {
        &self.vocab
    }

    pub fn params(&self) -> &VectorizerParams {
        &self.params
    }
}
