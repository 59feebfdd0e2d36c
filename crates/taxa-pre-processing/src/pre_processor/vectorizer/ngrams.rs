use ahash::AHashMap as HashMap;
use dashmap::DashMap;
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;

/// Count the word n-grams of one document for every size in `ngram_sizes`.
///
/// N-grams are keyed by their words joined with a single space.
pub fn count_ngrams(tokens: &[String], ngram_sizes: &[usize]) -> HashMap<String, usize> {
    let mut ngram_counter = HashMap::new();

    for &n in ngram_sizes {
        if n == 0 {
            continue;
        }
        for window in tokens.windows(n) {
            *ngram_counter.entry(window.join(" ")).or_insert(0) += 1;
        }
    }
    ngram_counter
}

/// Document frequency of every n-gram across the corpus.
pub fn build_vocabulary(
    tokenized_texts: &[Vec<String>],
    ngram_sizes: &[usize],
) -> DashMap<String, usize, ahash::RandomState> {
    let vocab_df = DashMap::with_hasher(ahash::RandomState::default());

    tokenized_texts.par_iter().progress().for_each(|tokens| {
        for ngram in count_ngrams(tokens, ngram_sizes).into_keys() {
            vocab_df
                .entry(ngram)
                .and_modify(|e| *e += 1)
                .or_insert(1usize);
        }
    });
    vocab_df
}
