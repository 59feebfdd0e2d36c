use indicatif::{ParallelProgressIterator, ProgressIterator};
use rayon::prelude::*;
use tracing::debug;

use crate::pre_processor::batch::{progress_bar, should_use_parallel};

/// Split an already cleaned caption into word tokens.
#[inline]
pub fn tokenize_one(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

fn tokenize_texts_par<T: AsRef<str> + Sync>(texts: &[T]) -> Vec<Vec<String>> {
    debug!(num_texts = texts.len(), "Using parallel tokenization");
    let pb = progress_bar(texts.len(), "Tokenizing texts in parallel");
    let result = texts
        .par_iter()
        .progress_with(pb.clone())
        .map(|text| tokenize_one(text.as_ref()))
        .collect();
    pb.finish_with_message("Parallel tokenization complete");
    result
}

fn tokenize_texts<T: AsRef<str>>(texts: &[T]) -> Vec<Vec<String>> {
    debug!(num_texts = texts.len(), "Using sequential tokenization");
    let pb = progress_bar(texts.len(), "Tokenizing texts");
    let result = texts
        .iter()
        .progress_with(pb.clone())
        .map(|text| tokenize_one(text.as_ref()))
        .collect();
    pb.finish_with_message("Tokenization complete");
    result
}

pub fn tokenize<T: AsRef<str> + Sync>(texts: &[T]) -> Vec<Vec<String>> {
    if should_use_parallel(texts) {
        tokenize_texts_par(texts)
    } else {
        tokenize_texts(texts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_one_splits_on_whitespace() {
        assert_eq!(tokenize_one("  stingless   bees "), vec!["stingless", "bees"]);
    }

    #[test]
    fn test_tokenize_keeps_document_order() {
        let tokens = tokenize(&["a b", "", "c"]);
        assert_eq!(tokens.len(), 3);
        assert!(tokens[1].is_empty());
        assert_eq!(tokens[2], vec!["c"]);
    }
}
