use std::sync::LazyLock;

use ahash::HashSet;
use indicatif::{ParallelProgressIterator, ProgressIterator};
use rayon::prelude::*;
use regex::Regex;
use tracing::debug;

use super::{
    batch::{progress_bar, should_use_parallel},
    stopwords::ENGLISH_STOPWORDS,
};

/// Placeholder written for posts that have no caption at all.
pub const MISSING_TEXT: &str = "NA";

/// Campaign vocabulary and account handles that appear in nearly every post
/// of the #conservation corpus and carry no taxonomic signal.
pub const DOMAIN_STOPWORDS: &[&str] = &[
    "save",
    "saving",
    "saved",
    "conservation",
    "conserve",
    "conserving",
    "conserved",
    "intl",
    "conservationorg",
    "thewcs",
    "wwf",
    "natgeowild",
    "thenatureconservancy",
    "org",
    "ipbes",
    "ifaw",
    "ifawglobal",
    "seashepherdglobal",
    "seashepherd",
    "unbiodiversity",
    "verified",
];

static NON_ALPHA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^a-zA-Z]").expect("static pattern is valid"));

/// Caption normaliser: letters only, lower case, stop words removed.
#[derive(Clone, Debug)]
pub struct TextCleaner {
    stopwords: HashSet<String>,
}

impl TextCleaner {
    /// Cleaner with the English and the conservation-domain stop words.
    #[must_use]
    pub fn new() -> Self {
        Self::with_stopwords(ENGLISH_STOPWORDS.iter().chain(DOMAIN_STOPWORDS))
    }

    /// Cleaner with exactly the given stop words.
    pub fn with_stopwords<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stopwords = words
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .collect();
        Self { stopwords }
    }

    /// Extend the stop word set.
    #[must_use]
    pub fn add_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stopwords
            .extend(words.into_iter().map(|w| w.as_ref().to_lowercase()));
        self
    }

    #[must_use]
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Clean a single caption.
    #[must_use]
    pub fn clean(&self, text: &str) -> String {
        let letters = NON_ALPHA.replace_all(text, " ").to_lowercase();
        letters
            .split_whitespace()
            .filter(|word| !self.is_stopword(word))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Clean a caption that may be absent; absent captions become [`MISSING_TEXT`].
    #[must_use]
    pub fn clean_optional(&self, text: Option<&str>) -> String {
        text.map_or_else(|| MISSING_TEXT.to_string(), |t| self.clean(t))
    }

    /// Clean a column of captions, preserving order.
    pub fn clean_batch<T: AsRef<str> + Sync>(&self, texts: &[Option<T>]) -> Vec<String> {
        let views: Vec<&str> = texts
            .iter()
            .map(|t| t.as_ref().map_or("", AsRef::as_ref))
            .collect();

        if should_use_parallel(&views) {
            debug!(num_texts = texts.len(), "Using parallel cleaning");
            let pb = progress_bar(texts.len(), "Cleaning captions in parallel");
            let cleaned = texts
                .par_iter()
                .progress_with(pb.clone())
                .map(|t| self.clean_optional(t.as_ref().map(AsRef::as_ref)))
                .collect();
            pb.finish_with_message("Parallel cleaning complete");
            cleaned
        } else {
            debug!(num_texts = texts.len(), "Using sequential cleaning");
            let pb = progress_bar(texts.len(), "Cleaning captions");
            let cleaned = texts
                .iter()
                .progress_with(pb.clone())
                .map(|t| self.clean_optional(t.as_ref().map(AsRef::as_ref)))
                .collect();
            pb.finish_with_message("Cleaning complete");
            cleaned
        }
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_non_letters_and_case() {
        let cleaner = TextCleaner::with_stopwords(Vec::<&str>::new());
        assert_eq!(
            cleaner.clean("Butterflies!! 2024 #Pollinators @Kew"),
            "butterflies pollinators kew"
        );
    }

    #[test]
    fn test_removes_english_and_domain_stopwords() {
        let cleaner = TextCleaner::new();
        assert_eq!(
            cleaner.clean("We must SAVE the fireflies of Malaysia via @WWF conservation"),
            "fireflies malaysia"
        );
    }

    #[test]
    fn test_digits_split_words() {
        let cleaner = TextCleaner::new();
        assert_eq!(cleaner.clean("bee2bee"), "bee bee");
    }

    #[test]
    fn test_missing_caption_is_placeholder() {
        let cleaner = TextCleaner::new();
        assert_eq!(cleaner.clean_optional(None), MISSING_TEXT);
    }

    #[test]
    fn test_only_stopwords_cleans_to_empty() {
        let cleaner = TextCleaner::new();
        assert_eq!(cleaner.clean("and the of"), "");
    }

    #[test]
    fn test_extra_stopwords() {
        let cleaner = TextCleaner::new().add_stopwords(["Fireflies"]);
        assert!(cleaner.is_stopword("fireflies"));
        assert_eq!(cleaner.clean("fireflies glow"), "glow");
    }

    #[test]
    fn test_batch_preserves_order() {
        let cleaner = TextCleaner::new();
        let texts = vec![Some("Orchids bloom"), None, Some("Hornbill nests")];
        assert_eq!(
            cleaner.clean_batch(&texts),
            vec!["orchids bloom", MISSING_TEXT, "hornbill nests"]
        );
    }
}
