//! Lexicon sentiment scoring of raw captions, bucketed by compound score.

use core::fmt;
use std::str::FromStr;

use indicatif::ParallelProgressIterator;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use taxa_pre_processing::pre_processor::progress_bar;
use tracing::debug;

use crate::error::{Error, Result};

/// Compound score at or above which a caption is positive.
pub const POSITIVE_CUTOFF: f64 = 0.05;
/// Compound score at or below which a caption is negative.
pub const NEGATIVE_CUTOFF: f64 = -0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    #[serde(rename = "pos")]
    Positive,
    #[serde(rename = "neu")]
    Neutral,
    #[serde(rename = "neg")]
    Negative,
}

impl Sentiment {
    #[must_use]
    pub fn from_compound(compound: f64) -> Self {
        if compound >= POSITIVE_CUTOFF {
            Self::Positive
        } else if compound <= NEGATIVE_CUTOFF {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Positive => "pos",
            Self::Neutral => "neu",
            Self::Negative => "neg",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Sentiment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "pos" => Ok(Self::Positive),
            "neu" => Ok(Self::Neutral),
            "neg" => Ok(Self::Negative),
            other => Err(Error::parse(format!("unknown sentiment {other:?}"))),
        }
    }
}

/// VADER-style scores for one text.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentScores {
    /// Normalised overall score in `[-1, 1]`
    pub compound: f64,
    pub pos: f64,
    pub neu: f64,
    pub neg: f64,
}

impl SentimentScores {
    #[must_use]
    pub fn sentiment(&self) -> Sentiment {
        Sentiment::from_compound(self.compound)
    }
}

pub trait SentimentScorer {
    fn score(&self, text: &str) -> SentimentScores;
}

/// Scorer backed by the VADER lexicon.
#[derive(Debug, Clone, Copy, Default)]
pub struct VaderScorer;

impl SentimentScorer for VaderScorer {
    fn score(&self, text: &str) -> SentimentScores {
        let analyzer = vader_sentiment::SentimentIntensityAnalyzer::new();
        let scores = analyzer.polarity_scores(text);
        let get = |key: &str| scores.get(key).copied().unwrap_or(0.0);
        SentimentScores {
            compound: get("compound"),
            pos: get("pos"),
            neu: get("neu"),
            neg: get("neg"),
        }
    }
}

/// Score a column of raw captions in order; absent captions stay `None`.
pub fn score_captions<S, T>(scorer: &S, captions: &[Option<T>]) -> Vec<Option<SentimentScores>>
where
    S: SentimentScorer + Sync,
    T: AsRef<str> + Sync,
{
    let pb = progress_bar(captions.len(), "Scoring caption sentiment");
    let scores: Vec<Option<SentimentScores>> = captions
        .par_iter()
        .progress_with(pb.clone())
        .map(|caption| caption.as_ref().map(|c| scorer.score(c.as_ref())))
        .collect();
    pb.finish_with_message("Sentiment scoring complete");
    debug!(
        num_captions = captions.len(),
        num_skipped = scores.iter().filter(|s| s.is_none()).count(),
        "Captions scored"
    );
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64);

    impl SentimentScorer for Fixed {
        fn score(&self, _text: &str) -> SentimentScores {
            SentimentScores {
                compound: self.0,
                ..Default::default()
            }
        }
    }

    #[test]
    fn test_cutoffs_are_inclusive() {
        assert_eq!(Sentiment::from_compound(0.05), Sentiment::Positive);
        assert_eq!(Sentiment::from_compound(-0.05), Sentiment::Negative);
        assert_eq!(Sentiment::from_compound(0.0), Sentiment::Neutral);
        assert_eq!(Sentiment::from_compound(0.049), Sentiment::Neutral);
        assert_eq!(Sentiment::from_compound(-0.049), Sentiment::Neutral);
        assert_eq!(Sentiment::from_compound(0.9), Sentiment::Positive);
    }

    #[test]
    fn test_labels_round_trip() {
        for s in [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative] {
            assert_eq!(s.label().parse::<Sentiment>().unwrap(), s);
        }
        assert!("happy".parse::<Sentiment>().is_err());
    }

    #[test]
    fn test_missing_captions_are_skipped() {
        let captions = vec![Some("great"), None, Some("awful")];
        let scores = score_captions(&Fixed(0.5), &captions);
        assert_eq!(scores.len(), 3);
        assert!(scores[1].is_none());
        assert_eq!(scores[0].map(|s| s.sentiment()), Some(Sentiment::Positive));
    }

    #[test]
    fn test_vader_polarity() {
        let scorer = VaderScorer;
        let good = scorer.score("I love these beautiful butterflies, wonderful news!");
        assert_eq!(good.sentiment(), Sentiment::Positive);
        let bad = scorer.score("This is a terrible, horrible loss. Awful.");
        assert_eq!(bad.sentiment(), Sentiment::Negative);
        assert!((good.pos + good.neu + good.neg - 1.0).abs() < 0.01);
    }
}
