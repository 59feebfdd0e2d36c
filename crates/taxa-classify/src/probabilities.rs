//! Per-category probability records produced by a classifier.

use core::fmt;
use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de, ser::SerializeMap};

use crate::{
    category::{Category, CategoryMap},
    error::{Error, Result},
};

/// Field values that stand for "the post had no text, so no mapping was produced".
const ABSENT_MARKERS: &[&str] = &["", "NA", "nan", "NaN", "['NA']", "[\"NA\"]"];

/// `'label': value` or `"label": value` inside a dict literal.
static DICT_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:'([^']*)'|"([^"]*)")\s*:\s*([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)"#,
    )
    .expect("static pattern is valid")
});

/// Probability that a post belongs to each category, every entry in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryProbabilities(CategoryMap<f64>);

impl CategoryProbabilities {
    /// Validate a complete mapping.
    pub fn new(probabilities: CategoryMap<f64>) -> Result<Self> {
        for (category, &p) in probabilities.iter() {
            if !(0.0..=1.0).contains(&p) {
                return Err(Error::invalid_input(format!(
                    "probability for {category} must be within [0, 1], got {p}"
                )));
            }
        }
        Ok(Self(probabilities))
    }

    /// Build from `(label, probability)` pairs; every category must appear exactly once.
    pub fn from_labelled<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut slots = CategoryMap::<Option<f64>>::default();
        for (label, p) in pairs {
            let category: Category = label.as_ref().parse()?;
            if slots[category].replace(p).is_some() {
                return Err(Error::parse(format!("duplicate probability for {category}")));
            }
        }

        let mut probabilities = CategoryMap::<f64>::default();
        for (category, slot) in slots.iter() {
            probabilities[category] = slot
                .ok_or_else(|| Error::parse(format!("missing probability for {category}")))?;
        }
        Self::new(probabilities)
    }

    /// Parse a serialised mapping: a JSON object or a Python dict literal
    /// (`{'Insects': 0.003, ...}`). Absence markers such as `NA` or `['NA']`
    /// yield `None`.
    pub fn parse(field: &str) -> Result<Option<Self>> {
        let field = field.trim();
        if ABSENT_MARKERS.contains(&field) {
            return Ok(None);
        }
        if !(field.starts_with('{') && field.ends_with('}')) {
            return Err(Error::parse(format!(
                "expected a category probability mapping, got {field:?}"
            )));
        }

        if let Ok(map) = serde_json::from_str::<BTreeMap<String, f64>>(field) {
            return Self::from_labelled(map).map(Some);
        }

        let mut pairs = Vec::with_capacity(Category::COUNT);
        for caps in DICT_ENTRY.captures_iter(field) {
            let label = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            let value = &caps[3];
            let p = value
                .parse::<f64>()
                .map_err(|e| Error::parse(format!("bad probability {value:?}: {e}")))?;
            pairs.push((label.to_string(), p));
        }
        if pairs.is_empty() {
            return Err(Error::parse(format!("no category entries found in {field:?}")));
        }
        Self::from_labelled(pairs).map(Some)
    }

    /// Probabilities produced by a normalised model output; caller guarantees the range.
    pub(crate) fn from_normalised(probabilities: CategoryMap<f64>) -> Self {
        debug_assert!(
            probabilities.values().iter().all(|p| (0.0..=1.0).contains(p)),
            "probabilities must lie in [0, 1]"
        );
        Self(probabilities)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, category: Category) -> f64 {
        self.0[category]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.0.iter().map(|(c, &p)| (c, p))
    }

    /// Category with the highest probability; ties go to the earliest category.
    #[must_use]
    pub fn arg_max(&self) -> Category {
        let mut best = Category::ALL[0];
        for (category, p) in self.iter() {
            if p > self.get(best) {
                best = category;
            }
        }
        best
    }

    /// Categories whose probability strictly exceeds `threshold`.
    pub fn above(&self, threshold: f64) -> impl Iterator<Item = Category> + '_ {
        self.iter()
            .filter(move |&(_, p)| p > threshold)
            .map(|(c, _)| c)
    }

    /// Threshold decision: the single category above `threshold`,
    /// [`Category::NO_MATCH`] when none is, [`Category::AMBIGUOUS`] when several are.
    #[must_use]
    pub fn classification(&self, threshold: f64) -> Category {
        let mut above = self.above(threshold);
        match (above.next(), above.next()) {
            (Some(only), None) => only,
            (None, _) => Category::NO_MATCH,
            (Some(_), Some(_)) => Category::AMBIGUOUS,
        }
    }

    /// JSON object in canonical category order.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl fmt::Display for CategoryProbabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (category, p) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "P({category})={p:.3}")?;
            first = false;
        }
        Ok(())
    }
}

impl Serialize for CategoryProbabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Category::COUNT))?;
        for (category, p) in self.iter() {
            map.serialize_entry(category.label(), &p)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategoryProbabilities {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = BTreeMap::<String, f64>::deserialize(deserializer)?;
        Self::from_labelled(raw).map_err(de::Error::custom)
    }
}
