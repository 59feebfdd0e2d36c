//! The closed set of taxonomic categories and per-category records.

use core::fmt;
use std::{
    ops::{Index, IndexMut},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Taxonomic group a conservation post is about.
///
/// Variant order is the canonical category order used for every table and
/// for arg-max tie breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Insects,
    Plants,
    #[serde(rename = "Other Invertebrate Groups")]
    OtherInvertebrateGroups,
    Birds,
    Fish,
    #[serde(rename = "Amphibians & Reptiles")]
    AmphibiansReptiles,
    Mammals,
    #[serde(rename = "Undefined Groups")]
    UndefinedGroups,
    Others,
}

impl Category {
    pub const COUNT: usize = 9;

    pub const ALL: [Category; Self::COUNT] = [
        Self::Insects,
        Self::Plants,
        Self::OtherInvertebrateGroups,
        Self::Birds,
        Self::Fish,
        Self::AmphibiansReptiles,
        Self::Mammals,
        Self::UndefinedGroups,
        Self::Others,
    ];

    /// Label assigned when no category clears a threshold, or the post has no text.
    pub const NO_MATCH: Category = Self::Others;

    /// Label assigned when several categories clear a threshold.
    pub const AMBIGUOUS: Category = Self::UndefinedGroups;

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Insects => "Insects",
            Self::Plants => "Plants",
            Self::OtherInvertebrateGroups => "Other Invertebrate Groups",
            Self::Birds => "Birds",
            Self::Fish => "Fish",
            Self::AmphibiansReptiles => "Amphibians & Reptiles",
            Self::Mammals => "Mammals",
            Self::UndefinedGroups => "Undefined Groups",
            Self::Others => "Others",
        }
    }

    /// Position in [`Category::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// One-hot training target: 1.0 for `self`, 0.0 for every other category.
    #[must_use]
    pub fn one_hot(self) -> CategoryMap<f64> {
        CategoryMap::from_fn(|c| if c == self { 1.0 } else { 0.0 })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label() == label)
            .ok_or_else(|| Error::UnknownCategory(label.to_string()))
    }
}

/// One value per category, stored in canonical category order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryMap<T>([T; Category::COUNT]);

impl<T> CategoryMap<T> {
    pub fn from_fn(mut f: impl FnMut(Category) -> T) -> Self {
        Self(Category::ALL.map(&mut f))
    }

    #[must_use]
    pub fn get(&self, category: Category) -> &T {
        &self.0[category.index()]
    }

    pub fn get_mut(&mut self, category: Category) -> &mut T {
        &mut self.0[category.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &T)> {
        Category::ALL.into_iter().zip(self.0.iter())
    }

    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.0
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> CategoryMap<U> {
        CategoryMap(self.0.map(f))
    }
}

impl<T> Index<Category> for CategoryMap<T> {
    type Output = T;

    fn index(&self, category: Category) -> &T {
        self.get(category)
    }
}

impl<T> IndexMut<Category> for CategoryMap<T> {
    fn index_mut(&mut self, category: Category) -> &mut T {
        self.get_mut(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip() {
        for category in Category::ALL {
            assert_eq!(category.label().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(
            " Amphibians & Reptiles ".parse::<Category>().unwrap(),
            Category::AmphibiansReptiles
        );
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let err = "Fungi".parse::<Category>().unwrap_err();
        assert!(matches!(err, Error::UnknownCategory(label) if label == "Fungi"));
    }

    #[test]
    fn test_index_matches_order() {
        for (i, category) in Category::ALL.into_iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }

    #[test]
    fn test_one_hot_has_single_one() {
        let target = Category::Birds.one_hot();
        assert_eq!(target[Category::Birds], 1.0);
        assert_eq!(target.values().iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&Category::OtherInvertebrateGroups).unwrap();
        assert_eq!(json, "\"Other Invertebrate Groups\"");
        let back: Category = serde_json::from_str("\"Undefined Groups\"").unwrap();
        assert_eq!(back, Category::UndefinedGroups);
    }
}
