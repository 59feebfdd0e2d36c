use core::fmt;

use crate::{category::Category, probabilities::CategoryProbabilities};

/// How a probability mapping becomes a single predicted category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecisionRule {
    /// Most probable category, never ambiguous.
    ArgMax,
    /// See [`CategoryProbabilities::classification`].
    Threshold(f64),
}

impl DecisionRule {
    /// Predicted category for one post. Posts without a mapping are
    /// [`Category::NO_MATCH`] under every rule.
    #[inline]
    #[must_use]
    pub fn predict(&self, probabilities: Option<&CategoryProbabilities>) -> Category {
        let Some(probabilities) = probabilities else {
            return Category::NO_MATCH;
        };
        match *self {
            Self::ArgMax => probabilities.arg_max(),
            Self::Threshold(threshold) => probabilities.classification(threshold),
        }
    }
}

impl fmt::Display for DecisionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArgMax => write!(f, "arg-max"),
            Self::Threshold(threshold) => write!(f, "threshold {threshold:.2}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryMap;

    fn probs() -> CategoryProbabilities {
        let mut map = CategoryMap::default();
        map[Category::Insects] = 0.6;
        map[Category::Plants] = 0.3;
        map[Category::Others] = 0.1;
        CategoryProbabilities::new(map).unwrap()
    }

    #[test]
    fn test_missing_mapping_is_others_under_every_rule() {
        assert_eq!(DecisionRule::ArgMax.predict(None), Category::Others);
        assert_eq!(DecisionRule::Threshold(0.1).predict(None), Category::Others);
    }

    #[test]
    fn test_arg_max_ignores_threshold_fallbacks() {
        assert_eq!(DecisionRule::ArgMax.predict(Some(&probs())), Category::Insects);
    }

    #[test]
    fn test_threshold_rule() {
        let p = probs();
        assert_eq!(DecisionRule::Threshold(0.5).predict(Some(&p)), Category::Insects);
        assert_eq!(DecisionRule::Threshold(0.2).predict(Some(&p)), Category::UndefinedGroups);
        assert_eq!(DecisionRule::Threshold(0.6).predict(Some(&p)), Category::Others);
    }

    #[test]
    fn test_display() {
        assert_eq!(DecisionRule::ArgMax.to_string(), "arg-max");
        assert_eq!(DecisionRule::Threshold(0.15).to_string(), "threshold 0.15");
    }
}
