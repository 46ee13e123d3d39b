//! Split quality
//!
//! Impurity measures and the gain of a candidate two-way split.
use crate::distribution::LabelDistribution;
use crate::errors::TreeError;
use crate::utils::items_to_strings;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Impurity measure used to score candidate splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SplitCriterion {
    /// Shannon entropy in bits, the score is the information gain.
    #[default]
    Entropy,
    /// Gini impurity, the score is the impurity decrease.
    Gini,
}

impl SplitCriterion {
    /// Impurity of a set given its per-label counts and their total.
    pub fn impurity<I: IntoIterator<Item = usize>>(&self, counts: I, total: usize) -> f64 {
        match self {
            SplitCriterion::Entropy => entropy(counts, total),
            SplitCriterion::Gini => gini_impurity(counts, total),
        }
    }

    /// Score a split of a parent with impurity `parent` into two sides.
    ///
    /// `parent - |L|/|S| * I(L) - |R|/|S| * I(R)`, floating noise below zero is clamped.
    pub fn gain<L, R>(&self, parent: f64, left: L, n_left: usize, right: R, n_right: usize) -> f64
    where
        L: IntoIterator<Item = usize>,
        R: IntoIterator<Item = usize>,
    {
        let n = (n_left + n_right) as f64;
        let weighted = (n_left as f64 / n) * self.impurity(left, n_left) + (n_right as f64 / n) * self.impurity(right, n_right);
        (parent - weighted).max(0.0)
    }

    /// Score a candidate split given the label distributions of both sides.
    /// Higher is better, zero means the split does not improve purity.
    pub fn score(&self, left: &LabelDistribution, right: &LabelDistribution) -> f64 {
        let (n_left, n_right) = (left.total(), right.total());
        if n_left == 0 || n_right == 0 {
            return 0.0;
        }
        let parent = LabelDistribution::from_pairs(left.iter().chain(right.iter()));
        let parent_impurity = self.impurity(parent.counts(), parent.total());
        self.gain(parent_impurity, left.counts(), n_left, right.counts(), n_right)
    }
}

impl Display for SplitCriterion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SplitCriterion::Entropy => write!(f, "entropy"),
            SplitCriterion::Gini => write!(f, "gini"),
        }
    }
}

impl FromStr for SplitCriterion {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "entropy" | "information_gain" => Ok(SplitCriterion::Entropy),
            "gini" => Ok(SplitCriterion::Gini),
            _ => Err(TreeError::InvalidParameter(
                "criterion".to_string(),
                items_to_strings(vec!["entropy", "gini"]),
                s.to_string(),
            )),
        }
    }
}

/// Shannon entropy (base 2) of a set given its label counts, `0 * log2(0) = 0`.
pub fn entropy<I: IntoIterator<Item = usize>>(counts: I, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    counts
        .into_iter()
        .filter(|&c| c > 0)
        .map(|c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Gini impurity `1 - sum(p_i^2)` of a set given its label counts.
pub fn gini_impurity<I: IntoIterator<Item = usize>>(counts: I, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    let purity: f64 = counts
        .into_iter()
        .map(|c| {
            let p = c as f64 / total;
            p * p
        })
        .sum();
    1.0 - purity
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_entropy() {
        // 75% / 25% / 0%
        assert_abs_diff_eq!(entropy([6, 2, 0], 8), 0.811_278_124_459_132_8, epsilon = 1e-12);
        assert_abs_diff_eq!(entropy([8], 8), 0.0);
        assert_abs_diff_eq!(entropy([4, 4], 8), 1.0);
        assert_abs_diff_eq!(entropy(std::iter::empty(), 0), 0.0);
    }

    #[test]
    fn test_gini_impurity() {
        // 1 - 0.75^2 - 0.25^2
        assert_abs_diff_eq!(gini_impurity([6, 2, 0], 8), 0.375, epsilon = 1e-12);
        assert_abs_diff_eq!(gini_impurity([3], 3), 0.0);
    }

    #[test]
    fn test_perfect_split_scores_one_bit() {
        let left = LabelDistribution::from_labels(["A", "A"]);
        let right = LabelDistribution::from_labels(["B", "B"]);
        assert_abs_diff_eq!(SplitCriterion::Entropy.score(&left, &right), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(SplitCriterion::Gini.score(&left, &right), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_useless_split_scores_zero() {
        let left = LabelDistribution::from_labels(["A", "B"]);
        let right = LabelDistribution::from_labels(["A", "B", "A", "B"]);
        assert_abs_diff_eq!(SplitCriterion::Entropy.score(&left, &right), 0.0, epsilon = 1e-12);
        assert!(SplitCriterion::Entropy.score(&left, &right) >= 0.0);
        assert_eq!(SplitCriterion::Gini.score(&left, &LabelDistribution::default()), 0.0);
    }

    #[test]
    fn test_parse_criterion() {
        assert_eq!("Gini".parse::<SplitCriterion>().unwrap(), SplitCriterion::Gini);
        assert_eq!("entropy".parse::<SplitCriterion>().unwrap(), SplitCriterion::Entropy);
        assert!("random".parse::<SplitCriterion>().is_err());
        assert_eq!(SplitCriterion::default().to_string(), "entropy");
    }
}
