//! Label distribution
//!
//! Per-label observation counts of a node's training population.
use crate::data::Sample;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// Mapping from label to the number of observations carrying it.
///
/// Built once from a set of observations and never changed afterwards.
/// Labels are kept in lexicographic order, so iteration, majority
/// extraction and serialization are all deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelDistribution {
    counts: BTreeMap<String, usize>,
}

impl LabelDistribution {
    /// Tally a sequence of labels.
    pub fn from_labels<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts = BTreeMap::new();
        for label in labels {
            *counts.entry(label.to_string()).or_insert(0) += 1;
        }
        LabelDistribution { counts }
    }

    /// Tally the labels of a set of samples.
    pub fn from_samples(samples: &[Sample]) -> Self {
        Self::from_labels(samples.iter().map(|s| s.label))
    }

    /// Build from explicit `(label, count)` pairs. Repeated labels are summed.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        let mut counts = BTreeMap::new();
        for (label, count) in pairs {
            *counts.entry(label.into()).or_insert(0) += count;
        }
        LabelDistribution { counts }
    }

    /// Total number of observations summarized.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Number of distinct labels.
    pub fn n_labels(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// True when exactly one label is present.
    pub fn is_pure(&self) -> bool {
        self.counts.len() == 1
    }

    /// Count of a label, zero if it was never observed.
    pub fn get(&self, label: &str) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    /// Iterate over `(label, count)` in lexicographic label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(l, c)| (l.as_str(), *c))
    }

    /// Iterate over the counts alone.
    pub fn counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.counts.values().copied()
    }

    /// Label with the highest count, ties go to the lexicographically smallest label.
    pub fn majority(&self) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for (label, count) in self.iter() {
            best = match best {
                Some((_, best_count)) if count <= best_count => best,
                _ => Some((label, count)),
            };
        }
        best.map(|(label, _)| label)
    }
}

impl Display for LabelDistribution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (label, count)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", label, count)?;
        }
        write!(f, "}}")
    }
}
