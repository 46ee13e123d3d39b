//! Splitter
//!
//! Partitioning of observations on a `(feature, threshold)` pair and the
//! exhaustive search for the best such pair.
use crate::constants::GAIN_TOLERANCE;
use crate::data::Sample;
use crate::errors::TreeError;
use crate::impurity::SplitCriterion;
use crate::utils::midpoint;
use hashbrown::HashMap;

/// A scored `(feature, threshold)` pair, only alive during the search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitCandidate {
    pub feature_index: usize,
    pub threshold: f64,
    pub score: f64,
}

impl SplitCandidate {
    pub fn new(feature_index: usize, threshold: f64, score: f64) -> Self {
        SplitCandidate {
            feature_index,
            threshold,
            score,
        }
    }

    /// True if this candidate should replace `other` as the current best.
    ///
    /// Candidates are visited in ascending feature and threshold order, so
    /// requiring a strictly better score keeps the earliest one on ties.
    /// Scores within [`GAIN_TOLERANCE`] of each other count as tied.
    #[inline]
    pub fn beats(&self, other: &SplitCandidate) -> bool {
        self.score > other.score + GAIN_TOLERANCE
    }

    /// True if the split improves purity at all.
    #[inline]
    pub fn is_useful(&self) -> bool {
        self.score > GAIN_TOLERANCE
    }
}

/// Partition samples on a feature: values `<= threshold` go to the first
/// set, the rest to the second. The input is left untouched and the
/// relative order of the samples is kept on both sides.
pub fn split<'a>(
    samples: &[Sample<'a>],
    feature_index: usize,
    threshold: f64,
) -> Result<(Vec<Sample<'a>>, Vec<Sample<'a>>), TreeError> {
    let mut at_or_below = Vec::new();
    let mut above = Vec::new();
    for s in samples {
        if s.value(feature_index)? <= threshold {
            at_or_below.push(*s);
        } else {
            above.push(*s);
        }
    }
    Ok((at_or_below, above))
}

/// Fold candidates, visited in ascending feature order, down to the best one.
///
/// Ties go to the lowest feature index.
pub fn select_best<I>(candidates: I) -> Option<SplitCandidate>
where
    I: IntoIterator<Item = Option<SplitCandidate>>,
{
    candidates.into_iter().flatten().fold(None, |best, c| match best {
        Some(b) if !c.beats(&b) => Some(b),
        _ => Some(c),
    })
}

pub trait Splitter {
    /// The impurity measure candidates are scored with.
    fn criterion(&self) -> SplitCriterion;

    /// Find the best threshold for a single feature, `None` if the
    /// feature has fewer than two distinct values among the samples.
    fn best_threshold(&self, samples: &[Sample], feature_index: usize) -> Result<Option<SplitCandidate>, TreeError>;

    /// Find the best possible split, considering every feature.
    ///
    /// Every feature is searched first and the per-feature winners are then
    /// reduced with [`select_best`], ties going to the lowest feature index
    /// and then the lowest threshold.
    fn best_split(&self, samples: &[Sample], n_features: usize) -> Result<Option<SplitCandidate>, TreeError> {
        let candidates = (0..n_features)
            .map(|feature_index| self.best_threshold(samples, feature_index))
            .collect::<Result<Vec<_>, TreeError>>()?;
        Ok(select_best(candidates))
    }
}

/// Scans every midpoint between adjacent distinct values of a feature.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustiveSplitter {
    pub criterion: SplitCriterion,
}

impl ExhaustiveSplitter {
    pub fn new(criterion: SplitCriterion) -> Self {
        ExhaustiveSplitter { criterion }
    }
}

impl Splitter for ExhaustiveSplitter {
    fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    fn best_threshold(&self, samples: &[Sample], feature_index: usize) -> Result<Option<SplitCandidate>, TreeError> {
        let n = samples.len();
        if n < 2 {
            return Ok(None);
        }

        let mut values = samples
            .iter()
            .map(|s| Ok((s.value(feature_index)?, s.label)))
            .collect::<Result<Vec<(f64, &str)>, TreeError>>()?;
        values.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Sweep left to right, moving one sample at a time from the right
        // tally into the left one.
        let mut right: HashMap<&str, usize> = HashMap::new();
        for (_, label) in &values {
            *right.entry(*label).or_insert(0) += 1;
        }
        let parent_impurity = self.criterion.impurity(right.values().copied(), n);
        let mut left: HashMap<&str, usize> = HashMap::with_capacity(right.len());

        let mut best: Option<SplitCandidate> = None;
        for i in 0..n - 1 {
            let (value, label) = values[i];
            *left.entry(label).or_insert(0) += 1;
            if let Some(c) = right.get_mut(label) {
                *c -= 1;
            }

            let next = values[i + 1].0;
            // Only a boundary between distinct values is a valid threshold.
            if next <= value {
                continue;
            }

            let n_left = i + 1;
            let score = self.criterion.gain(
                parent_impurity,
                left.values().copied(),
                n_left,
                right.values().copied(),
                n - n_left,
            );
            let candidate = SplitCandidate::new(feature_index, midpoint(value, next), score);
            best = match best {
                Some(b) if !candidate.beats(&b) => Some(b),
                _ => Some(candidate),
            };
        }
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn samples<'a>(rows: &'a [(Vec<f64>, &'a str)]) -> Vec<Sample<'a>> {
        rows.iter().map(|(f, l)| Sample::new(f, l)).collect()
    }

    #[test]
    fn test_split_partitions_all_samples() {
        let rows = vec![
            (vec![1.0], "A"),
            (vec![5.0], "B"),
            (vec![2.0], "A"),
            (vec![5.5], "B"),
        ];
        let s = samples(&rows);
        let (left, right) = split(&s, 0, 5.0).unwrap();
        assert_eq!(left.len() + right.len(), s.len());
        assert_eq!(left.iter().map(|x| x.features[0]).collect::<Vec<_>>(), vec![1.0, 5.0, 2.0]);
        assert_eq!(right.iter().map(|x| x.features[0]).collect::<Vec<_>>(), vec![5.5]);
    }

    #[test]
    fn test_split_short_sample() {
        let rows = vec![(vec![1.0], "A")];
        let s = samples(&rows);
        assert!(matches!(split(&s, 2, 0.0), Err(TreeError::PredictionInput(2, 1))));
    }

    #[test]
    fn test_best_threshold_perfect_split() {
        let rows = vec![
            (vec![9.0], "B"),
            (vec![1.0], "A"),
            (vec![8.0], "B"),
            (vec![2.0], "A"),
        ];
        let s = samples(&rows);
        let c = ExhaustiveSplitter::default().best_threshold(&s, 0).unwrap().unwrap();
        assert_eq!(c.feature_index, 0);
        assert_eq!(c.threshold, 5.0);
        assert_abs_diff_eq!(c.score, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_best_threshold_single_value() {
        let rows = vec![(vec![3.0], "A"), (vec![3.0], "B"), (vec![3.0], "A")];
        let s = samples(&rows);
        assert_eq!(ExhaustiveSplitter::default().best_threshold(&s, 0).unwrap(), None);
        assert_eq!(ExhaustiveSplitter::default().best_threshold(&s[..1], 0).unwrap(), None);
    }

    #[test]
    fn test_best_threshold_ties_pick_lowest() {
        // A | B A | B: thresholds 1.5 and 3.5 score the same.
        let rows = vec![
            (vec![1.0], "A"),
            (vec![2.0], "B"),
            (vec![3.0], "A"),
            (vec![4.0], "B"),
        ];
        let s = samples(&rows);
        let splitter = ExhaustiveSplitter::default();
        let c = splitter.best_threshold(&s, 0).unwrap().unwrap();
        assert_eq!(c.threshold, 1.5);
        let (left, right) = split(&s, 0, 3.5).unwrap();
        let alt = SplitCriterion::Entropy.score(
            &crate::distribution::LabelDistribution::from_samples(&left),
            &crate::distribution::LabelDistribution::from_samples(&right),
        );
        assert_abs_diff_eq!(c.score, alt, epsilon = 1e-12);
    }

    #[test]
    fn test_best_threshold_duplicates_never_separated() {
        let rows = vec![
            (vec![1.0], "A"),
            (vec![1.0], "B"),
            (vec![2.0], "B"),
            (vec![2.0], "B"),
        ];
        let s = samples(&rows);
        let c = ExhaustiveSplitter::default().best_threshold(&s, 0).unwrap().unwrap();
        assert_eq!(c.threshold, 1.5);
        let (left, right) = split(&s, 0, c.threshold).unwrap();
        assert_eq!((left.len(), right.len()), (2, 2));
    }

    #[test]
    fn test_best_split_prefers_informative_feature() {
        // Feature 0 is noise, feature 1 separates the labels.
        let rows = vec![
            (vec![1.0, 10.0], "A"),
            (vec![2.0, 11.0], "A"),
            (vec![1.0, 20.0], "B"),
            (vec![2.0, 21.0], "B"),
        ];
        let s = samples(&rows);
        let c = ExhaustiveSplitter::default().best_split(&s, 2).unwrap().unwrap();
        assert_eq!(c.feature_index, 1);
        assert_eq!(c.threshold, 15.5);
        assert!(c.is_useful());
    }

    #[test]
    fn test_best_split_ties_pick_lowest_feature() {
        let rows = vec![(vec![1.0, 1.0], "A"), (vec![2.0, 2.0], "B")];
        let s = samples(&rows);
        let c = ExhaustiveSplitter::new(SplitCriterion::Gini).best_split(&s, 2).unwrap().unwrap();
        assert_eq!(c.feature_index, 0);
    }

    #[test]
    fn test_select_best() {
        let best = select_best(vec![
            None,
            Some(SplitCandidate::new(1, 0.5, 0.2)),
            Some(SplitCandidate::new(2, 0.5, 0.7)),
            Some(SplitCandidate::new(3, 0.5, 0.7)),
        ]);
        assert_eq!(best.map(|c| c.feature_index), Some(2));
        assert_eq!(select_best(vec![None, None]), None);
    }
}
