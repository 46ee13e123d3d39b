use crate::data::Observation;
use crate::errors::TreeError;

/// Create a string of all available items.
pub fn items_to_strings(items: Vec<&str>) -> String {
    items.join(", ")
}

// Validation
pub fn validate_positive_float_parameter(value: f64, parameter: &str) -> Result<(), TreeError> {
    validate_float_parameter(value, 0.0, f64::INFINITY, parameter)
}

pub fn validate_float_parameter(value: f64, min: f64, max: f64, parameter: &str) -> Result<(), TreeError> {
    if value.is_nan() || value < min || max < value {
        let ex_msg = format!("real value within range {} and {}", min, max);
        Err(TreeError::InvalidParameter(
            parameter.to_string(),
            ex_msg,
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

pub fn validate_min_usize_parameter(value: usize, min: usize, parameter: &str) -> Result<(), TreeError> {
    if value < min {
        Err(TreeError::InvalidParameter(
            parameter.to_string(),
            format!("integer of at least {}", min),
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Check every observation has as many features as the first one,
/// returning that count.
pub fn validate_feature_counts(observations: &[Observation]) -> Result<usize, TreeError> {
    let n_features = match observations.first() {
        Some(obs) => obs.features.len(),
        None => return Err(TreeError::EmptyDataset),
    };
    for (i, obs) in observations.iter().enumerate() {
        if obs.features.len() != n_features {
            return Err(TreeError::InconsistentFeatures(i, n_features, obs.features.len()));
        }
    }
    Ok(n_features)
}

/// Check no feature value is NaN, thresholds can only be placed between
/// ordered values.
pub fn validate_feature_values(observations: &[Observation]) -> Result<(), TreeError> {
    for (i, obs) in observations.iter().enumerate() {
        if let Some(j) = obs.features.iter().position(|v| v.is_nan()) {
            return Err(TreeError::InvalidFeatureValue(i, j));
        }
    }
    Ok(())
}

/// Threshold half way between two adjacent distinct values `lo < hi`.
///
/// Always satisfies `lo <= t < hi`, when the midpoint rounds onto `hi`
/// (adjacent floats) or is NaN (infinite bounds) `lo` itself is returned.
#[inline]
pub fn midpoint(lo: f64, hi: f64) -> f64 {
    let mid = lo / 2.0 + hi / 2.0;
    if lo <= mid && mid < hi {
        mid
    } else {
        lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoint() {
        assert_eq!(midpoint(2.0, 8.0), 5.0);
        assert_eq!(midpoint(-1.0, 1.0), 0.0);
        assert_eq!(midpoint(-f64::MAX, f64::MAX), 0.0);
        let lo = 1.0_f64;
        let hi = f64::from_bits(lo.to_bits() + 1);
        let t = midpoint(lo, hi);
        assert!(lo <= t && t < hi);
        assert_eq!(midpoint(1.0, f64::INFINITY), 1.0);
        assert_eq!(midpoint(f64::NEG_INFINITY, f64::INFINITY), f64::NEG_INFINITY);
        assert_eq!(midpoint(1.0, f64::NAN), 1.0);
    }

    #[test]
    fn test_validate_feature_values() {
        let obs = vec![
            Observation::labeled(vec![1.0, 2.0], "a"),
            Observation::labeled(vec![f64::INFINITY, f64::NAN], "b"),
        ];
        assert!(matches!(
            validate_feature_values(&obs),
            Err(TreeError::InvalidFeatureValue(1, 1))
        ));
        assert!(validate_feature_values(&obs[..1]).is_ok());
    }

    #[test]
    fn test_validate_float_parameter() {
        assert!(validate_positive_float_parameter(0.0, "min_gain").is_ok());
        assert!(validate_positive_float_parameter(-0.1, "min_gain").is_err());
        assert!(validate_positive_float_parameter(f64::NAN, "min_gain").is_err());
        assert!(validate_float_parameter(2.0, 0.0, 1.0, "x").is_err());
    }

    #[test]
    fn test_validate_min_usize_parameter() {
        assert!(validate_min_usize_parameter(2, 2, "min_samples_split").is_ok());
        assert!(matches!(
            validate_min_usize_parameter(1, 2, "min_samples_split"),
            Err(TreeError::InvalidParameter(..))
        ));
    }

    #[test]
    fn test_validate_feature_counts() {
        let obs = vec![
            Observation::labeled(vec![1.0, 2.0], "a"),
            Observation::labeled(vec![1.0], "b"),
        ];
        assert!(matches!(
            validate_feature_counts(&obs),
            Err(TreeError::InconsistentFeatures(1, 2, 1))
        ));
        assert_eq!(validate_feature_counts(&obs[..1]).unwrap(), 2);
        assert!(matches!(validate_feature_counts(&[]), Err(TreeError::EmptyDataset)));
    }

    #[test]
    fn test_items_to_strings() {
        assert_eq!(items_to_strings(vec!["entropy", "gini"]), "entropy, gini");
    }
}
