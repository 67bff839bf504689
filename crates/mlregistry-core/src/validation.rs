//! Request validation
//!
//! Everything here runs before the registry or any classifier is touched, so a
//! rejected request never leaves partial state behind. Batch checks stop at the
//! first bad item and name its index.

use crate::error::{Error, Result};
use crate::types::{ClassDataPoint, FeatureVector};

/// Longest identifier or class type accepted
pub const MAX_NAME_LEN: usize = 256;

/// Validate a caller-chosen classifier identifier
pub fn validate_identifier(identifier: &str) -> Result<()> {
    validate_name("identifier", identifier)
}

/// Validate a class-type token
pub fn validate_class_type(class_type: &str) -> Result<()> {
    validate_name("class_type", class_type)
}

fn validate_name(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} must not be empty")));
    }
    if value.len() > MAX_NAME_LEN {
        return Err(Error::validation(format!(
            "{field} is longer than {MAX_NAME_LEN} bytes"
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(Error::validation(format!(
            "{field} contains control characters"
        )));
    }
    Ok(())
}

/// Validate a snapshot filename as supplied by the caller
pub fn validate_filename(filename: &str) -> Result<()> {
    if filename.trim().is_empty() {
        return Err(Error::validation("filename must not be empty"));
    }
    if filename.contains('\0') {
        return Err(Error::validation("filename contains a NUL byte"));
    }
    Ok(())
}

/// Validate one feature vector of a batch.
///
/// Length is left to the classifier; only the values are checked here.
pub fn validate_feature_vector(index: usize, point: &[f64]) -> Result<()> {
    if let Some(pos) = point.iter().position(|v| !v.is_finite()) {
        return Err(Error::validation_at(
            index,
            format!("feature {pos} is not a finite number"),
        ));
    }
    Ok(())
}

/// Validate a batch of training points
pub fn validate_training_batch(data: &[ClassDataPoint], max_batch_size: usize) -> Result<()> {
    check_batch_size(data.len(), max_batch_size)?;

    for (index, item) in data.iter().enumerate() {
        if item.target_class.trim().is_empty() {
            return Err(Error::validation_at(index, "target_class is empty"));
        }
        validate_feature_vector(index, &item.point)?;
    }
    Ok(())
}

/// Validate a batch of feature vectors to classify
pub fn validate_vector_batch(data: &[FeatureVector], max_batch_size: usize) -> Result<()> {
    check_batch_size(data.len(), max_batch_size)?;

    for (index, point) in data.iter().enumerate() {
        validate_feature_vector(index, point)?;
    }
    Ok(())
}

/// Check every vector against the dimension a classifier has fixed.
///
/// A classifier without a fixed dimension accepts vectors of any length.
pub fn check_dimensions<'a>(
    points: impl IntoIterator<Item = &'a [f64]>,
    established: Option<usize>,
) -> Result<()> {
    let Some(expected) = established else {
        return Ok(());
    };

    for (index, point) in points.into_iter().enumerate() {
        if point.len() != expected {
            return Err(Error::validation_at(
                index,
                format!("expected {expected} features, got {}", point.len()),
            ));
        }
    }
    Ok(())
}

fn check_batch_size(len: usize, max_batch_size: usize) -> Result<()> {
    if len > max_batch_size {
        return Err(Error::validation(format!(
            "batch of {len} items exceeds the limit of {max_batch_size}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    #[test]
    fn test_identifier_rules() {
        assert!(validate_identifier("A").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("   ").is_err());
        assert!(validate_identifier("bad\nid").is_err());
        assert!(validate_identifier(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_vector_length_is_not_constrained() {
        let data = vec![vec![], vec![1.0], vec![1.0, 2.0, 3.0]];
        assert!(validate_vector_batch(&data, 10).is_ok());
        assert!(validate_vector_batch(&[], 10).is_ok());
    }

    #[test]
    fn test_empty_target_class_rejected() {
        let data = vec![
            ClassDataPoint::new("a", vec![1.0]),
            ClassDataPoint::new("", vec![1.0]),
        ];
        let err = validate_training_batch(&data, 10).unwrap_err();
        assert!(err.to_string().contains("data[1]"));
    }

    #[test]
    fn test_non_finite_training_value_rejected() {
        let data = vec![
            ClassDataPoint::new("a", vec![1.0]),
            ClassDataPoint::new("b", vec![f64::INFINITY]),
        ];
        let err = validate_training_batch(&data, 10).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("data[1]"));
    }

    #[test]
    fn test_batch_limit() {
        let data = vec![vec![1.0]; 3];
        assert!(validate_vector_batch(&data, 2).is_err());
        assert!(validate_vector_batch(&data, 3).is_ok());
    }

    #[test]
    fn test_check_dimensions() {
        let data = vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![2.0]];
        let points = || data.iter().map(Vec::as_slice);

        assert!(check_dimensions(points(), None).is_ok());
        assert!(check_dimensions(points().take(2), Some(2)).is_ok());

        let err = check_dimensions(points(), Some(2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("data[2]"));
    }

    proptest! {
        #[test]
        fn prop_finite_batches_of_any_shape_pass(
            data in proptest::collection::vec(
                proptest::collection::vec(-1000.0f64..1000.0, 0..8),
                0..20,
            ),
        ) {
            prop_assert!(validate_vector_batch(&data, 64).is_ok());
        }

        #[test]
        fn prop_non_finite_value_reported_by_index(
            rows in 1usize..20,
            bad_row in 0usize..20,
        ) {
            let bad_row = bad_row % rows;
            let mut data = vec![vec![0.5, 1.5]; rows];
            data[bad_row][1] = f64::NAN;
            let err = validate_vector_batch(&data, 64).unwrap_err();
            let expected = format!("data[{}]", bad_row);
            prop_assert!(err.to_string().contains(&expected));
        }
    }
}
