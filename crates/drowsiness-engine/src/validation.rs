//! Landmark set validation
//!
//! Runs before any engine state is touched so a rejected frame never
//! advances a streak or pushes into a smoothing history.

use crate::error::ValidationError;
use crate::geometry::{LandmarkSet, LANDMARK_COUNT};

/// Validator for detector-produced landmark sets
#[derive(Debug, Clone)]
pub struct LandmarkValidator {
    expected_points: usize,
}

impl LandmarkValidator {
    pub fn new(expected_points: usize) -> Self {
        Self { expected_points }
    }

    /// Validate point count
    pub fn validate_cardinality(&self, landmarks: &LandmarkSet) -> Result<(), ValidationError> {
        if landmarks.len() != self.expected_points {
            Err(ValidationError::WrongCardinality {
                expected: self.expected_points,
                actual: landmarks.len(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that every coordinate is finite
    pub fn validate_finite(&self, landmarks: &LandmarkSet) -> Result<(), ValidationError> {
        match landmarks
            .points()
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite())
        {
            Some((index, p)) => Err(ValidationError::NonFinite {
                index,
                x: p.x,
                y: p.y,
            }),
            None => Ok(()),
        }
    }

    pub fn validate(&self, landmarks: &LandmarkSet) -> Result<(), ValidationError> {
        self.validate_cardinality(landmarks)?;
        self.validate_finite(landmarks)
    }
}

impl Default for LandmarkValidator {
    fn default() -> Self {
        Self::new(LANDMARK_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{fixtures, Point};

    #[test]
    fn test_valid_face() {
        let validator = LandmarkValidator::default();
        assert!(validator.validate(&fixtures::face(0.3, 0.1)).is_ok());
    }

    #[test]
    fn test_wrong_cardinality() {
        let validator = LandmarkValidator::default();
        let short = LandmarkSet::new(vec![Point::default(); 5]);
        assert_eq!(
            validator.validate(&short),
            Err(ValidationError::WrongCardinality {
                expected: 68,
                actual: 5
            })
        );
    }

    #[test]
    fn test_non_finite() {
        let validator = LandmarkValidator::default();
        let mut points = fixtures::face(0.3, 0.1).points().to_vec();
        points[40] = Point::new(f64::NAN, 1.0);
        points[50] = Point::new(f64::INFINITY, 1.0);

        let err = validator.validate(&LandmarkSet::new(points)).unwrap_err();
        assert!(matches!(err, ValidationError::NonFinite { index: 40, .. }));
    }
}
