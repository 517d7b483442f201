//! External collaborators
//!
//! Face landmarking, phone detection and gaze estimation are supplied by the
//! caller. Optional ones degrade to `false` / [`GazeDirection::Unknown`]
//! when missing or failing.

use crate::analysis::GazeDirection;
use crate::error::SignalError;
use crate::geometry::{centroid, LandmarkSet};
use tracing::warn;

/// Produces zero or more landmark sets from an image, in detector order
pub trait FaceLandmarker {
    type Image: ?Sized;

    fn detect_faces(&self, image: &Self::Image) -> Result<Vec<LandmarkSet>, SignalError>;
}

/// Image-level distraction (phone use) detector
pub trait DistractionDetector<I: ?Sized> {
    fn detect_distraction(&self, image: &I) -> Result<bool, SignalError>;
}

/// Placeholder used when no distraction detector is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDistraction;

impl<I: ?Sized> DistractionDetector<I> for NoDistraction {
    fn detect_distraction(&self, _image: &I) -> Result<bool, SignalError> {
        Ok(false)
    }
}

/// Landmark-level gaze estimator
pub trait GazeEstimator: Send + Sync {
    fn estimate_gaze(&self, landmarks: &LandmarkSet) -> Result<GazeDirection, SignalError>;
}

/// Per-frame observations gathered outside the engine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuxiliarySignals {
    /// Phone-use signal; `None` when no detector ran
    pub phone_detected: Option<Result<bool, SignalError>>,
}

impl AuxiliarySignals {
    pub fn phone(detected: bool) -> Self {
        Self {
            phone_detected: Some(Ok(detected)),
        }
    }

    /// Phone signal with failures degraded to `false`
    pub fn phone_in_use(&self) -> bool {
        match &self.phone_detected {
            Some(Ok(detected)) => *detected,
            Some(Err(e)) => {
                warn!("Phone detector unavailable, assuming no phone: {}", e);
                false
            }
            None => false,
        }
    }
}

/// Gaze heuristic: horizontal offset of the eye centres from the jaw centre
#[derive(Debug, Clone)]
pub struct LandmarkGazeEstimator {
    offset_px: f64,
}

impl LandmarkGazeEstimator {
    pub fn new(offset_px: f64) -> Self {
        Self { offset_px }
    }
}

impl Default for LandmarkGazeEstimator {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl GazeEstimator for LandmarkGazeEstimator {
    fn estimate_gaze(&self, landmarks: &LandmarkSet) -> Result<GazeDirection, SignalError> {
        let missing = || SignalError::Unavailable("gaze landmarks");
        let left = landmarks.left_eye().and_then(|e| centroid(e)).ok_or_else(missing)?;
        let right = landmarks.right_eye().and_then(|e| centroid(e)).ok_or_else(missing)?;
        let face = landmarks.jaw().and_then(centroid).ok_or_else(missing)?;

        let offset = (left.x + right.x) / 2.0 - face.x;
        Ok(if offset < -self.offset_px {
            GazeDirection::Left
        } else if offset > self.offset_px {
            GazeDirection::Right
        } else {
            GazeDirection::Forward
        })
    }
}
