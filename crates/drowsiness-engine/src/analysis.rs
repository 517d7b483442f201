//! Frame analysis results and alerts

use serde::{Deserialize, Serialize};

/// Gaze direction reported by a gaze estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GazeDirection {
    Forward,
    Left,
    Right,
    Side,
    #[default]
    Unknown,
}

impl GazeDirection {
    /// Off-forward directions count toward the score; `Unknown` does not
    pub fn is_off_forward(&self) -> bool {
        matches!(self, Self::Left | Self::Right | Self::Side)
    }
}

/// Drowsiness level derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum DrowsinessLevel {
    #[default]
    Normal,
    Moderate,
    High,
}

impl DrowsinessLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=40 => Self::Normal,
            41..=75 => Self::Moderate,
            _ => Self::High,
        }
    }
}

/// Per-frame alerts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrowsinessAlert {
    /// Eye closure sustained past the debounce window
    EyesClosed,

    /// Yawn sustained past the debounce window
    Yawning,

    /// Blink threshold held for consecutive frames
    RapidBlinking,

    /// Phone use reported by the distraction detector
    PhoneUse,

    /// Gaze away from the road
    LookingAway,

    /// Face not visible (camera blocked?)
    FaceNotVisible,
}

/// How the frame was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStatus {
    #[default]
    Tracked,
    FaceNotFound,
    InvalidInput,
    DetectorFailed,
}

/// Result of processing one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameAnalysis {
    /// Drowsiness score in [0, 100]
    #[serde(rename = "drowsinessScore")]
    pub score: u8,

    /// Raw mean EAR of the primary face
    pub ear_value: f64,

    pub smoothed_ear: f64,

    pub mar_value: f64,

    pub smoothed_mar: f64,

    pub is_yawning: bool,

    pub is_phone_detected: bool,

    pub gaze_direction: GazeDirection,

    pub blink_detected: bool,

    pub eyes_closed: bool,

    pub drowsiness_level: DrowsinessLevel,

    /// Fraction of recent tracked frames with eyes closed
    pub perclos: f64,

    pub status: FrameStatus,

    pub alerts: Vec<DrowsinessAlert>,

    /// Why the frame produced a neutral result
    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
}

impl Default for FrameAnalysis {
    fn default() -> Self {
        Self {
            score: 0,
            ear_value: 0.0,
            smoothed_ear: 0.0,
            mar_value: 0.0,
            smoothed_mar: 0.0,
            is_yawning: false,
            is_phone_detected: false,
            gaze_direction: GazeDirection::Unknown,
            blink_detected: false,
            eyes_closed: false,
            drowsiness_level: DrowsinessLevel::Normal,
            perclos: 0.0,
            status: FrameStatus::Tracked,
            alerts: Vec::new(),
            error_reason: None,
        }
    }
}

impl FrameAnalysis {
    /// Neutral record for a frame that could not be scored
    pub fn neutral(status: FrameStatus, reason: impl Into<String>) -> Self {
        Self {
            status,
            error_reason: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn face_detected(&self) -> bool {
        self.status == FrameStatus::Tracked
    }

    /// Check if any alerts are active
    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }

    /// Get highest severity alert
    pub fn highest_severity_alert(&self) -> Option<DrowsinessAlert> {
        // Priority: EyesClosed > Yawning > PhoneUse > LookingAway > RapidBlinking > Others
        [
            DrowsinessAlert::EyesClosed,
            DrowsinessAlert::Yawning,
            DrowsinessAlert::PhoneUse,
            DrowsinessAlert::LookingAway,
            DrowsinessAlert::RapidBlinking,
        ]
        .into_iter()
        .find(|a| self.alerts.contains(a))
        .or_else(|| self.alerts.first().copied())
    }
}
