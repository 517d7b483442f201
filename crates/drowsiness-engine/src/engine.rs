//! Frame orchestration
//!
//! [`DrowsinessEngine`] runs geometry, smoothing, debouncing and scoring for
//! one subject. [`DriverMonitor`] puts a face landmarker and an optional
//! distraction detector in front of it.

use crate::analysis::{
    DrowsinessAlert, DrowsinessLevel, FrameAnalysis, FrameStatus, GazeDirection,
};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::geometry::LandmarkSet;
use crate::score::{aggregate, FrameEvents};
use crate::signals::{
    AuxiliarySignals, DistractionDetector, FaceLandmarker, GazeEstimator, LandmarkGazeEstimator,
    NoDistraction,
};
use crate::state::EngineState;
use crate::validation::LandmarkValidator;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Drowsiness scoring engine for one tracked subject
///
/// Calls must be serialized per instance; the engine does no locking.
pub struct DrowsinessEngine {
    config: EngineConfig,
    validator: LandmarkValidator,
    gaze_estimator: Option<Arc<dyn GazeEstimator>>,
    state: EngineState,
    frames_processed: u64,
}

impl DrowsinessEngine {
    /// Create a new engine; fails on invalid configuration
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        info!(
            "Creating drowsiness engine (window {}, EAR {}, MAR {})",
            config.smoothing_window, config.thresholds.ear, config.thresholds.mar
        );
        Ok(Self {
            validator: LandmarkValidator::default(),
            gaze_estimator: None,
            state: EngineState::new(&config),
            frames_processed: 0,
            config,
        })
    }

    pub fn with_gaze_estimator(mut self, estimator: Arc<dyn GazeEstimator>) -> Self {
        self.gaze_estimator = Some(estimator);
        self
    }

    /// Use the landmark offset heuristic for gaze
    pub fn with_landmark_gaze(self) -> Self {
        let estimator = LandmarkGazeEstimator::new(self.config.gaze_offset_px);
        self.with_gaze_estimator(Arc::new(estimator))
    }

    /// Process the landmark sets detected in one frame
    ///
    /// The first set is the tracked subject. Never fails: invalid input and
    /// missing faces produce a neutral record with `error_reason` set.
    pub fn process_frame(
        &mut self,
        faces: &[LandmarkSet],
        signals: &AuxiliarySignals,
    ) -> FrameAnalysis {
        self.frames_processed += 1;

        let Some(face) = faces.first() else {
            return self.face_not_found();
        };
        if faces.len() > 1 {
            debug!("{} faces detected, tracking the first", faces.len());
        }

        // Everything fallible happens before state is touched
        if let Err(e) = self.validator.validate(face) {
            warn!("Discarding frame {}: {}", self.frames_processed, e);
            return FrameAnalysis::neutral(FrameStatus::InvalidInput, e.to_string());
        }
        let (ear, mar) = match (face.mean_ear(), face.mar()) {
            (Some(ear), Some(mar)) if ear.is_finite() && mar.is_finite() => (ear, mar),
            _ => {
                warn!("Discarding frame {}: degenerate geometry", self.frames_processed);
                return FrameAnalysis::neutral(
                    FrameStatus::InvalidInput,
                    "Landmark geometry produced non-finite ratios",
                );
            }
        };
        let gaze = self.estimate_gaze(face);
        let phone_detected = signals.phone_in_use();

        let t = &self.config.thresholds;
        let state = &mut self.state;
        state.face_absent_frames = 0;

        let smoothed_ear = state.ear_history.smooth(ear);
        let smoothed_mar = state.mar_history.smooth(mar);

        let blinked = state.blink.observe(smoothed_ear < t.blink);
        let eye_closed = state.eye_closure.observe(smoothed_ear < t.ear);
        let yawning = state.yawn.observe(smoothed_mar > t.mar);
        state.add_closure_sample(smoothed_ear < t.ear);

        let events = FrameEvents {
            eye_closed,
            yawning,
            blinked,
            phone_detected,
            looking_away: gaze.is_off_forward(),
        };
        let score = aggregate(&events, &self.config.weights);
        state.last_score = score;

        debug!(
            "EAR {:.3} (smoothed {:.3}), MAR {:.3} (smoothed {:.3}), \
             streaks eye={} yawn={} blink={}, score {}",
            ear,
            smoothed_ear,
            mar,
            smoothed_mar,
            state.eye_closed_streak(),
            state.yawn_streak(),
            state.blink_streak(),
            score
        );

        FrameAnalysis {
            score,
            ear_value: ear,
            smoothed_ear,
            mar_value: mar,
            smoothed_mar,
            is_yawning: yawning,
            is_phone_detected: phone_detected,
            gaze_direction: gaze,
            blink_detected: blinked,
            eyes_closed: eye_closed,
            drowsiness_level: DrowsinessLevel::from_score(score),
            perclos: state.perclos(),
            status: FrameStatus::Tracked,
            alerts: alerts_for(&events),
            error_reason: None,
        }
    }

    fn face_not_found(&mut self) -> FrameAnalysis {
        self.state.on_face_lost(self.config.no_face_policy);

        let mut analysis = FrameAnalysis::neutral(FrameStatus::FaceNotFound, "No face detected");
        if self.state.face_absent_frames > self.config.face_absent_alert_frames {
            analysis.alerts.push(DrowsinessAlert::FaceNotVisible);
        }
        analysis
    }

    fn estimate_gaze(&self, face: &LandmarkSet) -> GazeDirection {
        match &self.gaze_estimator {
            Some(estimator) => estimator.estimate_gaze(face).unwrap_or_else(|e| {
                warn!("Gaze estimator unavailable: {}", e);
                GazeDirection::Unknown
            }),
            None => GazeDirection::Unknown,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Reset tracked state (on subject change)
    pub fn reset_state(&mut self) {
        self.state.reset();
    }
}

fn alerts_for(events: &FrameEvents) -> Vec<DrowsinessAlert> {
    [
        (events.eye_closed, DrowsinessAlert::EyesClosed),
        (events.yawning, DrowsinessAlert::Yawning),
        (events.blinked, DrowsinessAlert::RapidBlinking),
        (events.phone_detected, DrowsinessAlert::PhoneUse),
        (events.looking_away, DrowsinessAlert::LookingAway),
    ]
    .into_iter()
    .filter_map(|(active, alert)| active.then_some(alert))
    .collect()
}

/// Image-level pipeline: landmarker, optional distraction detector, engine
pub struct DriverMonitor<L, D = NoDistraction> {
    landmarker: L,
    distraction: D,
    engine: DrowsinessEngine,
}

impl<L: FaceLandmarker> DriverMonitor<L, NoDistraction> {
    pub fn new(landmarker: L, engine: DrowsinessEngine) -> Self {
        Self {
            landmarker,
            distraction: NoDistraction,
            engine,
        }
    }
}

impl<L, D> DriverMonitor<L, D>
where
    L: FaceLandmarker,
    D: DistractionDetector<L::Image>,
{
    pub fn with_distraction_detector<D2>(self, distraction: D2) -> DriverMonitor<L, D2>
    where
        D2: DistractionDetector<L::Image>,
    {
        DriverMonitor {
            landmarker: self.landmarker,
            distraction,
            engine: self.engine,
        }
    }

    /// Analyze a single image for driver state
    pub fn analyze(&mut self, image: &L::Image) -> FrameAnalysis {
        let faces = match self.landmarker.detect_faces(image) {
            Ok(faces) => faces,
            Err(e) => {
                warn!("Face landmarker failed: {}", e);
                return FrameAnalysis::neutral(FrameStatus::DetectorFailed, e.to_string());
            }
        };

        let signals = if faces.is_empty() {
            AuxiliarySignals::default()
        } else {
            AuxiliarySignals {
                phone_detected: Some(self.distraction.detect_distraction(image)),
            }
        };

        self.engine.process_frame(&faces, &signals)
    }

    pub fn engine(&self) -> &DrowsinessEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut DrowsinessEngine {
        &mut self.engine
    }
}
