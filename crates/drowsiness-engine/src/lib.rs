//! Drowsiness Engine
//!
//! Temporal drowsiness scoring from per-frame facial landmarks:
//! - Eye/mouth aspect ratios (EAR/MAR) from 68-point landmarks
//! - Moving-average smoothing of the raw ratios
//! - Consecutive-frame debouncing of eye closure, yawns and blinks
//! - Weighted, clamped drowsiness score with phone/gaze signals
//! - Per-subject state with an optional multi-subject registry

pub mod analysis;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod registry;
pub mod score;
pub mod signals;
pub mod smoothing;
pub mod state;
pub mod validation;

pub use analysis::{DrowsinessAlert, DrowsinessLevel, FrameAnalysis, FrameStatus, GazeDirection};
pub use config::{EngineConfig, NoFacePolicy, Thresholds};
pub use debounce::{DebounceState, Debouncer};
pub use engine::{DriverMonitor, DrowsinessEngine};
pub use error::{ConfigError, EngineError, SignalError, ValidationError};
pub use geometry::{eye_aspect_ratio, mouth_aspect_ratio, LandmarkSet, Point, LANDMARK_COUNT};
pub use registry::{SubjectId, SubjectRegistry};
pub use score::{aggregate, FrameEvents, ScoreWeights, MAX_SCORE};
pub use signals::{
    AuxiliarySignals, DistractionDetector, FaceLandmarker, GazeEstimator, LandmarkGazeEstimator,
    NoDistraction,
};
pub use smoothing::RatioHistory;
pub use state::EngineState;
pub use validation::LandmarkValidator;
