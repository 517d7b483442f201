//! Engine configuration
//!
//! Loaded once, validated, then immutable for the lifetime of an engine.
//! Layering: defaults, optional TOML file, `DROWSINESS_*` environment
//! variables (`__` separates nested keys, e.g. `DROWSINESS_THRESHOLDS__EAR`).

use crate::error::ConfigError;
use crate::score::ScoreWeights;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "DROWSINESS";

/// Detection thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Smoothed EAR below this = eyes closed
    pub ear: f64,

    /// Smoothed MAR above this = mouth open / yawning
    pub mar: f64,

    /// Smoothed EAR below this = blink (more sensitive than `ear`)
    pub blink: f64,

    /// Consecutive closed frames before eye closure triggers
    pub ear_consec_frames: u32,

    /// Consecutive open-mouth frames before a yawn triggers
    pub yawn_consec_frames: u32,

    /// Consecutive blink frames before a blink triggers
    pub blink_consec_frames: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            ear: 0.25,
            mar: 0.35,
            blink: 0.2,
            ear_consec_frames: 8,
            yawn_consec_frames: 12,
            blink_consec_frames: 3,
        }
    }
}

/// What a frame without a face clears
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoFacePolicy {
    /// Streak counters only; smoothing history survives face loss
    ResetCounters,
    /// Counters, smoothing histories, PERCLOS window and last score
    #[default]
    ResetAll,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub thresholds: Thresholds,

    pub weights: ScoreWeights,

    /// Frames averaged by the EAR/MAR smoother
    pub smoothing_window: usize,

    pub no_face_policy: NoFacePolicy,

    /// Consecutive face-less frames before `FaceNotVisible` is raised
    pub face_absent_alert_frames: u32,

    /// Tracked frames considered for PERCLOS (~1 minute at 15fps)
    pub perclos_window: usize,

    /// Horizontal eye/jaw offset (pixels) beyond which gaze is off-forward
    pub gaze_offset_px: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            weights: ScoreWeights::default(),
            smoothing_window: 5,
            no_face_policy: NoFacePolicy::default(),
            face_absent_alert_frames: 30,
            perclos_window: 900,
            gaze_offset_px: 10.0,
        }
    }
}

impl EngineConfig {
    /// Create strict config (earlier triggering)
    pub fn strict() -> Self {
        Self {
            thresholds: Thresholds {
                ear: 0.27,
                mar: 0.3,
                ear_consec_frames: 5,
                yawn_consec_frames: 8,
                blink_consec_frames: 2,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Create lenient config (later triggering)
    pub fn lenient() -> Self {
        Self {
            thresholds: Thresholds {
                ear: 0.22,
                mar: 0.45,
                ear_consec_frames: 12,
                yawn_consec_frames: 18,
                blink_consec_frames: 4,
                blink: 0.18,
            },
            smoothing_window: 7,
            ..Default::default()
        }
    }

    /// Load defaults, then `path` (if given), then the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, Self::environment())
    }

    /// `DROWSINESS_*` variables, `__` between nested keys
    /// (`DROWSINESS_THRESHOLDS__EAR=0.22`)
    pub fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Same layering as [`load`](Self::load) with an explicit environment source
    pub fn load_with_env(
        path: Option<&Path>,
        env: config::Environment,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            debug!("Reading engine config from {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config: Self = builder.add_source(env).build()?.try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document layered over the defaults
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check every value; an engine is never built from a config that fails
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        for (field, value) in [
            ("thresholds.ear", t.ear),
            ("thresholds.mar", t.mar),
            ("thresholds.blink", t.blink),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidThreshold { field, value });
            }
        }

        for (field, frames) in [
            ("thresholds.ear_consec_frames", t.ear_consec_frames),
            ("thresholds.yawn_consec_frames", t.yawn_consec_frames),
            ("thresholds.blink_consec_frames", t.blink_consec_frames),
            ("face_absent_alert_frames", self.face_absent_alert_frames),
        ] {
            if frames == 0 {
                return Err(ConfigError::ZeroFrameCount(field));
            }
        }

        if self.smoothing_window == 0 {
            return Err(ConfigError::ZeroWindow("smoothing_window"));
        }
        if self.perclos_window == 0 {
            return Err(ConfigError::ZeroWindow("perclos_window"));
        }

        if !self.gaze_offset_px.is_finite() || self.gaze_offset_px < 0.0 {
            return Err(ConfigError::InvalidThreshold {
                field: "gaze_offset_px",
                value: self.gaze_offset_px,
            });
        }

        if t.blink >= t.ear {
            warn!(
                "Blink threshold {} is not below eye-closure threshold {}",
                t.blink, t.ear
            );
        }

        Ok(())
    }
}
