//! Drowsiness Replay
//!
//! Feeds recorded per-frame landmark sets (JSON lines) through the subject
//! registry and the alert manager, writing one JSON result per frame.

use alerting::{AlertConfig, AlertError, AlertEvent, AlertManager, SessionStats, SessionTracker};
use drowsiness_engine::{
    AuxiliarySignals, EngineError, FrameAnalysis, LandmarkSet, Point, SubjectRegistry,
};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::io::{BufRead, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Replay error types
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Alert configuration error: {0}")]
    Alerts(#[from] AlertError),

    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),
}

/// One recorded frame
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplayFrame {
    /// Subject the frame belongs to; the replay default when absent
    #[serde(default)]
    pub subject: Option<String>,

    /// Detected faces in detector order, each a list of `[x, y]` points
    #[serde(default)]
    pub faces: Vec<Vec<[f64; 2]>>,

    /// Phone-use signal recorded alongside the frame
    #[serde(default)]
    pub phone: Option<bool>,
}

impl ReplayFrame {
    fn landmark_sets(&self) -> Vec<LandmarkSet> {
        self.faces
            .iter()
            .map(|face| face.iter().copied().map(Point::from).collect::<Vec<_>>().into())
            .collect()
    }

    fn signals(&self) -> AuxiliarySignals {
        self.phone.map(AuxiliarySignals::phone).unwrap_or_default()
    }
}

/// One output line
#[derive(Debug, Clone, Serialize)]
pub struct ReplayRecord {
    pub frame: u64,
    pub subject: String,
    #[serde(flatten)]
    pub analysis: FrameAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<AlertEvent>,
}

/// End-of-replay summary
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplaySummary {
    pub frames: u64,
    pub skipped_lines: u64,
    pub sessions: BTreeMap<String, SessionStats>,
}

struct Session {
    alerts: AlertManager,
    tracker: SessionTracker,
}

/// Drives recorded frames through the engine and alerting
pub struct Replayer {
    registry: SubjectRegistry,
    alert_config: AlertConfig,
    default_subject: String,
    sessions: HashMap<String, Session>,
    frames: u64,
    skipped_lines: u64,
}

impl Replayer {
    pub fn new(
        registry: SubjectRegistry,
        alert_config: AlertConfig,
        default_subject: impl Into<String>,
    ) -> Result<Self, ReplayError> {
        alert_config.validate()?;
        Ok(Self {
            registry,
            alert_config,
            default_subject: default_subject.into(),
            sessions: HashMap::new(),
            frames: 0,
            skipped_lines: 0,
        })
    }

    /// Process one recorded frame
    pub fn process(&mut self, frame: &ReplayFrame) -> Result<ReplayRecord, ReplayError> {
        let subject = frame
            .subject
            .clone()
            .unwrap_or_else(|| self.default_subject.clone());

        let analysis =
            self.registry
                .process_frame(&subject, &frame.landmark_sets(), &frame.signals())?;

        let session = match self.sessions.entry(subject.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(Session {
                alerts: AlertManager::new(self.alert_config.clone())?,
                tracker: SessionTracker::default(),
            }),
        };

        let alert = session.alerts.observe(&analysis);
        session.tracker.observe(&analysis, alert.as_ref());
        if let Some(alert) = &alert {
            info!(
                "[{}] {:?} alert: {} (score {})",
                subject, alert.severity, alert.description, alert.score
            );
        }

        self.frames += 1;
        Ok(ReplayRecord {
            frame: self.frames,
            subject,
            analysis,
            alert,
        })
    }

    /// Replay every line of `input`, writing one JSON record per frame
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        input: R,
        mut output: W,
    ) -> Result<ReplaySummary, ReplayError> {
        for (index, line) in input.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let frame: ReplayFrame = match serde_json::from_str(&line) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("Skipping line {}: {}", index + 1, e);
                    self.skipped_lines += 1;
                    continue;
                }
            };

            let record = self.process(&frame)?;
            serde_json::to_writer(&mut output, &record)?;
            output.write_all(b"\n")?;
        }
        output.flush()?;

        let summary = self.summary();
        debug!("Replay finished: {:?}", summary);
        Ok(summary)
    }

    pub fn summary(&self) -> ReplaySummary {
        ReplaySummary {
            frames: self.frames,
            skipped_lines: self.skipped_lines,
            sessions: self
                .sessions
                .iter()
                .map(|(subject, session)| (subject.clone(), session.tracker.stats().clone()))
                .collect(),
        }
    }

    pub fn registry(&self) -> &SubjectRegistry {
        &self.registry
    }
}

/// Read the `[alerts]` table of the config file, defaults when absent
pub fn load_alert_config(path: Option<&Path>) -> Result<AlertConfig, ReplayError> {
    let Some(path) = path else {
        return Ok(AlertConfig::default());
    };

    let settings = config::Config::builder()
        .add_source(config::File::from(path).required(true))
        .build()?;

    let alerts = match settings.get::<AlertConfig>("alerts") {
        Ok(alerts) => alerts,
        Err(config::ConfigError::NotFound(_)) => AlertConfig::default(),
        Err(e) => return Err(e.into()),
    };
    alerts.validate()?;
    Ok(alerts)
}

/// Initialize logging (to stderr, so stdout stays pure JSON lines)
pub fn init_logging(level: Level, json: bool) {
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    if let Err(e) = result {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}
