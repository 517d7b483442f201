//! Alert Manager Implementation

use drowsiness_engine::{DrowsinessAlert, FrameAnalysis};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Alert configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlertError {
    #[error("Critical threshold {critical} is below alert threshold {alert}")]
    ThresholdOrder { alert: u8, critical: u8 },

    #[error("Alert history must hold at least one entry")]
    EmptyHistory,

    #[error("Display smoothing factor must be in (0, 1], got {0}")]
    InvalidSmoothing(f64),
}

/// Alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Scores strictly above this raise a drowsiness alert (default: 75)
    pub alert_score_threshold: u8,
    /// Scores at or above this are critical (default: 90)
    pub critical_score_threshold: u8,
    /// Cooldown period between duplicate alerts (seconds)
    pub cooldown_seconds: u64,
    /// Maximum alerts per hour before throttling
    pub max_alerts_per_hour: usize,
    /// Alerts kept in the most-recent-first history
    pub history_len: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            alert_score_threshold: 75,
            critical_score_threshold: 90,
            cooldown_seconds: 10,
            max_alerts_per_hour: 120,
            history_len: 10,
        }
    }
}

impl AlertConfig {
    pub fn validate(&self) -> Result<(), AlertError> {
        if self.critical_score_threshold < self.alert_score_threshold {
            return Err(AlertError::ThresholdOrder {
                alert: self.alert_score_threshold,
                critical: self.critical_score_threshold,
            });
        }
        if self.history_len == 0 {
            return Err(AlertError::EmptyHistory);
        }
        Ok(())
    }
}

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// State of an alert
#[derive(Debug, Clone)]
pub struct AlertState {
    /// Last time this alert was fired
    pub last_fired: Instant,
    /// Number of times fired
    pub fire_count: usize,
    /// Whether alert is acknowledged
    pub acknowledged: bool,
}

/// A fired alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub cause: DrowsinessAlert,
    pub severity: Severity,
    pub score: u8,
    pub description: String,
    pub timestamp_ms: u64,
}

/// Alert manager for deduplication and throttling
pub struct AlertManager {
    /// Configuration
    config: AlertConfig,
    /// Alert states by cause
    states: HashMap<DrowsinessAlert, AlertState>,
    /// Fired alerts, most recent first
    history: VecDeque<AlertEvent>,
    /// Alerts fired in current hour
    hourly_count: usize,
    /// Hour start time
    hour_start: Instant,
}

impl AlertManager {
    /// Create a new alert manager
    pub fn new(config: AlertConfig) -> Result<Self, AlertError> {
        config.validate()?;
        info!("Creating alert manager with config: {:?}", config);
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: AlertConfig) -> Self {
        Self {
            history: VecDeque::with_capacity(config.history_len),
            config,
            states: HashMap::new(),
            hourly_count: 0,
            hour_start: Instant::now(),
        }
    }

    /// Inspect one frame and fire an alert if warranted
    pub fn observe(&mut self, analysis: &FrameAnalysis) -> Option<AlertEvent> {
        let (cause, severity) = if analysis.alerts.contains(&DrowsinessAlert::FaceNotVisible) {
            (DrowsinessAlert::FaceNotVisible, Severity::Medium)
        } else if analysis.score > self.config.alert_score_threshold {
            (
                analysis.highest_severity_alert()?,
                self.get_severity(analysis.score),
            )
        } else {
            return None;
        };

        if !self.should_fire(cause) {
            return None;
        }
        self.record_fire(cause);

        let event = AlertEvent {
            cause,
            severity,
            score: analysis.score,
            description: describe(cause).to_string(),
            timestamp_ms: now_ms(),
        };
        self.history.push_front(event.clone());
        self.history.truncate(self.config.history_len);
        Some(event)
    }

    /// Check if an alert should be fired based on throttling and deduplication
    pub fn should_fire(&mut self, cause: DrowsinessAlert) -> bool {
        // Reset hourly counter if needed
        if self.hour_start.elapsed() > Duration::from_secs(3600) {
            self.hourly_count = 0;
            self.hour_start = Instant::now();
        }

        // Check hourly throttle
        if self.hourly_count >= self.config.max_alerts_per_hour {
            warn!("Alert throttled: max alerts per hour reached");
            return false;
        }

        // Check cooldown
        if let Some(state) = self.states.get(&cause) {
            let cooldown = Duration::from_secs(self.config.cooldown_seconds);
            if state.last_fired.elapsed() < cooldown {
                debug!("Alert {:?} suppressed: in cooldown period", cause);
                return false;
            }
        }

        true
    }

    /// Record that an alert was fired
    pub fn record_fire(&mut self, cause: DrowsinessAlert) {
        self.hourly_count += 1;

        let state = self.states.entry(cause).or_insert(AlertState {
            last_fired: Instant::now(),
            fire_count: 0,
            acknowledged: false,
        });

        state.last_fired = Instant::now();
        state.fire_count += 1;
        state.acknowledged = false;

        info!("Alert recorded: {:?} (count: {})", cause, state.fire_count);
    }

    /// Acknowledge an alert
    pub fn acknowledge(&mut self, cause: DrowsinessAlert) -> bool {
        if let Some(state) = self.states.get_mut(&cause) {
            state.acknowledged = true;
            info!("Alert acknowledged: {:?}", cause);
            true
        } else {
            false
        }
    }

    /// Get severity level based on score
    pub fn get_severity(&self, score: u8) -> Severity {
        if score >= self.config.critical_score_threshold {
            Severity::Critical
        } else if score > self.config.alert_score_threshold {
            Severity::High
        } else if score >= 50 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    /// Get pending (unacknowledged) alerts
    pub fn get_pending(&self) -> Vec<(DrowsinessAlert, &AlertState)> {
        self.states
            .iter()
            .filter(|(_, state)| !state.acknowledged)
            .map(|(k, v)| (*k, v))
            .collect()
    }

    /// Fired alerts, most recent first
    pub fn history(&self) -> impl Iterator<Item = &AlertEvent> {
        self.history.iter()
    }

    /// Get hourly alert count
    pub fn hourly_count(&self) -> usize {
        self.hourly_count
    }

    /// Clear all alert states
    pub fn clear(&mut self) {
        self.states.clear();
        self.history.clear();
        self.hourly_count = 0;
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::with_valid_config(AlertConfig::default())
    }
}

fn describe(cause: DrowsinessAlert) -> &'static str {
    match cause {
        DrowsinessAlert::EyesClosed => "Sustained eye closure detected",
        DrowsinessAlert::Yawning => "Yawning detected",
        DrowsinessAlert::RapidBlinking => "Rapid blinking detected",
        DrowsinessAlert::PhoneUse => "Phone use detected",
        DrowsinessAlert::LookingAway => "Driver looking away from the road",
        DrowsinessAlert::FaceNotVisible => "Face not visible",
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
