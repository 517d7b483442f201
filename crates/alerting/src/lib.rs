//! Alerting System
//!
//! Turns per-frame drowsiness scores into deduplicated, throttled alerts and
//! keeps running session statistics.

mod manager;
mod session;

pub use manager::{AlertConfig, AlertError, AlertEvent, AlertManager, AlertState, Severity};
pub use session::{SessionStats, SessionTracker};
