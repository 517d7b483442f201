//! Per-subject engine state

use crate::config::{EngineConfig, NoFacePolicy};
use crate::debounce::Debouncer;
use crate::smoothing::RatioHistory;
use std::collections::VecDeque;

/// Everything the engine remembers between frames for one subject
#[derive(Debug, Clone)]
pub struct EngineState {
    /// Raw EAR history for smoothing
    pub ear_history: RatioHistory,

    /// Raw MAR history for smoothing
    pub mar_history: RatioHistory,

    pub eye_closure: Debouncer,

    pub yawn: Debouncer,

    pub blink: Debouncer,

    /// Score of the last tracked frame
    pub last_score: u8,

    /// Consecutive frames where no face was detected
    pub face_absent_frames: u32,

    /// Eye-closed flags of recent tracked frames (for PERCLOS)
    closure_samples: VecDeque<bool>,

    perclos_window: usize,
}

impl EngineState {
    pub fn new(config: &EngineConfig) -> Self {
        let t = &config.thresholds;
        Self {
            ear_history: RatioHistory::new(config.smoothing_window),
            mar_history: RatioHistory::new(config.smoothing_window),
            eye_closure: Debouncer::new(t.ear_consec_frames),
            yawn: Debouncer::new(t.yawn_consec_frames),
            blink: Debouncer::new(t.blink_consec_frames),
            last_score: 0,
            face_absent_frames: 0,
            closure_samples: VecDeque::with_capacity(config.perclos_window.min(1024)),
            perclos_window: config.perclos_window.max(1),
        }
    }

    pub fn eye_closed_streak(&self) -> u32 {
        self.eye_closure.streak()
    }

    pub fn yawn_streak(&self) -> u32 {
        self.yawn.streak()
    }

    pub fn blink_streak(&self) -> u32 {
        self.blink.streak()
    }

    /// Calculate PERCLOS (Percentage of Eye Closure)
    /// Higher PERCLOS indicates drowsiness
    pub fn perclos(&self) -> f64 {
        if self.closure_samples.is_empty() {
            return 0.0;
        }

        let closed = self.closure_samples.iter().filter(|&&c| c).count();
        closed as f64 / self.closure_samples.len() as f64
    }

    /// Add an eye-closure sample for PERCLOS
    pub fn add_closure_sample(&mut self, closed: bool) {
        if self.closure_samples.len() >= self.perclos_window {
            self.closure_samples.pop_front();
        }
        self.closure_samples.push_back(closed);
    }

    pub fn reset_counters(&mut self) {
        self.eye_closure.reset();
        self.yawn.reset();
        self.blink.reset();
    }

    /// Apply the no-face policy
    pub fn on_face_lost(&mut self, policy: NoFacePolicy) {
        self.reset_counters();
        self.face_absent_frames = self.face_absent_frames.saturating_add(1);

        if policy == NoFacePolicy::ResetAll {
            self.ear_history.clear();
            self.mar_history.clear();
            self.closure_samples.clear();
            self.last_score = 0;
        }
    }

    /// Reset state (on subject change)
    pub fn reset(&mut self) {
        self.reset_counters();
        self.ear_history.clear();
        self.mar_history.clear();
        self.closure_samples.clear();
        self.last_score = 0;
        self.face_absent_frames = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perclos_window() {
        let config = EngineConfig {
            perclos_window: 4,
            ..Default::default()
        };
        let mut state = EngineState::new(&config);
        assert_eq!(state.perclos(), 0.0);

        for closed in [true, true, false, false] {
            state.add_closure_sample(closed);
        }
        assert_eq!(state.perclos(), 0.5);

        // Oldest samples fall out
        state.add_closure_sample(false);
        state.add_closure_sample(false);
        assert_eq!(state.perclos(), 0.0);
    }

    #[test]
    fn test_face_lost_reset_counters_keeps_history() {
        let mut state = EngineState::new(&EngineConfig::default());
        state.ear_history.smooth(0.1);
        state.eye_closure.observe(true);
        state.yawn.observe(true);
        state.blink.observe(true);

        state.on_face_lost(NoFacePolicy::ResetCounters);

        assert_eq!(state.eye_closed_streak(), 0);
        assert_eq!(state.yawn_streak(), 0);
        assert_eq!(state.blink_streak(), 0);
        assert_eq!(state.ear_history.len(), 1);
        assert_eq!(state.face_absent_frames, 1);
    }

    #[test]
    fn test_face_lost_reset_all() {
        let mut state = EngineState::new(&EngineConfig::default());
        state.ear_history.smooth(0.1);
        state.mar_history.smooth(0.5);
        state.add_closure_sample(true);
        state.last_score = 50;

        state.on_face_lost(NoFacePolicy::ResetAll);

        assert!(state.ear_history.is_empty());
        assert!(state.mar_history.is_empty());
        assert_eq!(state.perclos(), 0.0);
        assert_eq!(state.last_score, 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut state = EngineState::new(&EngineConfig::default());
        state.ear_history.smooth(0.1);
        state.eye_closure.observe(true);
        state.yawn.observe(true);
        state.add_closure_sample(true);
        state.last_score = 65;
        state.face_absent_frames = 4;

        state.reset();

        assert!(state.ear_history.is_empty());
        assert_eq!(state.eye_closed_streak(), 0);
        assert_eq!(state.yawn_streak(), 0);
        assert_eq!(state.perclos(), 0.0);
        assert_eq!(state.last_score, 0);
        assert_eq!(state.face_absent_frames, 0);
    }
}
