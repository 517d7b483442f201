//! Session statistics

use crate::manager::{AlertError, AlertEvent};
use drowsiness_engine::FrameAnalysis;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Default weight of the newest score in the display smoothing
pub const DEFAULT_DISPLAY_SMOOTHING: f64 = 0.3;

/// Snapshot of a monitoring session
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub frames: u64,
    pub tracked_frames: u64,
    pub total_alerts: u64,
    /// Mean of the non-zero scores seen so far
    pub average_score: f64,
    pub peak_score: u8,
    /// Exponentially smoothed score for display
    pub smoothed_score: f64,
    /// Time from the first observed frame to the latest one
    pub duration_ms: u64,
}

/// Running statistics over a stream of frame analyses
#[derive(Debug, Clone)]
pub struct SessionTracker {
    stats: SessionStats,
    nonzero_sum: u64,
    nonzero_frames: u64,
    smoothing: f64,
    started: Option<Instant>,
}

impl SessionTracker {
    pub fn new(smoothing: f64) -> Result<Self, AlertError> {
        if !(smoothing > 0.0 && smoothing <= 1.0) {
            return Err(AlertError::InvalidSmoothing(smoothing));
        }
        Ok(Self {
            stats: SessionStats::default(),
            nonzero_sum: 0,
            nonzero_frames: 0,
            smoothing,
            started: None,
        })
    }

    pub fn observe(&mut self, analysis: &FrameAnalysis, alert: Option<&AlertEvent>) {
        let started = *self.started.get_or_insert_with(Instant::now);
        let stats = &mut self.stats;
        stats.frames += 1;
        stats.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        if analysis.face_detected() {
            stats.tracked_frames += 1;
        }
        if alert.is_some() {
            stats.total_alerts += 1;
        }

        let score = analysis.score;
        if score > 0 {
            self.nonzero_sum += u64::from(score);
            self.nonzero_frames += 1;
            stats.average_score = self.nonzero_sum as f64 / self.nonzero_frames as f64;
        }
        stats.peak_score = stats.peak_score.max(score);
        stats.smoothed_score += (f64::from(score) - stats.smoothed_score) * self.smoothing;
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Wall time since the first observed frame, zero before it
    pub fn elapsed(&self) -> Duration {
        self.started.map(|s| s.elapsed()).unwrap_or_default()
    }

    pub fn reset(&mut self) {
        self.stats = SessionStats::default();
        self.nonzero_sum = 0;
        self.nonzero_frames = 0;
        self.started = None;
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self {
            stats: SessionStats::default(),
            nonzero_sum: 0,
            nonzero_frames: 0,
            smoothing: DEFAULT_DISPLAY_SMOOTHING,
            started: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drowsiness_engine::FrameStatus;

    fn frame(score: u8) -> FrameAnalysis {
        FrameAnalysis {
            score,
            ..Default::default()
        }
    }

    #[test]
    fn test_average_ignores_zero_scores() {
        let mut tracker = SessionTracker::default();
        for score in [0, 50, 0, 100] {
            tracker.observe(&frame(score), None);
        }
        let stats = tracker.stats();
        assert_eq!(stats.frames, 4);
        assert_eq!(stats.average_score, 75.0);
        assert_eq!(stats.peak_score, 100);
    }

    #[test]
    fn test_display_smoothing() {
        let mut tracker = SessionTracker::new(0.5).unwrap();
        tracker.observe(&frame(100), None);
        assert_eq!(tracker.stats().smoothed_score, 50.0);
        tracker.observe(&frame(100), None);
        assert_eq!(tracker.stats().smoothed_score, 75.0);
        tracker.observe(&frame(0), None);
        assert_eq!(tracker.stats().smoothed_score, 37.5);
    }

    #[test]
    fn test_counts_tracked_frames() {
        let mut tracker = SessionTracker::default();
        tracker.observe(&frame(0), None);
        tracker.observe(
            &FrameAnalysis::neutral(FrameStatus::FaceNotFound, "No face detected"),
            None,
        );
        assert_eq!(tracker.stats().frames, 2);
        assert_eq!(tracker.stats().tracked_frames, 1);

        tracker.reset();
        assert_eq!(tracker.stats(), &SessionStats::default());
    }

    #[test]
    fn test_duration_starts_at_first_frame() {
        let mut tracker = SessionTracker::default();
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(tracker.elapsed(), Duration::ZERO);

        tracker.observe(&frame(10), None);
        assert!(tracker.stats().duration_ms < 50);

        std::thread::sleep(Duration::from_millis(30));
        tracker.observe(&frame(10), None);
        assert!(tracker.stats().duration_ms >= 30);
        assert!(tracker.elapsed() >= Duration::from_millis(30));

        tracker.reset();
        assert_eq!(tracker.elapsed(), Duration::ZERO);
        assert_eq!(tracker.stats().duration_ms, 0);
    }

    #[test]
    fn test_rejects_bad_smoothing() {
        assert!(SessionTracker::new(0.0).is_err());
        assert!(SessionTracker::new(1.5).is_err());
        assert!(SessionTracker::new(f64::NAN).is_err());
        assert!(SessionTracker::new(1.0).is_ok());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn smoothed_score_stays_in_range(
                smoothing in 0.01f64..=1.0,
                scores in prop::collection::vec(0u8..=100, 1..50),
            ) {
                let mut tracker = SessionTracker::new(smoothing).unwrap();
                for score in scores {
                    tracker.observe(&frame(score), None);
                    let s = tracker.stats().smoothed_score;
                    prop_assert!(s > -1e-9 && s < 100.0 + 1e-9);
                }
            }
        }
    }
}
