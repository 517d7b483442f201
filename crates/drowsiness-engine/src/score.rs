//! Drowsiness score aggregation
//!
//! The score is a per-frame snapshot: the sum of the weights of every signal
//! triggered in this frame, clamped to [0, 100].

use serde::{Deserialize, Serialize};

/// Upper bound of the drowsiness score
pub const MAX_SCORE: u8 = 100;

/// Per-signal score weights
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub eye_closed: u32,
    pub yawn: u32,
    pub blink: u32,
    pub phone: u32,
    pub gaze: u32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            eye_closed: 50,
            yawn: 35,
            blink: 15,
            phone: 20,
            gaze: 10,
        }
    }
}

/// Signals contributing to one frame's score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameEvents {
    pub eye_closed: bool,
    pub yawning: bool,
    pub blinked: bool,
    pub phone_detected: bool,
    pub looking_away: bool,
}

impl FrameEvents {
    pub fn count(&self) -> usize {
        [
            self.eye_closed,
            self.yawning,
            self.blinked,
            self.phone_detected,
            self.looking_away,
        ]
        .iter()
        .filter(|&&e| e)
        .count()
    }
}

/// Combine triggered events into a score in [0, 100]
pub fn aggregate(events: &FrameEvents, weights: &ScoreWeights) -> u8 {
    let contributions = [
        (events.eye_closed, weights.eye_closed),
        (events.yawning, weights.yawn),
        (events.blinked, weights.blink),
        (events.phone_detected, weights.phone),
        (events.looking_away, weights.gaze),
    ];

    let total = contributions
        .iter()
        .filter(|(active, _)| *active)
        .fold(0u32, |acc, (_, weight)| acc.saturating_add(*weight));

    total.min(u32::from(MAX_SCORE)) as u8
}
