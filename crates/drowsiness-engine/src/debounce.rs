//! Consecutive-frame debouncing of threshold crossings

use serde::{Deserialize, Serialize};

/// Debouncer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DebounceState {
    /// streak == 0
    #[default]
    Idle,
    /// 0 < streak < required
    Accumulating,
    /// streak >= required
    Triggered,
}

/// Streak counter that triggers after `required` consecutive positive
/// observations and resets to zero on the first negative one
#[derive(Debug, Clone)]
pub struct Debouncer {
    required: u32,
    streak: u32,
}

impl Debouncer {
    /// A `required` of zero is treated as one
    pub fn new(required: u32) -> Self {
        Self {
            required: required.max(1),
            streak: 0,
        }
    }

    /// Feed one frame's condition, returns whether the signal is triggered
    pub fn observe(&mut self, condition: bool) -> bool {
        if condition {
            self.streak = self.streak.saturating_add(1);
        } else {
            self.streak = 0;
        }
        self.is_triggered()
    }

    pub fn is_triggered(&self) -> bool {
        self.streak >= self.required
    }

    pub fn state(&self) -> DebounceState {
        match self.streak {
            0 => DebounceState::Idle,
            s if s < self.required => DebounceState::Accumulating,
            _ => DebounceState::Triggered,
        }
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn required(&self) -> u32 {
        self.required
    }

    pub fn reset(&mut self) {
        self.streak = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triggers_on_nth_frame() {
        let mut debouncer = Debouncer::new(3);
        assert!(!debouncer.observe(true));
        assert_eq!(debouncer.state(), DebounceState::Accumulating);
        assert!(!debouncer.observe(true));
        assert!(debouncer.observe(true));
        assert_eq!(debouncer.state(), DebounceState::Triggered);
        assert!(debouncer.observe(true));
        assert_eq!(debouncer.streak(), 4);
    }

    #[test]
    fn test_immediate_reset() {
        let mut debouncer = Debouncer::new(2);
        debouncer.observe(true);
        debouncer.observe(true);
        assert!(debouncer.is_triggered());

        assert!(!debouncer.observe(false));
        assert_eq!(debouncer.streak(), 0);
        assert_eq!(debouncer.state(), DebounceState::Idle);

        // Must accumulate again from the first frame
        assert!(!debouncer.observe(true));
        assert!(debouncer.observe(true));
    }

    #[test]
    fn test_single_frame_requirement() {
        let mut debouncer = Debouncer::new(0);
        assert_eq!(debouncer.required(), 1);
        assert!(debouncer.observe(true));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn streak_tracks_trailing_run(
                required in 1u32..10,
                observations in prop::collection::vec(any::<bool>(), 0..60),
            ) {
                let mut debouncer = Debouncer::new(required);
                let mut run = 0u32;
                for obs in observations {
                    let triggered = debouncer.observe(obs);
                    run = if obs { run + 1 } else { 0 };
                    prop_assert_eq!(debouncer.streak(), run);
                    prop_assert_eq!(triggered, run >= required);
                    prop_assert_eq!(debouncer.state() == DebounceState::Triggered, triggered);
                }
            }
        }
    }
}
