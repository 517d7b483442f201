//! Moving-average smoothing of per-frame ratios

use std::collections::VecDeque;

/// Bounded trailing history of raw ratio values
///
/// Holds at most `window` values; pushing beyond capacity evicts the oldest.
#[derive(Debug, Clone)]
pub struct RatioHistory {
    values: VecDeque<f64>,
    window: usize,
}

impl RatioHistory {
    /// Create an empty history. A zero window is treated as one.
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            values: VecDeque::with_capacity(window),
            window,
        }
    }

    /// Push a raw value and return the mean of the retained values
    pub fn smooth(&mut self, value: f64) -> f64 {
        if self.values.len() >= self.window {
            self.values.pop_front();
        }
        self.values.push_back(value);
        self.mean().unwrap_or(value)
    }

    /// Mean of the retained values
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.values.iter()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moving_average() {
        let mut history = RatioHistory::new(3);

        assert_eq!(history.smooth(10.0), 10.0);
        assert_eq!(history.smooth(20.0), 15.0);
        assert_eq!(history.smooth(30.0), 20.0);

        // Window is full, oldest value should be dropped
        assert_eq!(history.smooth(40.0), 30.0);
        assert_eq!(history.len(), 3);
        assert_eq!(history.iter().copied().collect::<Vec<_>>(), vec![20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_zero_window_keeps_latest() {
        let mut history = RatioHistory::new(0);
        assert_eq!(history.window(), 1);
        history.smooth(0.3);
        assert_eq!(history.smooth(0.1), 0.1);
    }

    #[test]
    fn test_clear() {
        let mut history = RatioHistory::new(5);
        history.smooth(0.2);
        history.clear();
        assert!(history.is_empty());
        assert!(history.mean().is_none());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn length_never_exceeds_window(
                window in 1usize..12,
                values in prop::collection::vec(0.0f64..1.0, 0..40),
            ) {
                let mut history = RatioHistory::new(window);
                for v in values {
                    history.smooth(v);
                    prop_assert!(history.len() <= window);
                }
            }

            #[test]
            fn output_is_mean_of_last_window(
                window in 1usize..12,
                values in prop::collection::vec(0.0f64..1.0, 1..40),
            ) {
                let mut history = RatioHistory::new(window);
                let mut out = 0.0;
                for &v in &values {
                    out = history.smooth(v);
                }
                let tail = &values[values.len().saturating_sub(window)..];
                let expected = tail.iter().sum::<f64>() / tail.len() as f64;
                prop_assert!((out - expected).abs() < 1e-9);

                let min = tail.iter().copied().fold(f64::INFINITY, f64::min);
                let max = tail.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                prop_assert!(out >= min - 1e-12 && out <= max + 1e-12);
            }
        }
    }
}
