//! Simple Moving Average (SMA) with a growing warm-up window.
//!
//! Trailing mean of the last `period` prices, inclusive of the current one.
//! Until `period` observations exist the mean covers whatever history is
//! available, so every index of a non-empty series has a value.
//!
//! Each window is averaged on its own, as deviations from its first price,
//! so a window of equal prices yields exactly that price. A running sum
//! would carry rounding error from prices that have already left the window.

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn compute(&self, prices: &[f64]) -> Vec<f64> {
        (0..prices.len())
            .map(|i| {
                let start = (i + 1).saturating_sub(self.period);
                window_mean(&prices[start..=i])
            })
            .collect()
    }
}

fn window_mean(window: &[f64]) -> f64 {
    let anchor = window[0];
    let offset: f64 = window.iter().map(|&p| p - anchor).sum();
    anchor + offset / window.len() as f64
}
