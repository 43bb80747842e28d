//! Moving-average crossover signal generation.
//!
//! Long (1) while the short mean is strictly above the long mean, flat (0)
//! otherwise. The first `short_window` observations are always flat, even
//! though both means are already defined there; the warm-up rule takes
//! precedence over the comparison.

use crate::domain::{PricePoint, SignalPoint};
use crate::indicators::Sma;
use crate::params::{validate_windows, ParamError};

/// Compute one `SignalPoint` per price observation.
///
/// `prices` must belong to a single ticker and be sorted by date. The output
/// has the same length and the same `(ticker, date)` keys, in order.
pub fn generate_signals(
    prices: &[PricePoint],
    short_window: usize,
    long_window: usize,
) -> Result<Vec<SignalPoint>, ParamError> {
    validate_windows(short_window, long_window)?;

    let closes: Vec<f64> = prices.iter().map(|p| p.price).collect();
    let short = Sma::new(short_window).compute(&closes);
    let long = Sma::new(long_window).compute(&closes);

    let mut prev_signal = 0u8;
    let signals = prices
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let signal = u8::from(i >= short_window && short[i] > long[i]);
            let position = if i == 0 {
                0
            } else {
                signal as i8 - prev_signal as i8
            };
            prev_signal = signal;

            SignalPoint {
                ticker: p.ticker.clone(),
                date: p.date,
                short_ma: Some(short[i]),
                long_ma: Some(long[i]),
                signal,
                position,
            }
        })
        .collect();

    Ok(signals)
}
