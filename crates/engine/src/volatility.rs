//! Volatility calculator — daily returns, overall and rolling volatility.
//!
//! Both measures use the sample standard deviation (N−1 denominator) and are
//! expressed in percent. A series too short for a measure yields
//! `EngineError::InsufficientData` rather than a NaN or a zero.

use serde::{Deserialize, Serialize};

use cryptorisk_common::types::PriceSeries;

use crate::error::{EngineError, VolatilityMeasure};

/// Default rolling window, in daily returns.
pub const DEFAULT_WINDOW: usize = 7;

/// Minimum number of returns for a sample standard deviation.
const MIN_RETURNS_FOR_STD: usize = 2;

/// Volatility statistics of one asset, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityMetrics {
    /// Standard deviation of all daily returns
    pub overall_volatility: f64,
    /// Mean of the per-window standard deviations
    pub rolling_volatility: f64,
}

/// Fractional change between each pair of consecutive prices.
///
/// A series of length `n` yields `n - 1` returns (none for a single sample).
pub fn daily_returns(series: &PriceSeries) -> Vec<f64> {
    series
        .points()
        .windows(2)
        .map(|pair| (pair[1].price - pair[0].price) / pair[0].price)
        .collect()
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation, `None` for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < MIN_RETURNS_FOR_STD {
        return None;
    }
    let avg = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Sample standard deviation of every full window of `window` consecutive
/// returns, in window-ending order. Empty when fewer than `window` returns exist.
pub fn rolling_std_devs(returns: &[f64], window: usize) -> Vec<f64> {
    if window < MIN_RETURNS_FOR_STD {
        return Vec::new();
    }
    returns.windows(window).filter_map(sample_std_dev).collect()
}

/// Computes [`VolatilityMetrics`] with a fixed rolling window.
#[derive(Debug, Clone, Copy)]
pub struct VolatilityCalculator {
    window: usize,
}

impl VolatilityCalculator {
    pub fn new(window: usize) -> Result<Self, EngineError> {
        if window < MIN_RETURNS_FOR_STD {
            return Err(EngineError::InvalidWindow(window));
        }
        Ok(Self { window })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Overall volatility (%) of the whole return sequence.
    pub fn overall(&self, series: &PriceSeries) -> Result<f64, EngineError> {
        overall_from_returns(series.asset(), &daily_returns(series))
    }

    /// Average rolling volatility (%) across all full windows.
    pub fn rolling(&self, series: &PriceSeries) -> Result<f64, EngineError> {
        rolling_from_returns(series.asset(), &daily_returns(series), self.window)
    }

    /// Compute both measures. Fails if either one is undefined.
    pub fn compute(&self, series: &PriceSeries) -> Result<VolatilityMetrics, EngineError> {
        let returns = daily_returns(series);
        let overall_volatility = overall_from_returns(series.asset(), &returns)?;
        let rolling_volatility = rolling_from_returns(series.asset(), &returns, self.window)?;

        Ok(VolatilityMetrics {
            overall_volatility,
            rolling_volatility,
        })
    }
}

impl Default for VolatilityCalculator {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
        }
    }
}

/// Compute the volatility metrics of `series` with the given rolling window.
pub fn compute_volatility(
    series: &PriceSeries,
    window: usize,
) -> Result<VolatilityMetrics, EngineError> {
    VolatilityCalculator::new(window)?.compute(series)
}

pub(crate) fn overall_from_returns(asset: &str, returns: &[f64]) -> Result<f64, EngineError> {
    let overall = sample_std_dev(returns)
        .map(|std| std * 100.0)
        .ok_or_else(|| EngineError::InsufficientData {
            asset: asset.to_string(),
            measure: VolatilityMeasure::Overall,
            required: MIN_RETURNS_FOR_STD,
            available: returns.len(),
        })?;
    ensure_finite(asset, VolatilityMeasure::Overall, overall)
}

/// Valid prices can still overflow a return (1e300 after 1e-300).
pub(crate) fn ensure_finite(
    asset: &str,
    measure: VolatilityMeasure,
    value: f64,
) -> Result<f64, EngineError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::NonFiniteVolatility {
            asset: asset.to_string(),
            measure,
        })
    }
}

fn rolling_from_returns(asset: &str, returns: &[f64], window: usize) -> Result<f64, EngineError> {
    let windows: Vec<f64> = rolling_std_devs(returns, window)
        .into_iter()
        .map(|std| std * 100.0)
        .collect();

    let rolling = mean(&windows).ok_or_else(|| EngineError::InsufficientData {
        asset: asset.to_string(),
        measure: VolatilityMeasure::Rolling,
        required: window,
        available: returns.len(),
    })?;
    ensure_finite(asset, VolatilityMeasure::Rolling, rolling)
}
