//! Per-asset trend and risk–return statistics.
//!
//! These are single-asset views; unlike tiers they do not depend on the batch.

use chrono::NaiveDate;
use serde::Serialize;

use cryptorisk_common::types::PriceSeries;

use crate::error::{EngineError, VolatilityMeasure};
use crate::volatility::{
    daily_returns, ensure_finite, mean, overall_from_returns, sample_std_dev,
};

/// Default rolling window for short trend views, in daily returns.
pub const DEFAULT_TREND_WINDOW: usize = 3;

/// One day of a price/volatility trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub price: f64,
    /// Return from the previous day, percent
    pub daily_return: Option<f64>,
    /// Std dev of the `window` returns ending on this day, percent
    pub rolling_volatility: Option<f64>,
}

/// Daily price with its trailing rolling volatility.
///
/// Day `i` carries a rolling value once `window` returns end on or before it,
/// i.e. from index `window` onward.
pub fn volatility_trend(
    series: &PriceSeries,
    window: usize,
) -> Result<Vec<TrendPoint>, EngineError> {
    if window < 2 {
        return Err(EngineError::InvalidWindow(window));
    }

    let returns = daily_returns(series);
    let points = series
        .points()
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let daily_return = i.checked_sub(1).map(|j| returns[j] * 100.0);
            let rolling_volatility = if i >= window {
                sample_std_dev(&returns[i - window..i]).map(|std| std * 100.0)
            } else {
                None
            };
            TrendPoint {
                date: point.date,
                price: point.price,
                daily_return,
                rolling_volatility,
            }
        })
        .collect();

    Ok(points)
}

/// Mean daily return against overall volatility for one asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReturnPoint {
    pub asset: String,
    /// Mean daily return, percent
    pub average_return: f64,
    /// Std dev of daily returns, percent
    pub volatility: f64,
}

pub fn risk_return(series: &PriceSeries) -> Result<RiskReturnPoint, EngineError> {
    let returns = daily_returns(series);
    let volatility = overall_from_returns(series.asset(), &returns)?;
    let average_return = mean(&returns)
        .map(|m| m * 100.0)
        .ok_or_else(|| EngineError::InsufficientData {
            asset: series.asset().to_string(),
            measure: VolatilityMeasure::Overall,
            required: 2,
            available: returns.len(),
        })?;
    let average_return =
        ensure_finite(series.asset(), VolatilityMeasure::Overall, average_return)?;

    Ok(RiskReturnPoint {
        asset: series.asset().to_string(),
        average_return,
        volatility,
    })
}
