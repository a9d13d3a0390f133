//! Daily aggregation of intraday market-chart samples.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};

use cryptorisk_common::types::{PricePoint, PriceSeries};

use crate::coingecko::{FetchError, RawPricePoint};

/// Collapse raw samples into one sample per UTC calendar date (mean price).
///
/// Input order does not matter; the result is sorted by date.
pub fn daily_series(asset: &str, raw: &[RawPricePoint]) -> Result<PriceSeries, FetchError> {
    let mut days: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();

    for sample in raw {
        let date = DateTime::from_timestamp_millis(sample.timestamp_ms)
            .ok_or_else(|| {
                FetchError::Parse(format!("timestamp out of range: {}", sample.timestamp_ms))
            })?
            .date_naive();

        let slot = days.entry(date).or_insert((0.0, 0));
        slot.0 += sample.price;
        slot.1 += 1;
    }

    let points = days
        .into_iter()
        .map(|(date, (sum, count))| PricePoint::new(date, sum / count as f64))
        .collect();

    Ok(PriceSeries::new(asset, points)?)
}
