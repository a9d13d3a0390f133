use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single daily price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// Validation failures raised while constructing a [`PriceSeries`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("asset identifier must not be blank")]
    BlankAsset,

    #[error("{asset}: invalid price {price} on {date} (must be finite and positive)")]
    InvalidPrice {
        asset: String,
        date: NaiveDate,
        price: f64,
    },

    #[error("{asset}: dates out of order ({previous} followed by {date})")]
    OutOfOrder {
        asset: String,
        previous: NaiveDate,
        date: NaiveDate,
    },

    #[error("{asset}: duplicate sample for {date}")]
    DuplicateDate { asset: String, date: NaiveDate },
}

/// Validated daily price history for one asset.
///
/// Dates are strictly increasing and every price is finite and positive.
/// An empty series is representable; every volatility computation on it
/// fails with an insufficient-data error instead of producing NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPriceSeries")]
pub struct PriceSeries {
    asset: String,
    points: Vec<PricePoint>,
}

/// Unvalidated wire shape of a [`PriceSeries`].
#[derive(Deserialize)]
struct RawPriceSeries {
    asset: String,
    points: Vec<PricePoint>,
}

impl TryFrom<RawPriceSeries> for PriceSeries {
    type Error = SeriesError;

    fn try_from(raw: RawPriceSeries) -> Result<Self, Self::Error> {
        PriceSeries::new(raw.asset, raw.points)
    }
}

impl PriceSeries {
    /// Build a series, rejecting malformed input.
    pub fn new(asset: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        let asset = asset.into();
        if asset.trim().is_empty() {
            return Err(SeriesError::BlankAsset);
        }

        for (idx, point) in points.iter().enumerate() {
            if !point.price.is_finite() || point.price <= 0.0 {
                return Err(SeriesError::InvalidPrice {
                    asset,
                    date: point.date,
                    price: point.price,
                });
            }

            if idx > 0 {
                let previous = points[idx - 1].date;
                if point.date == previous {
                    return Err(SeriesError::DuplicateDate {
                        asset,
                        date: point.date,
                    });
                }
                if point.date < previous {
                    return Err(SeriesError::OutOfOrder {
                        asset,
                        previous,
                        date: point.date,
                    });
                }
            }
        }

        Ok(Self { asset, points })
    }

    /// Build a series from `(date, price)` pairs.
    pub fn from_pairs(
        asset: impl Into<String>,
        pairs: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Result<Self, SeriesError> {
        let points = pairs
            .into_iter()
            .map(|(date, price)| PricePoint::new(date, price))
            .collect();
        Self::new(asset, points)
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Prices in chronological order.
    pub fn prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.price)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// The most recent `n` samples as a new series.
    pub fn tail(&self, n: usize) -> PriceSeries {
        let start = self.points.len().saturating_sub(n);
        Self {
            asset: self.asset.clone(),
            points: self.points[start..].to_vec(),
        }
    }
}
