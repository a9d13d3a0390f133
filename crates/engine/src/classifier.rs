//! Risk classifier — batch-relative percentile tiers.
//!
//! Cut points are recomputed from whichever assets are in the batch, so adding
//! or removing one asset can move every other asset between tiers.
//!
//! Tier assignment:
//! - `score <= low cut`             → Stable
//! - `low cut < score <= high cut`  → Alert
//! - `score > high cut`             → Extreme

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::EngineError;
use crate::report::RiskScoreEntry;
use crate::scorer::ScoredAsset;

/// Discrete risk tier of an asset relative to its batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskTier {
    Stable,
    Alert,
    Extreme,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [RiskTier::Stable, RiskTier::Alert, RiskTier::Extreme];
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTier::Stable => write!(f, "Stable"),
            RiskTier::Alert => write!(f, "Alert"),
            RiskTier::Extreme => write!(f, "Extreme"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown risk tier: {0}")]
pub struct UnknownTier(pub String);

impl FromStr for RiskTier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stable" => Ok(RiskTier::Stable),
            "alert" => Ok(RiskTier::Alert),
            "extreme" => Ok(RiskTier::Extreme),
            _ => Err(UnknownTier(s.to_string())),
        }
    }
}

/// Percentile levels (fractions in `[0, 1]`) used as tier cut points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentileCutoffs {
    low: f64,
    high: f64,
}

impl PercentileCutoffs {
    pub fn new(low: f64, high: f64) -> Result<Self, EngineError> {
        let in_range = |p: f64| p.is_finite() && (0.0..=1.0).contains(&p);
        if !in_range(low) || !in_range(high) || low > high {
            return Err(EngineError::InvalidCutoffs(format!(
                "expected 0 <= low <= high <= 1, got low={}, high={}",
                low, high
            )));
        }
        Ok(Self { low, high })
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }
}

impl Default for PercentileCutoffs {
    fn default() -> Self {
        Self {
            low: 0.30,
            high: 0.70,
        }
    }
}

/// Score cut points computed for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    /// Scores at or below this are Stable
    pub low: f64,
    /// Scores above this are Extreme
    pub high: f64,
}

impl TierThresholds {
    /// Low boundary is checked first, so `low == high` puts ties in Stable.
    pub fn tier_for(&self, score: f64) -> RiskTier {
        if score <= self.low {
            RiskTier::Stable
        } else if score <= self.high {
            RiskTier::Alert
        } else {
            RiskTier::Extreme
        }
    }
}

/// Percentile of an ascending slice with linear interpolation between the
/// closest ranks (`rank = p * (n - 1)`). `None` for an empty slice.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    if sorted.len() == 1 {
        return Some(sorted[0]);
    }

    let p = p.clamp(0.0, 1.0);
    let n = sorted.len();
    let rank = p * (n - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = (lower_idx + 1).min(n - 1);
    let fraction = rank - lower_idx as f64;

    Some(sorted[lower_idx] + (sorted[upper_idx] - sorted[lower_idx]) * fraction)
}

/// Tier assignment for a fully scored batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub entries: Vec<RiskScoreEntry>,
    pub thresholds: TierThresholds,
}

/// Assigns batch-relative risk tiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskClassifier {
    cutoffs: PercentileCutoffs,
}

impl RiskClassifier {
    pub fn new(cutoffs: PercentileCutoffs) -> Self {
        Self { cutoffs }
    }

    pub fn cutoffs(&self) -> PercentileCutoffs {
        self.cutoffs
    }

    /// Compute the cut points of a score distribution.
    pub fn thresholds(&self, scores: &[f64]) -> Result<TierThresholds, EngineError> {
        let mut sorted = scores.to_vec();
        sorted.sort_by(f64::total_cmp);

        let low = percentile(&sorted, self.cutoffs.low).ok_or(EngineError::EmptyBatch)?;
        let high = percentile(&sorted, self.cutoffs.high).ok_or(EngineError::EmptyBatch)?;
        Ok(TierThresholds { low, high })
    }

    /// Attach a tier to every scored asset, preserving input order.
    ///
    /// Must run only once the whole batch is scored.
    pub fn classify(&self, scored: Vec<ScoredAsset>) -> Result<Classification, EngineError> {
        // A NaN would spread into both cut points and tier every asset Extreme
        if let Some(bad) = scored.iter().find(|s| !s.risk_score.is_finite()) {
            return Err(EngineError::NonFiniteScore(bad.asset.clone()));
        }

        let scores: Vec<f64> = scored.iter().map(|s| s.risk_score).collect();
        let thresholds = self.thresholds(&scores)?;

        let entries = scored
            .into_iter()
            .map(|s| RiskScoreEntry {
                risk_tier: thresholds.tier_for(s.risk_score),
                asset: s.asset,
                overall_volatility: s.metrics.overall_volatility,
                rolling_volatility: s.metrics.rolling_volatility,
                risk_score: s.risk_score,
            })
            .collect();

        Ok(Classification {
            entries,
            thresholds,
        })
    }
}
