//! Risk scorer — weighted combination of overall and rolling volatility.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::volatility::VolatilityMetrics;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Weights of the two volatility measures. Always non-negative and summing to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreWeights {
    overall: f64,
    rolling: f64,
}

impl ScoreWeights {
    pub fn new(overall: f64, rolling: f64) -> Result<Self, EngineError> {
        if !overall.is_finite() || !rolling.is_finite() || overall < 0.0 || rolling < 0.0 {
            return Err(EngineError::InvalidWeights(format!(
                "weights must be finite and non-negative (overall={}, rolling={})",
                overall, rolling
            )));
        }
        if ((overall + rolling) - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(EngineError::InvalidWeights(format!(
                "weights must sum to 1.0 (overall={}, rolling={})",
                overall, rolling
            )));
        }
        Ok(Self { overall, rolling })
    }

    pub fn overall(&self) -> f64 {
        self.overall
    }

    pub fn rolling(&self) -> f64 {
        self.rolling
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            overall: 0.6,
            rolling: 0.4,
        }
    }
}

/// An asset with its volatility metrics and risk score, not yet tiered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAsset {
    pub asset: String,
    pub metrics: VolatilityMetrics,
    pub risk_score: f64,
}

/// Combines volatility metrics into a single risk score.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskScorer {
    weights: ScoreWeights,
}

impl RiskScorer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }

    pub fn score(&self, metrics: &VolatilityMetrics) -> f64 {
        self.weights.overall * metrics.overall_volatility
            + self.weights.rolling * metrics.rolling_volatility
    }

    pub fn score_asset(&self, asset: impl Into<String>, metrics: VolatilityMetrics) -> ScoredAsset {
        ScoredAsset {
            asset: asset.into(),
            risk_score: self.score(&metrics),
            metrics,
        }
    }
}
