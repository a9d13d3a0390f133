//! Batch orchestration — the engine entry point.
//!
//! For each asset: volatility → score. Assets without enough history are
//! skipped and recorded; once every asset is scored the classifier assigns
//! tiers across the whole batch.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use cryptorisk_common::config::RiskParameters;
use cryptorisk_common::types::PriceSeries;

use crate::classifier::{PercentileCutoffs, RiskClassifier};
use crate::error::EngineError;
use crate::report::RiskReport;
use crate::scorer::{RiskScorer, ScoreWeights, ScoredAsset};
use crate::volatility::VolatilityCalculator;

/// An asset left out of the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedAsset {
    pub asset: String,
    pub reason: String,
}

/// Runs the full scoring and classification pipeline over a batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskAnalyzer {
    calculator: VolatilityCalculator,
    scorer: RiskScorer,
    classifier: RiskClassifier,
}

impl RiskAnalyzer {
    /// Build an analyzer from configured parameters, validating each of them.
    pub fn new(params: &RiskParameters) -> Result<Self, EngineError> {
        Ok(Self {
            calculator: VolatilityCalculator::new(params.rolling_window)?,
            scorer: RiskScorer::new(ScoreWeights::new(
                params.overall_weight,
                params.rolling_weight,
            )?),
            classifier: RiskClassifier::new(PercentileCutoffs::new(
                params.low_percentile,
                params.high_percentile,
            )?),
        })
    }

    pub fn calculator(&self) -> &VolatilityCalculator {
        &self.calculator
    }

    /// Volatility and score of a single asset.
    pub fn score_asset(&self, series: &PriceSeries) -> Result<ScoredAsset, EngineError> {
        let metrics = self.calculator.compute(series)?;
        Ok(self.scorer.score_asset(series.asset(), metrics))
    }

    /// Score and classify a batch. Output rows follow the input order.
    pub fn run(&self, batch: &[PriceSeries]) -> Result<RiskReport, EngineError> {
        let mut seen = HashSet::new();
        if let Some(dup) = batch.iter().find(|s| !seen.insert(s.asset())) {
            return Err(EngineError::DuplicateAsset(dup.asset().to_string()));
        }

        let mut scored = Vec::with_capacity(batch.len());
        let mut skipped = Vec::new();

        for series in batch {
            match self.score_asset(series) {
                Ok(asset) => {
                    tracing::debug!(
                        asset = %asset.asset,
                        overall = asset.metrics.overall_volatility,
                        rolling = asset.metrics.rolling_volatility,
                        score = asset.risk_score,
                        "Asset scored"
                    );
                    scored.push(asset);
                }
                Err(err) if err.is_per_asset() => {
                    tracing::warn!(
                        asset = series.asset(),
                        samples = series.len(),
                        reason = %err,
                        "Skipping asset"
                    );
                    skipped.push(SkippedAsset {
                        asset: series.asset().to_string(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        if scored.is_empty() {
            return Err(EngineError::NoUsableData { skipped });
        }

        let classification = self.classifier.classify(scored)?;

        tracing::info!(
            assets = classification.entries.len(),
            skipped = skipped.len(),
            low_cut = classification.thresholds.low,
            high_cut = classification.thresholds.high,
            "Risk classification completed"
        );

        Ok(RiskReport {
            entries: classification.entries,
            skipped,
            thresholds: classification.thresholds,
        })
    }
}

/// Run the analysis with the default parameters (window 7, weights 0.6/0.4,
/// cut points at the 30th and 70th percentile).
pub fn run_risk_analysis(batch: &[PriceSeries]) -> Result<RiskReport, EngineError> {
    RiskAnalyzer::default().run(batch)
}
