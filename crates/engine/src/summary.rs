//! Aggregate view of a risk report: totals, average score and tier breakdown.

use serde::Serialize;

use crate::classifier::RiskTier;
use crate::report::RiskScoreEntry;

/// Assets falling in one tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierBreakdown {
    pub tier: RiskTier,
    pub count: usize,
    pub assets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSummary {
    pub total_assets: usize,
    /// `None` only for an empty table
    pub average_risk_score: Option<f64>,
    /// Highest tier first
    pub tiers: Vec<TierBreakdown>,
    pub riskiest_asset: Option<String>,
    pub calmest_asset: Option<String>,
}

impl RiskSummary {
    pub fn from_entries(entries: &[RiskScoreEntry]) -> Self {
        let total_assets = entries.len();
        let average_risk_score = (total_assets > 0)
            .then(|| entries.iter().map(|e| e.risk_score).sum::<f64>() / total_assets as f64);

        let tiers = RiskTier::ALL
            .iter()
            .rev()
            .map(|tier| {
                let assets: Vec<String> = entries
                    .iter()
                    .filter(|e| e.risk_tier == *tier)
                    .map(|e| e.asset.clone())
                    .collect();
                TierBreakdown {
                    tier: *tier,
                    count: assets.len(),
                    assets,
                }
            })
            .collect();

        // First occurrence wins on ties
        let riskiest_asset = entries
            .iter()
            .reduce(|best, e| if e.risk_score > best.risk_score { e } else { best })
            .map(|e| e.asset.clone());
        let calmest_asset = entries
            .iter()
            .reduce(|best, e| if e.risk_score < best.risk_score { e } else { best })
            .map(|e| e.asset.clone());

        Self {
            total_assets,
            average_risk_score,
            tiers,
            riskiest_asset,
            calmest_asset,
        }
    }

    pub fn count(&self, tier: RiskTier) -> usize {
        self.tiers
            .iter()
            .find(|b| b.tier == tier)
            .map(|b| b.count)
            .unwrap_or(0)
    }
}
