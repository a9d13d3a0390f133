//! Risk-scoring engine.
//!
//! Turns validated daily price series into per-asset volatility metrics, a
//! weighted risk score and a batch-relative risk tier.

pub mod analysis;
pub mod classifier;
pub mod error;
pub mod report;
pub mod scorer;
pub mod summary;
pub mod trend;
pub mod volatility;

pub use analysis::{RiskAnalyzer, SkippedAsset, run_risk_analysis};
pub use classifier::{RiskClassifier, RiskTier, TierThresholds};
pub use error::EngineError;
pub use report::{RiskReport, RiskScoreEntry};
pub use scorer::{RiskScorer, ScoreWeights, ScoredAsset};
pub use volatility::{VolatilityCalculator, VolatilityMetrics, compute_volatility};
