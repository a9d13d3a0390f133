use std::fmt;

use thiserror::Error;

use cryptorisk_common::error::AppError;

use crate::analysis::SkippedAsset;

/// Which volatility measure could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityMeasure {
    Overall,
    Rolling,
}

impl fmt::Display for VolatilityMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolatilityMeasure::Overall => write!(f, "overall"),
            VolatilityMeasure::Rolling => write!(f, "rolling"),
        }
    }
}

/// Errors raised by the risk-scoring engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Recoverable per asset: the batch skips the asset and carries on.
    #[error(
        "{asset}: not enough data for {measure} volatility ({available} daily returns, need {required})"
    )]
    InsufficientData {
        asset: String,
        measure: VolatilityMeasure,
        required: usize,
        available: usize,
    },

    /// Recoverable per asset: returns so extreme the measure overflows.
    #[error("{asset}: {measure} volatility is not a finite number")]
    NonFiniteVolatility {
        asset: String,
        measure: VolatilityMeasure,
    },

    #[error("rolling window must be at least 2 returns, got {0}")]
    InvalidWindow(usize),

    #[error("invalid score weights: {0}")]
    InvalidWeights(String),

    #[error("invalid percentile cutoffs: {0}")]
    InvalidCutoffs(String),

    #[error("asset {0} has a non-finite risk score")]
    NonFiniteScore(String),

    #[error("cannot classify an empty batch")]
    EmptyBatch,

    #[error("asset {0} appears more than once in the batch")]
    DuplicateAsset(String),

    #[error("no usable data: none of the {} assets could be scored", .skipped.len())]
    NoUsableData { skipped: Vec<SkippedAsset> },
}

impl EngineError {
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, EngineError::InsufficientData { .. })
    }

    /// Errors that disqualify one asset without failing the batch.
    pub fn is_per_asset(&self) -> bool {
        matches!(
            self,
            EngineError::InsufficientData { .. } | EngineError::NonFiniteVolatility { .. }
        )
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InsufficientData { .. }
            | EngineError::NonFiniteVolatility { .. }
            | EngineError::EmptyBatch
            | EngineError::NoUsableData { .. } => AppError::NoUsableData(err.to_string()),
            EngineError::InvalidWindow(_)
            | EngineError::InvalidWeights(_)
            | EngineError::InvalidCutoffs(_) => AppError::Config(err.to_string()),
            EngineError::DuplicateAsset(_) => AppError::Validation(err.to_string()),
            EngineError::NonFiniteScore(_) => AppError::Internal(err.to_string()),
        }
    }
}
