//! Risk report and its flat CSV table form.
//!
//! Table columns, one row per asset in processing order:
//! `Coin, Overall Volatility (%), Avg Rolling Volatility (%), Risk Score, Risk Level`.
//! Numeric columns are rounded to two decimal places when written.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use cryptorisk_common::error::AppError;

use crate::analysis::SkippedAsset;
use crate::classifier::{RiskTier, TierThresholds};

/// Final per-asset row of a risk run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScoreEntry {
    pub asset: String,
    pub overall_volatility: f64,
    pub rolling_volatility: f64,
    pub risk_score: f64,
    pub risk_tier: RiskTier,
}

/// Output of one risk run. Owned by the caller; nothing is retained by the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    /// Classified assets, in input order
    pub entries: Vec<RiskScoreEntry>,
    /// Assets excluded from the batch and why
    pub skipped: Vec<SkippedAsset>,
    /// Cut points used to assign tiers
    pub thresholds: TierThresholds,
}

impl RiskReport {
    pub fn entry(&self, asset: &str) -> Option<&RiskScoreEntry> {
        self.entries
            .iter()
            .find(|e| e.asset.eq_ignore_ascii_case(asset))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of one tier, in report order.
    pub fn by_tier(&self, tier: RiskTier) -> impl Iterator<Item = &RiskScoreEntry> {
        self.entries.iter().filter(move |e| e.risk_tier == tier)
    }

    /// Serialize the table form to CSV text.
    pub fn to_csv_string(&self) -> Result<String, AppError> {
        let mut buf = Vec::new();
        write_report_csv(&self.entries, &mut buf)?;
        String::from_utf8(buf).map_err(|e| AppError::Internal(e.to_string()))
    }

    /// Write the table form to `path`.
    pub fn save_csv(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        write_report_csv(&self.entries, file)?;
        tracing::info!(path = %path.display(), rows = self.entries.len(), "Risk table saved");
        Ok(())
    }
}

/// One row of the flat table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ReportRow {
    #[serde(rename = "Coin")]
    coin: String,
    #[serde(rename = "Overall Volatility (%)")]
    overall_volatility: f64,
    #[serde(rename = "Avg Rolling Volatility (%)")]
    rolling_volatility: f64,
    #[serde(rename = "Risk Score")]
    risk_score: f64,
    #[serde(rename = "Risk Level")]
    risk_level: RiskTier,
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl From<&RiskScoreEntry> for ReportRow {
    fn from(entry: &RiskScoreEntry) -> Self {
        Self {
            coin: entry.asset.clone(),
            overall_volatility: round2(entry.overall_volatility),
            rolling_volatility: round2(entry.rolling_volatility),
            risk_score: round2(entry.risk_score),
            risk_level: entry.risk_tier,
        }
    }
}

impl From<ReportRow> for RiskScoreEntry {
    fn from(row: ReportRow) -> Self {
        Self {
            asset: row.coin,
            overall_volatility: row.overall_volatility,
            rolling_volatility: row.rolling_volatility,
            risk_score: row.risk_score,
            risk_tier: row.risk_level,
        }
    }
}

/// Write entries as the flat CSV table.
pub fn write_report_csv<W: Write>(entries: &[RiskScoreEntry], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for entry in entries {
        csv_writer.serialize(ReportRow::from(entry))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Parse a flat CSV table back into entries.
pub fn read_report_csv<R: Read>(reader: R) -> Result<Vec<RiskScoreEntry>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader
        .deserialize::<ReportRow>()
        .map(|row| row.map(RiskScoreEntry::from))
        .collect()
}

/// Load a saved risk table from `path`.
pub fn load_report_csv(path: &Path) -> Result<Vec<RiskScoreEntry>, AppError> {
    let file = File::open(path)?;
    Ok(read_report_csv(file)?)
}
