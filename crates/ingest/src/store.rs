//! Flat CSV price store: one `<asset>_price_<days>_days.csv` file per asset,
//! columns `date,price`.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use cryptorisk_common::error::AppError;
use cryptorisk_common::types::{PricePoint, PriceSeries};

const FILE_MARKER: &str = "_price_";

#[derive(Debug, Serialize, Deserialize)]
struct PriceRow {
    date: NaiveDate,
    price: f64,
}

/// Write a series to `path`, creating parent directories as needed.
pub fn write_price_csv(path: &Path, series: &PriceSeries) -> Result<(), AppError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_writer(File::create(path)?);
    for point in series.points() {
        writer.serialize(PriceRow {
            date: point.date,
            price: point.price,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Read and validate the price file of `asset`.
pub fn read_price_csv(path: &Path, asset: &str) -> Result<PriceSeries, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(File::open(path)?);

    let points = reader
        .deserialize::<PriceRow>()
        .map(|row| row.map(|r| PricePoint::new(r.date, r.price)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PriceSeries::new(asset, points)?)
}

/// Split `<asset>_price_<days>_days.csv` into its asset id and day count.
fn parse_price_file_name(file_name: &str) -> Option<(&str, u32)> {
    let stem = file_name.strip_suffix("_days.csv")?;
    let (asset, days) = stem.split_once(FILE_MARKER)?;
    if asset.is_empty() {
        return None;
    }
    Some((asset, days.parse().ok()?))
}

/// Asset id encoded in a price file name (`bitcoin_price_30_days.csv` → `bitcoin`).
pub fn asset_from_file_name(file_name: &str) -> Option<String> {
    parse_price_file_name(file_name).map(|(asset, _)| asset.to_lowercase())
}

/// A price file that could not be turned into a series.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Everything read from a price directory.
#[derive(Debug, Clone, Default)]
pub struct LoadedPrices {
    /// Valid series, in file-name order
    pub series: Vec<PriceSeries>,
    pub rejected: Vec<RejectedFile>,
}

/// Result of saving a batch of fetched series.
#[derive(Debug, Clone, Default)]
pub struct SavedPrices {
    pub written: Vec<PathBuf>,
    pub failed: Vec<RejectedFile>,
}

/// Load the price file of every asset in `dir` for a `history_days` horizon.
///
/// Files are visited in file-name order so batch order is deterministic.
/// Files for other horizons are left alone. A malformed file, or one whose
/// asset id is not lowercase, is logged and reported in `rejected`, never fatal.
pub fn load_price_dir(dir: &Path, history_days: u32) -> Result<LoadedPrices, AppError> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    let mut loaded = LoadedPrices::default();
    for path in paths {
        let parsed = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(parse_price_file_name)
            .map(|(asset, days)| (asset.to_string(), days));
        let Some((asset, days)) = parsed else {
            continue;
        };

        if days != history_days {
            tracing::debug!(
                path = %path.display(),
                days,
                history_days,
                "Ignoring price file for another horizon"
            );
            continue;
        }

        if asset != asset.to_lowercase() {
            tracing::warn!(path = %path.display(), "Rejecting price file with non-canonical name");
            loaded.rejected.push(RejectedFile {
                reason: format!(
                    "file name must use the lowercase coin id {}",
                    asset.to_lowercase()
                ),
                path,
            });
            continue;
        }

        match read_price_csv(&path, &asset) {
            Ok(series) => {
                tracing::debug!(asset = %asset, samples = series.len(), "Loaded price file");
                loaded.series.push(series);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Rejecting price file");
                loaded.rejected.push(RejectedFile {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(loaded)
}

/// Write each series to the path `path_for` gives its asset.
///
/// A failed write is logged and recorded; the remaining series are still saved.
pub fn save_price_files(
    series: &[PriceSeries],
    path_for: impl Fn(&str) -> PathBuf,
) -> SavedPrices {
    let mut saved = SavedPrices::default();
    for s in series {
        let path = path_for(s.asset());
        match write_price_csv(&path, s) {
            Ok(()) => {
                tracing::info!(asset = s.asset(), path = %path.display(), "Price file saved");
                saved.written.push(path);
            }
            Err(e) => {
                tracing::error!(
                    asset = s.asset(),
                    path = %path.display(),
                    error = %e,
                    "Price file write failed"
                );
                saved.failed.push(RejectedFile {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }
    saved
}
