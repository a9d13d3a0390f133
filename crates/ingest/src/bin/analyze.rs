//! Scores every stored price file and writes the flat risk table.

use cryptorisk_common::config::AppConfig;
use cryptorisk_engine::RiskAnalyzer;
use cryptorisk_engine::summary::RiskSummary;
use cryptorisk_ingest::store::load_price_dir;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cryptorisk_engine=info,cryptorisk_ingest=info".into()),
        )
        .json()
        .init();

    let config = AppConfig::from_env()?;
    let analyzer = RiskAnalyzer::new(&config.risk)?;

    let loaded = load_price_dir(&config.data_dir, config.history_days)?;
    tracing::info!(
        data_dir = %config.data_dir.display(),
        series = loaded.series.len(),
        rejected = loaded.rejected.len(),
        "Price files loaded"
    );

    let report = analyzer.run(&loaded.series)?;
    report.save_csv(&config.report_path)?;

    for entry in &report.entries {
        tracing::info!(
            asset = %entry.asset,
            overall_volatility = entry.overall_volatility,
            rolling_volatility = entry.rolling_volatility,
            risk_score = entry.risk_score,
            risk_tier = %entry.risk_tier,
            "Asset classified"
        );
    }

    let summary = RiskSummary::from_entries(&report.entries);
    tracing::info!(
        total = summary.total_assets,
        average_risk_score = summary.average_risk_score,
        riskiest = summary.riskiest_asset.as_deref(),
        "Final risk classification completed"
    );

    print!("{}", report.to_csv_string()?);
    Ok(())
}
