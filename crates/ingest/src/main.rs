use cryptorisk_common::config::AppConfig;
use cryptorisk_ingest::fetcher::PriceFetcher;
use cryptorisk_ingest::store::save_price_files;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cryptorisk_ingest=info".into()),
        )
        .json()
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        assets = config.assets.len(),
        days = config.history_days,
        currency = %config.vs_currency,
        "Fetching price histories"
    );

    let fetcher = PriceFetcher::from_config(&config).await?;
    let outcome = fetcher.fetch_all(&config.assets).await;

    if outcome.series.is_empty() {
        anyhow::bail!("no price history could be fetched for any asset");
    }

    let saved = save_price_files(&outcome.series, |asset| config.price_file(asset));
    if saved.written.is_empty() {
        anyhow::bail!("no price file could be written to {}", config.data_dir.display());
    }

    tracing::info!(
        saved = saved.written.len(),
        write_failed = saved.failed.len(),
        fetch_failed = outcome.failures.len(),
        "Fetch run finished"
    );
    Ok(())
}
