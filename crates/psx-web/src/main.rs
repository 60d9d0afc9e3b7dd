use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use psx_core::{MarketDataService, PsxScraper, ScraperConfig};
use psx_web::{cache_backend, router, AppState, Cli, ServerError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), ServerError> {
    let scraper = PsxScraper::from_config(ScraperConfig::from_env())?;
    let config = scraper.config();
    tracing::info!(base_url = %config.base_url, lookback_days = config.lookback_days, "scraper configured");

    let cache = cache_backend(&cli).await?;
    let service = MarketDataService::new(Arc::new(scraper), cache).with_ttl(cli.cache_ttl());
    let app = router(AppState::new(service));

    let addr = SocketAddr::new(cli.bind, cli.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "psx-api listening");

    axum::serve(listener, app).await?;
    Ok(())
}
