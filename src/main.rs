use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use volume_scanner::{
    build_router,
    config::AppConfig,
    services::{analytics::AnalyticsEngine, yahoo_chart::YahooChartClient},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,volume_scanner=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;

    tracing::info!(
        "Quote source: {} (timeout {}s, {} retries), benchmarks: {:?}",
        config.quotes.base_url,
        config.quotes.timeout_secs,
        config.quotes.retry_max,
        config.benchmarks.symbols()
    );

    let quotes = YahooChartClient::new(config.quotes.clone())?;

    let state = AppState {
        quotes: Arc::new(quotes),
        engine: AnalyticsEngine::new(config.benchmarks.clone()),
    };

    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
