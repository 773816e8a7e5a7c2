use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use cinelog_api::config::Config;
use cinelog_api::dto::Manifest;
use cinelog_api::routes;
use cinelog_api::state::AppState;
use cinelog_client::{PageFetcher, PosterEnricher};
use cinelog_core::catalog::{CatalogConfig, CatalogService};
use cinelog_core::throttle::PacedFetcher;
use cinelog_core::traits::SystemClock;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("cinelog=info".parse()?))
        .with_target(false)
        .init();

    let config = Config::from_env()?;

    let fetcher = PageFetcher::from_mode(
        &config.fetch_mode,
        Duration::from_secs(30),
        config.chrome_bin.clone(),
    )
    .await?;
    let fetcher = PacedFetcher::new(fetcher, config.fetch_delay);
    let enricher = PosterEnricher::from_key(config.tmdb_api_key.as_deref())?;

    let catalog_config = CatalogConfig::new(&config.username)
        .with_base_url(&config.base_url)
        .with_ttl(config.ttl)
        .with_max_pages(config.max_pages)
        .with_crawl_timeout(config.crawl_timeout);
    let manifest = Manifest::for_user(&config.username, &catalog_config.catalog_id);
    let catalog = CatalogService::new(catalog_config, fetcher, enricher, SystemClock);

    let state = Arc::new(AppState { catalog, manifest });

    // Browsing clients are cross-origin web apps; CORS must stay open.
    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting cinelog add-on for {} on {addr}", config.username);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    tracing::info!("Shutdown signal received");
}
