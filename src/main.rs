//! Trendcast — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trendcast::ai::AiService;
use trendcast::api::{self, AppState};
use trendcast::config::Secrets;
use trendcast::feed::cache::SystemClock;
use trendcast::feed::transport::ReqwestFetch;
use trendcast::metrics::Metrics;
use trendcast::Aggregator;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trendcast=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let secrets = Secrets::from_env();
    if secrets.tianapi_key.is_none() {
        tracing::warn!("TIANAPI_KEY not set; TianAPI source will contribute nothing");
    }
    if secrets.tophub_key.is_none() {
        tracing::warn!("TOPHUB_API_KEY not set; TopHub source will contribute nothing");
    }

    let metrics = Metrics::init();

    let fetch = Arc::new(ReqwestFetch::new());
    let clock = Arc::new(SystemClock);
    let state = AppState {
        aggregator: Arc::new(Aggregator::new(fetch, clock, &secrets)),
        ai: Arc::new(AiService::from_secrets(&secrets)),
    };

    let app = api::router(state).merge(metrics.router());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "trendcast listening");
    axum::serve(listener, app).await?;
    Ok(())
}
