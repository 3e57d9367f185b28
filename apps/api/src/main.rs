mod config;
mod errors;
mod models;
mod outreach;
mod routes;
mod search;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::outreach::channel::SendGridClient;
use crate::routes::build_router;
use crate::search::fallback::CompanyDataset;
use crate::search::provider::TheirStackClient;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobReach API v{}", env!("CARGO_PKG_VERSION"));

    // Job search provider
    let search = Arc::new(TheirStackClient::new(
        config.job_search.api_url.clone(),
        config.job_search.api_key.clone(),
        config.http_timeout,
    )?);
    info!("Job search client initialized ({})", config.job_search.api_url);

    // Outreach channel
    let channel = Arc::new(SendGridClient::new(
        config.mail.api_url.clone(),
        config.mail.api_key.clone(),
        config.http_timeout,
    )?);
    if config.outreach.sender_address.is_none() || config.outreach.recipients.is_empty() {
        warn!("Outreach is not fully configured; find-jobs runs will report an email error");
    } else {
        info!(
            "Outreach configured: {} recipients (max {} per run)",
            config.outreach.recipients.len(),
            config.outreach.max_recipients
        );
    }

    let dataset = CompanyDataset::new(config.company_dataset_path.clone());
    info!("Company dataset path: {}", dataset.path().display());

    // Build app state
    let state = AppState {
        config: config.clone(),
        search,
        channel,
        dataset,
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(TimeoutLayer::new(config.request_timeout)),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
