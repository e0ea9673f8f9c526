//! Plotbook API Server
//!
//! Main entry point for the Plotbook backend service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use plotbook_api::{AppState, create_router};
use plotbook_core::commission::CommissionPolicy;
use plotbook_db::connect;
use plotbook_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plotbook=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Build commission policy
    let policy = CommissionPolicy::from(&config.commission);
    info!(
        sale_trigger_percent = %policy.sale_trigger_percent,
        cancellation_limit_percent = %policy.cancellation_limit_percent,
        direct_rate_percent = %policy.schedule.direct_rate_percent,
        upline_levels = policy.schedule.max_upline_depth(),
        "Commission policy configured"
    );

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        policy: Arc::new(policy),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
