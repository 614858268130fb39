// Finance Dashboard - Web Server
// One independent snapshot per session, served over a REST API

use anyhow::{Context, Result};
use finance_dashboard::api::{router, AppState};
use finance_dashboard::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // RUST_LOG wins over the configured default
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("Invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        version = finance_dashboard::VERSION,
        max_sessions = config.max_sessions,
        "Starting finance dashboard server"
    );

    let state = AppState::new(config.max_sessions, config.currency.clone());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("Server running on http://{}", config.bind_addr);
    info!("API: http://{}/api/sessions", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
