//! ATS HTTP Server Binary
//!
//! This is the main entry point for the attendance REST API server. It
//! initializes the repository, sets up the HTTP router, and starts serving
//! requests.
//!
//! # Usage
//!
//! ```bash
//! # Run with local (in-memory) repository (default)
//! cargo run --bin ats-server --features "local-repo,http-server"
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `REPOSITORY_TYPE`: Storage backend override (default: from config)
//! - `ATS_TIMEZONE`: Reference zone override (default: from config)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use ats_rust::db::{self, ServiceConfig};
use ats_rust::http::{create_router, AppState};
use ats_rust::models::ReferenceClock;
use ats_rust::services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting ATS HTTP Server");

    // Load configuration; built-in defaults when no file is present
    let config = ServiceConfig::from_default_location().unwrap_or_else(|e| {
        warn!("No configuration file loaded ({}), using defaults", e);
        ServiceConfig::default_local()
    });

    // Catch configuration typos before touching the singleton
    config
        .repository_type()
        .map_err(|e| anyhow::anyhow!("Invalid repository type: {}", e))?;

    // Initialize global repository once and reuse it across the app
    db::init_repository().map_err(|e| anyhow::anyhow!(e))?;
    let repository = std::sync::Arc::clone(db::get_repository()?);
    info!("Repository initialized successfully");

    // Reference zone: env override wins over the config file
    let clock = match env::var("ATS_TIMEZONE") {
        Ok(name) => ReferenceClock::from_name(&name).map_err(|e| anyhow::anyhow!(e))?,
        Err(_) => config.clock().map_err(|e| anyhow::anyhow!(e.to_string()))?,
    };
    info!("Reference time zone: {}", clock.zone().name());

    // Create application state
    let state = AppState::new(repository.clone())
        .with_clock(clock)
        .with_outliers(config.outlier_config());

    // Periodic absence sweep; hourly ticks, each one a no-op unless a
    // session has finished with unrecorded students.
    if config.attendance.nightly_backfill {
        let sweep_repo = repository.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(3600));
            loop {
                ticker.tick().await;
                match services::sweep_absences(
                    sweep_repo.as_ref(),
                    &clock,
                    chrono::Utc::now(),
                )
                .await
                {
                    Ok(count) if count > 0 => info!("Absence sweep inserted {} records", count),
                    Ok(_) => {}
                    Err(e) => warn!("Absence sweep failed: {}", e),
                }
            }
        });
        info!("Absence sweep task started");
    }

    // Create router with all endpoints
    let app = create_router(state);

    // Determine bind address
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
