//! Medinbox is the messaging service behind a medical clinic's patient
//! portal: letters to the operator desk or the chief doctor, a per-patient
//! support chat, anonymous feedback, and the unread badges that keep all
//! three visible.
//!
//! The `api` module serves the HTTP surface, `db` owns the SQLite schema
//! and queries, and `notify` carries the client-side badge machinery
//! (polling, caching, per-item notification dedup).

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod notify;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Run the clinic API server until Ctrl+C or SIGTERM.
pub async fn run() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Medinbox starting v{}", config::APP_VERSION);

    let data_dir = config::app_data_dir();
    std::fs::create_dir_all(&data_dir)
        .map_err(|e| format!("Cannot create data directory {}: {e}", data_dir.display()))?;

    // Open once up front so a broken database fails the boot, not the
    // first request.
    let db_path = config::database_path();
    db::open_database(&db_path).map_err(|e| format!("Cannot open database: {e}"))?;
    tracing::info!(path = %db_path.display(), "Database ready");

    let state = Arc::new(state::ClinicState::new(db_path));
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], config::api_port())))
        .await
        .map_err(|e| format!("Failed to bind clinic API server: {e}"))?;
    let addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get server address: {e}"))?;
    tracing::info!(%addr, "Clinic API listening");

    axum::serve(listener, api::clinic_router(state))
        .with_graceful_shutdown(api::server::shutdown_signal())
        .await
        .map_err(|e| format!("Clinic API server error: {e}"))?;

    tracing::info!("Medinbox stopped");
    Ok(())
}
