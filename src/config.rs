use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Medinbox";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default port the HTTP API listens on when `MEDINBOX_PORT` is unset.
pub const DEFAULT_PORT: u16 = 8080;

/// Default badge-poll interval in milliseconds.
/// Matches the refresh cadence used across the portal UI.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 30_000;

/// Well-known key under which a client persists the ids it has already
/// surfaced a notification for (a JSON array of integers).
pub const NOTIFIED_IDS_KEY: &str = "clinic-notified-ids";

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "medinbox=info"
}

/// Get the application data directory.
/// `MEDINBOX_DATA_DIR` overrides; otherwise ~/Medinbox/ on all platforms.
pub fn app_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MEDINBOX_DATA_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Medinbox")
}

/// Path of the clinic SQLite database.
pub fn database_path() -> PathBuf {
    app_data_dir().join("clinic.db")
}

/// Path of the client-side key-value state file (notified-id set lives here).
pub fn client_state_path() -> PathBuf {
    app_data_dir().join("client_state.json")
}

/// Port the HTTP API binds, honoring `MEDINBOX_PORT`.
pub fn api_port() -> u16 {
    std::env::var("MEDINBOX_PORT")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Poll interval in milliseconds, honoring `MEDINBOX_POLL_INTERVAL_MS`.
pub fn poll_interval_ms() -> u64 {
    std::env::var("MEDINBOX_POLL_INTERVAL_MS")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_POLL_INTERVAL_MS)
}
