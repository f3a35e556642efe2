use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Frontdesk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default HTTP port, matching the original deployment.
pub const DEFAULT_PORT: u16 = 5001;

/// Get the application data directory.
/// ~/Frontdesk/ on all platforms, overridable via FRONTDESK_DATA_DIR.
pub fn app_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("FRONTDESK_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Frontdesk")
}

/// Get the patient records database path.
pub fn db_path() -> PathBuf {
    app_data_dir().join("records.db")
}

/// Socket address the HTTP server binds to.
///
/// Port comes from the PORT environment variable when set (same contract
/// as the original deployment), falling back to `DEFAULT_PORT`.
pub fn bind_addr() -> SocketAddr {
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port)
}

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> String {
    format!("info,{}=debug", env!("CARGO_PKG_NAME"))
}
