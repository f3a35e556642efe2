use tracing_subscriber::EnvFilter;

use frontdesk::api::types::AppState;
use frontdesk::api::server::start_server;
use frontdesk::{config, db};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    if let Err(e) = std::fs::create_dir_all(config::app_data_dir()) {
        tracing::error!("Cannot create data directory: {e}");
        std::process::exit(1);
    }

    // Open once at startup so migrations run before traffic arrives.
    if let Err(e) = db::open_database(&config::db_path()) {
        tracing::error!("Cannot open records database: {e}");
        std::process::exit(1);
    }

    let state = AppState::new(config::db_path());
    let mut server = match start_server(state, config::bind_addr()).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Cannot start API server: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(addr = %server.addr, "serving patient records API");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {e}");
    }
    server.shutdown();
}
