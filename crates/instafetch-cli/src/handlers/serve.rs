//! Serve command handler.

use anyhow::Result;

use instafetch_axum::{CorsConfig, ServerConfig, start_server};
use instafetch_core::Settings;

/// Build the server configuration for `serve`.
pub fn server_config(
    settings: Settings,
    host: String,
    port: u16,
    allow_origins: Vec<String>,
) -> ServerConfig {
    let cors = if allow_origins.is_empty() {
        CorsConfig::AllowAll
    } else {
        CorsConfig::AllowOrigins(allow_origins)
    };

    ServerConfig {
        host,
        port,
        cors,
        settings,
    }
}

/// Execute the serve command. Runs until Ctrl+C or SIGTERM.
pub async fn execute(config: ServerConfig) -> Result<()> {
    println!(
        "Instagram Video Downloader available on http://{}:{}",
        config.host, config.port
    );
    start_server(config).await
}
