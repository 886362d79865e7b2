//! Axum server bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the web adapter. All concrete implementations are instantiated here.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use instafetch_core::{
    DirectoryCreationStrategy, Settings, VideoDownloaderPort, ensure_directory, validate_settings,
};
use instafetch_download::{
    ArtifactRegistry, FetchService, Janitor, JanitorHandle, YtDlpInvoker, prune_orphans,
    resolve_program,
};

/// Default listen address.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8501;

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorsConfig {
    /// Allow all origins (development mode).
    #[default]
    AllowAll,
    /// Allow specific origins (production mode).
    AllowOrigins(Vec<String>),
}

/// Server configuration for the web adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port for the HTTP server.
    pub port: u16,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// Fetch, cleanup and downloader settings.
    pub settings: Settings,
}

impl ServerConfig {
    /// Create config with default settings.
    pub fn with_defaults() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors: CorsConfig::default(),
            settings: Settings::with_defaults(),
        }
    }

    /// Replace the fetch settings.
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Set CORS to allow specific origins.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = CorsConfig::AllowOrigins(origins);
        self
    }
}

/// Application context for the web adapter.
pub struct AxumContext {
    /// The fetch pipeline and its artifact registry.
    pub fetch: Arc<FetchService>,
    /// Cancelled when the server stops; parent of every request's token.
    pub shutdown: CancellationToken,
    janitor: Mutex<Option<JanitorHandle>>,
}

impl AxumContext {
    pub fn settings(&self) -> &Settings {
        self.fetch.settings()
    }

    /// Cancel in-flight downloads and stop the janitor.
    ///
    /// Safe to call more than once; only the first call does any work.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let handle = self.janitor.lock().await.take();
        if let Some(handle) = handle {
            handle.shutdown().await;
        }
    }
}

/// Bootstrap the server with the real `yt-dlp` invoker.
pub async fn bootstrap(config: &ServerConfig) -> Result<AxumContext> {
    let program = &config.settings.downloader_path;
    match resolve_program(program) {
        Some(path) => tracing::info!(
            target: "instafetch.paths",
            downloader = %path.display(),
            "Resolved downloader"
        ),
        None => tracing::warn!(
            target: "instafetch.paths",
            downloader = %program,
            "Downloader not found; downloads will fail until it is installed"
        ),
    }

    bootstrap_with_downloader(config, Arc::new(YtDlpInvoker::new())).await
}

/// Bootstrap the server around any downloader implementation.
///
/// Validates settings, prepares the downloads directory, removes job
/// directories left by an earlier run and starts the janitor.
pub async fn bootstrap_with_downloader(
    config: &ServerConfig,
    downloader: Arc<dyn VideoDownloaderPort>,
) -> Result<AxumContext> {
    let settings = config.settings.clone();
    validate_settings(&settings).context("Invalid settings")?;

    ensure_directory(&settings.downloads_dir, DirectoryCreationStrategy::AutoCreate)
        .context("Downloads directory is not usable")?;

    let pruned = prune_orphans(&settings.downloads_dir)
        .await
        .context("Failed to scan downloads directory")?;

    tracing::info!(
        target: "instafetch.paths",
        downloads_dir = %settings.downloads_dir.display(),
        pruned,
        cleanup_delay_secs = settings.cleanup_delay_secs,
        max_concurrent = settings.max_concurrent_downloads,
        "Bootstrap resolved paths"
    );

    let registry = Arc::new(ArtifactRegistry::new());
    let janitor = Janitor::new(Arc::clone(&registry), settings.janitor_interval())
        .with_purge_on_shutdown(settings.purge_on_shutdown)
        .spawn();

    let fetch = Arc::new(FetchService::new(settings, downloader, registry));

    Ok(AxumContext {
        fetch,
        shutdown: CancellationToken::new(),
        janitor: Mutex::new(Some(janitor)),
    })
}

/// Start the web server and run until Ctrl+C or SIGTERM.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    use tokio::net::TcpListener;

    let ctx = bootstrap(&config).await?;
    let state = Arc::new(ctx);
    let app = crate::routes::router_with_state(Arc::clone(&state), &config.cors);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(target: "instafetch.http", "instafetch listening on http://{}", addr);

    let shutdown = state.shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!(target: "instafetch.http", "Shutdown requested");
            // Stop running downloads so open connections can drain
            shutdown.cancel();
        })
        .await?;

    state.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
