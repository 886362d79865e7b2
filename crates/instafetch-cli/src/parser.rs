//! Main CLI parser and top-level argument handling.
//!
//! Every settings flag is global and falls back to an `INSTAFETCH_*`
//! environment variable, so a `.env` file can configure the server.

use std::path::PathBuf;

use clap::{Args, Parser};

use instafetch_core::settings::{
    DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_JANITOR_INTERVAL_SECS, DEFAULT_MAX_CONCURRENT_DOWNLOADS,
};
use instafetch_core::{
    DEFAULT_CLEANUP_DELAY_SECS, DEFAULT_DOWNLOADER, DEFAULT_DOWNLOADS_DIR, DEFAULT_EXPECTED_HOST,
    DEFAULT_FORMAT, Settings,
};

use crate::commands::Commands;

/// Download Instagram videos through yt-dlp.
#[derive(Parser)]
#[command(name = "instafetch")]
#[command(about = "Download Instagram videos through yt-dlp")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Fetch and cleanup settings shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct SettingsArgs {
    /// Directory downloads are written into
    #[arg(long, env = "INSTAFETCH_DOWNLOADS_DIR", default_value = DEFAULT_DOWNLOADS_DIR, global = true)]
    pub downloads_dir: PathBuf,

    /// Downloader program name or path
    #[arg(long, env = "INSTAFETCH_DOWNLOADER", default_value = DEFAULT_DOWNLOADER, global = true)]
    pub downloader: String,

    /// Format selector passed with -f (empty to let the downloader choose)
    #[arg(long, env = "INSTAFETCH_FORMAT", default_value = DEFAULT_FORMAT, global = true)]
    pub format: String,

    /// Substring every URL must contain
    #[arg(long, env = "INSTAFETCH_EXPECTED_HOST", default_value = DEFAULT_EXPECTED_HOST, global = true)]
    pub expected_host: String,

    /// Seconds a downloaded file is kept
    #[arg(long, env = "INSTAFETCH_CLEANUP_DELAY_SECS", default_value_t = DEFAULT_CLEANUP_DELAY_SECS, global = true)]
    pub cleanup_delay: u64,

    /// Seconds between cleanup passes
    #[arg(long, env = "INSTAFETCH_JANITOR_INTERVAL_SECS", default_value_t = DEFAULT_JANITOR_INTERVAL_SECS, global = true)]
    pub janitor_interval: u64,

    /// Seconds a single download may take
    #[arg(long, env = "INSTAFETCH_DOWNLOAD_TIMEOUT_SECS", default_value_t = DEFAULT_DOWNLOAD_TIMEOUT_SECS, global = true)]
    pub timeout: u64,

    /// Downloads allowed to run at the same time
    #[arg(long, env = "INSTAFETCH_MAX_CONCURRENT", default_value_t = DEFAULT_MAX_CONCURRENT_DOWNLOADS, global = true)]
    pub max_concurrent: usize,

    /// Keep unexpired files when the server stops
    #[arg(long, env = "INSTAFETCH_KEEP_ON_SHUTDOWN", global = true)]
    pub keep_on_shutdown: bool,

    /// Extra argument for the downloader, placed before the URL (repeatable)
    #[arg(long = "extra-arg", env = "INSTAFETCH_EXTRA_ARGS", value_delimiter = ' ', allow_hyphen_values = true, global = true)]
    pub extra_args: Vec<String>,
}

impl SettingsArgs {
    /// Convert flags into core settings.
    pub fn to_settings(&self) -> Settings {
        let format = self.format.trim();
        Settings {
            downloads_dir: self.downloads_dir.clone(),
            downloader_path: self.downloader.clone(),
            format: (!format.is_empty()).then(|| format.to_string()),
            expected_host: self.expected_host.clone(),
            cleanup_delay_secs: self.cleanup_delay,
            janitor_interval_secs: self.janitor_interval,
            download_timeout_secs: self.timeout,
            max_concurrent_downloads: self.max_concurrent,
            purge_on_shutdown: !self.keep_on_shutdown,
            extra_args: self
                .extra_args
                .iter()
                .filter(|a| !a.is_empty())
                .cloned()
                .collect(),
        }
    }
}
