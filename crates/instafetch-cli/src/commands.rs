//! Available subcommands.

use std::path::PathBuf;

use clap::Subcommand;

use instafetch_axum::bootstrap::{DEFAULT_HOST, DEFAULT_PORT};
use instafetch_core::CookieBrowser;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the web server
    Serve {
        /// Address to bind
        #[arg(long, env = "INSTAFETCH_HOST", default_value = DEFAULT_HOST)]
        host: String,
        /// Port to listen on
        #[arg(short, long, env = "INSTAFETCH_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Restrict CORS on /api to these origins (repeatable; default allows all)
        #[arg(long = "allow-origin")]
        allow_origins: Vec<String>,
    },

    /// Download a single video to a local directory
    Fetch {
        /// Instagram post or reel URL
        url: String,
        /// Directory to save the video into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// Read session cookies from this browser
        #[arg(short = 'b', long)]
        cookies_from_browser: Option<CookieBrowser>,
    },

    /// Delete leftover downloads from the downloads directory
    Clean,

    /// Check that the downloader is installed
    Check,
}
