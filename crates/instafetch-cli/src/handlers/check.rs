//! Check command handler.

use anyhow::{Result, bail};

use instafetch_core::Settings;
use instafetch_download::resolve_program;

/// Execute the check command.
///
/// Fails when the downloader cannot be found.
pub fn execute(settings: &Settings) -> Result<()> {
    match resolve_program(&settings.downloader_path) {
        Some(path) => {
            println!("Downloader: {}", path.display());
            println!("Downloads directory: {}", settings.downloads_dir.display());
            Ok(())
        }
        None => bail!(
            "Downloader '{}' was not found.\n\nInstall it with:\n  pip install -U yt-dlp\n\
             or point --downloader / INSTAFETCH_DOWNLOADER at the binary.",
            settings.downloader_path
        ),
    }
}
