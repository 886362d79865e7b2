//! Fetch command handler.
//!
//! One-shot download: runs the same pipeline as the web server, copies the
//! result out of its job directory and deletes the job directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};

use instafetch_core::{
    CookieBrowser, DirectoryCreationStrategy, FetchRequest, Settings, ensure_directory,
    validate_settings,
};
use instafetch_download::{ArtifactRegistry, FetchService, YtDlpInvoker};

/// Write `bytes` as `output_dir/file_name`, creating the directory if needed.
pub async fn save_to(output_dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let target = output_dir.join(file_name);
    tokio::fs::write(&target, bytes)
        .await
        .with_context(|| format!("Failed to write {}", target.display()))?;
    Ok(target)
}

/// Execute the fetch command. Returns where the video was saved.
pub async fn execute(
    settings: Settings,
    url: &str,
    output: &Path,
    cookies_from_browser: Option<CookieBrowser>,
) -> Result<PathBuf> {
    validate_settings(&settings).context("Invalid settings")?;
    ensure_directory(&settings.downloads_dir, DirectoryCreationStrategy::AutoCreate)
        .context("Downloads directory is not usable")?;

    let service = FetchService::new(
        settings,
        Arc::new(YtDlpInvoker::new()),
        Arc::new(ArtifactRegistry::new()),
    );

    println!("Downloading {url} ...");
    let request = FetchRequest::new(url).with_cookies_from_browser(cookies_from_browser);
    let video = service.fetch(request).await.map_err(|err| {
        let mut message = err.user_message();
        if let Some(hint) = err.hint() {
            message.push_str("\n\n");
            message.push_str(hint);
        }
        anyhow!(message)
    })?;

    let saved = save_to(output, &video.file_name, &video.bytes).await;
    service.release(&video.job_id).await;
    let saved = saved?;

    tracing::debug!(
        target: "instafetch.cli",
        job_id = %video.job_id,
        path = %saved.display(),
        "Fetch finished"
    );

    println!("Saved {} ({} bytes)", saved.display(), video.size_bytes());
    Ok(saved)
}
