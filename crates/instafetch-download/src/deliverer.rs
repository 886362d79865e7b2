//! Reading a located file back for the client.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use instafetch_core::{FetchError, FetchResult};

/// A file read fully into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredFile {
    pub path: PathBuf,
    /// Base name of `path`, offered as the download name.
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// MIME type for a downloaded file, from its extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());

    match ext.as_deref() {
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        Some("mov") => "video/quicktime",
        Some("m4a") => "audio/mp4",
        _ => "application/octet-stream",
    }
}

/// Read `path` into memory.
///
/// The whole file is loaded; there is no streaming.
pub async fn deliver(path: &Path) -> FetchResult<DeliveredFile> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| FetchError::Io {
            kind: format!("{:?}", ErrorKind::InvalidInput),
            message: format!("{} has no file name", path.display()),
        })?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| FetchError::io_with_context(format!("reading {file_name}"), &e))?;

    Ok(DeliveredFile {
        path: path.to_path_buf(),
        file_name,
        mime_type: mime_for_path(path),
        bytes,
    })
}
