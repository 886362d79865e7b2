//! Finding the file the downloader wrote.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use instafetch_core::{FetchError, FetchResult, output_file_stem};

/// Suffixes of partial or bookkeeping files the downloader may leave behind.
const INCOMPLETE_SUFFIXES: &[&str] = &[".part", ".ytdl", ".temp"];

/// Find the downloaded file for `timestamp` inside `dir`.
///
/// Returns the first regular file (by name) whose name starts with
/// `instagram_video_<timestamp>.`, skipping partial downloads. A missing
/// directory counts as no match.
pub async fn locate_output(dir: &Path, timestamp: i64) -> FetchResult<PathBuf> {
    let prefix = format!("{}.", output_file_stem(timestamp));
    let not_found = || FetchError::OutputNotFound {
        pattern: format!("{prefix}*"),
    };

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(FetchError::io_with_context("listing job directory", &e)),
    };

    let mut candidates = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| FetchError::io_with_context("listing job directory", &e))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with(&prefix) || is_incomplete(&name) {
            continue;
        }
        let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
        if is_file {
            candidates.push(entry.path());
        }
    }

    candidates.sort();
    candidates.into_iter().next().ok_or_else(not_found)
}

fn is_incomplete(name: &str) -> bool {
    INCOMPLETE_SUFFIXES.iter().any(|s| name.ends_with(s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn finds_file_with_any_extension() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("instagram_video_1700000000.mp4"), b"x").unwrap();

        let path = locate_output(temp.path(), 1_700_000_000).await.unwrap();
        assert_eq!(path, temp.path().join("instagram_video_1700000000.mp4"));
    }

    #[tokio::test]
    async fn picks_first_by_name_and_skips_partials() {
        let temp = TempDir::new().unwrap();
        for name in [
            "instagram_video_42.mp4.part",
            "instagram_video_42.webm",
            "instagram_video_42.mp4",
            "instagram_video_420.mp4",
        ] {
            std::fs::write(temp.path().join(name), b"x").unwrap();
        }

        let path = locate_output(temp.path(), 42).await.unwrap();
        assert_eq!(path.file_name().unwrap(), "instagram_video_42.mp4");
    }

    #[tokio::test]
    async fn zero_matches_is_not_found() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("instagram_video_1.mp4"), b"x").unwrap();
        std::fs::create_dir(temp.path().join("instagram_video_2.dir")).unwrap();

        let err = locate_output(temp.path(), 2).await.unwrap_err();
        assert_eq!(
            err,
            FetchError::OutputNotFound {
                pattern: "instagram_video_2.*".to_string()
            }
        );
    }

    #[tokio::test]
    async fn missing_directory_is_not_found() {
        let temp = TempDir::new().unwrap();
        let err = locate_output(&temp.path().join("gone"), 7).await.unwrap_err();
        assert!(matches!(err, FetchError::OutputNotFound { .. }));
    }
}
