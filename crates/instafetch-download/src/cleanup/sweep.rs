//! Directory sweeping.
//!
//! Everything here is best effort: per-entry failures are logged and
//! skipped so one stuck file never blocks the rest.

use std::io::{self, ErrorKind};
use std::path::Path;

use instafetch_core::JobId;

/// Delete every regular file directly inside `dir`.
///
/// Subdirectories are left alone. A missing directory is not an error.
/// Returns the number of files removed.
pub async fn sweep_directory(dir: &Path) -> io::Result<usize> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
        if !is_file {
            continue;
        }

        let path = entry.path();
        match tokio::fs::remove_file(&path).await {
            Ok(()) => removed += 1,
            // Someone else got there first
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    target: "instafetch.cleanup",
                    path = %path.display(),
                    error = %e,
                    "Failed to delete file"
                );
            }
        }
    }

    Ok(removed)
}

/// Sweep a job directory, then remove it if it ended up empty.
///
/// Returns the number of files removed. Never fails; problems are logged.
pub async fn remove_job_directory(dir: &Path) -> usize {
    let removed = match sweep_directory(dir).await {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!(
                target: "instafetch.cleanup",
                dir = %dir.display(),
                error = %e,
                "Failed to sweep job directory"
            );
            0
        }
    };

    match tokio::fs::remove_dir(dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(
                target: "instafetch.cleanup",
                dir = %dir.display(),
                error = %e,
                "Failed to remove job directory"
            );
        }
    }

    removed
}

/// Remove job directories left behind by an earlier process.
///
/// Only directories whose names parse as a job id are touched; anything
/// else under `downloads_dir` is left in place. Returns the number of
/// directories removed.
pub async fn prune_orphans(downloads_dir: &Path) -> io::Result<usize> {
    let mut entries = match tokio::fs::read_dir(downloads_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut pruned = 0;
    while let Some(entry) = entries.next_entry().await? {
        let is_dir = entry.file_type().await.is_ok_and(|t| t.is_dir());
        let is_job = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.parse::<JobId>().is_ok());
        if !is_dir || !is_job {
            continue;
        }

        let path = entry.path();
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => {
                pruned += 1;
                tracing::debug!(
                    target: "instafetch.cleanup",
                    dir = %path.display(),
                    "Pruned orphaned job directory"
                );
            }
            Err(e) => {
                tracing::warn!(
                    target: "instafetch.cleanup",
                    dir = %path.display(),
                    error = %e,
                    "Failed to prune job directory"
                );
            }
        }
    }

    Ok(pruned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn sweep_removes_files_but_not_subdirectories() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.mp4"), b"a").unwrap();
        std::fs::write(temp.path().join("b.webm"), b"b").unwrap();
        std::fs::create_dir(temp.path().join("nested")).unwrap();
        std::fs::write(temp.path().join("nested/c.mp4"), b"c").unwrap();

        assert_eq!(sweep_directory(temp.path()).await.unwrap(), 2);
        assert!(!temp.path().join("a.mp4").exists());
        assert!(temp.path().join("nested/c.mp4").exists());
    }

    #[tokio::test]
    async fn second_sweep_is_a_no_op() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.mp4"), b"a").unwrap();

        assert_eq!(sweep_directory(temp.path()).await.unwrap(), 1);
        assert_eq!(sweep_directory(temp.path()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn missing_directory_sweeps_nothing() {
        let temp = TempDir::new().unwrap();
        assert_eq!(sweep_directory(&temp.path().join("gone")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn remove_job_directory_deletes_the_directory() {
        let temp = TempDir::new().unwrap();
        let job = temp.path().join("job");
        std::fs::create_dir(&job).unwrap();
        std::fs::write(job.join("instagram_video_1.mp4"), b"v").unwrap();

        assert_eq!(remove_job_directory(&job).await, 1);
        assert!(!job.exists());
        // Already gone: still fine
        assert_eq!(remove_job_directory(&job).await, 0);
    }

    #[tokio::test]
    async fn prune_only_touches_job_directories() {
        let temp = TempDir::new().unwrap();
        let orphan = temp.path().join(JobId::new().to_string());
        std::fs::create_dir(&orphan).unwrap();
        std::fs::write(orphan.join("instagram_video_1.mp4"), b"v").unwrap();
        std::fs::create_dir(temp.path().join("keep-me")).unwrap();
        std::fs::write(temp.path().join("notes.txt"), b"n").unwrap();

        assert_eq!(prune_orphans(temp.path()).await.unwrap(), 1);
        assert!(!orphan.exists());
        assert!(temp.path().join("keep-me").exists());
        assert!(temp.path().join("notes.txt").exists());
    }
}
