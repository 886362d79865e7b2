//! Clean command handler.
//!
//! Meant to be run while the server is stopped: it removes every job
//! directory, including ones a running server may still be serving.

use anyhow::{Context, Result};

use instafetch_core::Settings;
use instafetch_download::{prune_orphans, sweep_directory};

/// Counts reported by [`execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanReport {
    /// Loose files removed from the top of the downloads directory.
    pub files: usize,
    /// Job directories removed.
    pub job_dirs: usize,
}

/// Execute the clean command.
pub async fn execute(settings: &Settings) -> Result<CleanReport> {
    let dir = &settings.downloads_dir;

    let files = sweep_directory(dir)
        .await
        .with_context(|| format!("Failed to sweep {}", dir.display()))?;
    let job_dirs = prune_orphans(dir)
        .await
        .with_context(|| format!("Failed to prune job directories in {}", dir.display()))?;

    println!(
        "Removed {files} file(s) and {job_dirs} job director{} from {}",
        if job_dirs == 1 { "y" } else { "ies" },
        dir.display()
    );

    Ok(CleanReport { files, job_dirs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn removes_loose_files_and_job_directories() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("instagram_video_1.mp4"), b"v").unwrap();
        let job = temp.path().join("0b8a3f7e-5c1d-4e8a-9f2b-6d4c3a2b1e0f");
        std::fs::create_dir(&job).unwrap();
        std::fs::write(job.join("instagram_video_2.mp4"), b"v").unwrap();

        let settings = Settings {
            downloads_dir: temp.path().to_path_buf(),
            ..Settings::with_defaults()
        };
        let report = execute(&settings).await.unwrap();

        assert_eq!(
            report,
            CleanReport {
                files: 1,
                job_dirs: 1
            }
        );
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn missing_directory_is_fine() {
        let temp = TempDir::new().unwrap();
        let settings = Settings {
            downloads_dir: temp.path().join("never-created"),
            ..Settings::with_defaults()
        };
        let report = execute(&settings).await.unwrap();
        assert_eq!(report.files + report.job_dirs, 0);
    }
}
