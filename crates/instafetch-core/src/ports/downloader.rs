//! External downloader port.
//!
//! The orchestrator builds a [`DownloaderInvocation`] and hands it to an
//! implementation of [`VideoDownloaderPort`]. A non-zero exit status is a
//! normal [`DownloaderOutcome`], not an error: classifying it is the
//! orchestrator's job. Errors are reserved for "the process could not be run
//! to completion" (missing binary, timeout, cancellation, I/O).

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Everything needed to run the downloader once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloaderInvocation {
    /// Program name or path (e.g., "yt-dlp").
    pub program: String,
    /// Arguments, URL last.
    pub args: Vec<String>,
    /// Directory the downloader writes into.
    pub job_dir: PathBuf,
    /// Output template passed with `-o` (contains `%(ext)s`).
    pub output_template: String,
    /// Hard limit on wall-clock time.
    pub timeout: Duration,
}

/// Result of a downloader run that went to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloaderOutcome {
    /// Exit code, `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard error (stdout is discarded).
    pub stderr: String,
}

impl DownloaderOutcome {
    /// Outcome of a run that exited with status 0.
    pub fn succeeded(stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stderr: stderr.into(),
        }
    }

    /// Outcome of a run that exited with the given non-zero status.
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stderr: stderr.into(),
        }
    }

    /// Whether the process exited with status 0.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }
}

/// Reasons the downloader could not be run to completion.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DownloaderError {
    #[error("Downloader '{program}' not found")]
    NotInstalled { program: String },

    #[error("Downloader timed out after {after_secs}s")]
    TimedOut { after_secs: u64 },

    #[error("Downloader cancelled")]
    Cancelled,

    #[error("Downloader I/O error ({kind}): {message}")]
    Io { kind: String, message: String },
}

impl DownloaderError {
    /// Map a spawn/wait error, recognising a missing binary.
    #[must_use]
    pub fn from_io_error(program: &str, err: &std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotInstalled {
                program: program.to_string(),
            }
        } else {
            Self::Io {
                kind: format!("{:?}", err.kind()),
                message: err.to_string(),
            }
        }
    }
}

/// Runs the external downloader.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait VideoDownloaderPort: Send + Sync {
    /// Run the downloader to completion, or until `cancel` fires or the
    /// invocation's timeout elapses.
    async fn run(
        &self,
        invocation: &DownloaderInvocation,
        cancel: CancellationToken,
    ) -> Result<DownloaderOutcome, DownloaderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation() -> DownloaderInvocation {
        DownloaderInvocation {
            program: "yt-dlp".to_string(),
            args: vec!["https://www.instagram.com/reel/ABC123/".to_string()],
            job_dir: PathBuf::from("downloads/job"),
            output_template: "downloads/job/instagram_video_1.%(ext)s".to_string(),
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn missing_binary_maps_to_not_installed() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file");
        assert_eq!(
            DownloaderError::from_io_error("yt-dlp", &err),
            DownloaderError::NotInstalled {
                program: "yt-dlp".to_string()
            }
        );

        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(
            DownloaderError::from_io_error("yt-dlp", &err),
            DownloaderError::Io { .. }
        ));
    }

    #[test]
    fn only_zero_exit_is_success() {
        assert!(DownloaderOutcome::succeeded("").is_success());
        assert!(!DownloaderOutcome::failed(1, "boom").is_success());
        assert!(!DownloaderOutcome::default().is_success());
    }

    #[tokio::test]
    async fn mock_port_is_usable_as_trait_object() {
        let mut mock = MockVideoDownloaderPort::new();
        mock.expect_run()
            .withf(|inv, _| inv.program == "yt-dlp")
            .times(1)
            .returning(|_, _| Ok(DownloaderOutcome::failed(1, "ERROR: login required")));

        let port: Box<dyn VideoDownloaderPort> = Box::new(mock);
        let outcome = port
            .run(&invocation(), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.exit_code, Some(1));
    }
}
