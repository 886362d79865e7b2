//! Fetch error types.
//!
//! These errors are designed to be cloneable and serializable, so I/O errors
//! are captured as kind and message strings rather than `std::io::Error`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::classify::FailureCategory;
use super::validation::ValidationError;
use crate::ports::DownloaderError;

/// Error type for a single fetch.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum FetchError {
    /// The URL was rejected before anything ran.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The downloader exited with a non-zero status.
    #[error("Downloader failed ({category}): {stderr}")]
    DownloadFailed {
        /// Category picked from stderr.
        category: FailureCategory,
        /// Exit code, if the process was not killed by a signal.
        #[serde(skip_serializing_if = "Option::is_none")]
        exit_code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// The downloader ran past its time budget and was killed.
    #[error("Downloader timed out after {after_secs}s")]
    TimedOut {
        /// The configured budget.
        after_secs: u64,
    },

    /// The fetch was cancelled (client went away or server shutting down).
    #[error("Fetch cancelled")]
    Cancelled,

    /// The downloader binary could not be found.
    #[error("Downloader '{program}' is not installed or not in PATH")]
    NotInstalled {
        /// Program that was looked up.
        program: String,
    },

    /// The downloader succeeded but no matching output file exists.
    #[error("No file matching '{pattern}' after download")]
    OutputNotFound {
        /// Glob-style description of what was looked for.
        pattern: String,
    },

    /// I/O error while preparing, reading, or cleaning up files.
    #[error("I/O error ({kind}): {message}")]
    Io {
        /// The kind of I/O error (e.g., "`NotFound`", "`PermissionDenied`").
        kind: String,
        /// Detailed error message.
        message: String,
    },
}

impl FetchError {
    /// Create an I/O error from a `std::io::Error`.
    #[must_use]
    pub fn from_io_error(err: &std::io::Error) -> Self {
        Self::Io {
            kind: format!("{:?}", err.kind()),
            message: err.to_string(),
        }
    }

    /// Create an I/O error with extra context prepended to the message.
    pub fn io_with_context(context: impl AsRef<str>, err: &std::io::Error) -> Self {
        Self::Io {
            kind: format!("{:?}", err.kind()),
            message: format!("{}: {err}", context.as_ref()),
        }
    }

    /// Create a download failure, classifying the stderr text.
    pub fn download_failed(exit_code: Option<i32>, stderr: impl Into<String>) -> Self {
        let stderr = stderr.into();
        Self::DownloadFailed {
            category: super::classify::classify_stderr(&stderr),
            exit_code,
            stderr,
        }
    }

    /// Stable discriminant for clients (JSON `type` field, CSS classes).
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::DownloadFailed { category, .. } => category.as_str(),
            Self::TimedOut { .. } => "timed_out",
            Self::Cancelled => "cancelled",
            Self::NotInstalled { .. } => "downloader_missing",
            Self::OutputNotFound { .. } => "output_not_found",
            Self::Io { .. } => "io",
        }
    }

    /// The failure category, for errors produced by the downloader itself.
    #[must_use]
    pub const fn category(&self) -> Option<FailureCategory> {
        match self {
            Self::DownloadFailed { category, .. } => Some(*category),
            Self::TimedOut { .. } => Some(FailureCategory::TimedOut),
            _ => None,
        }
    }

    /// Check if this is a cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Convert to a user-friendly message.
    ///
    /// Generic downloader failures show the raw stderr verbatim; internal
    /// details (paths, I/O kinds) are never shown.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::DownloadFailed {
                category: FailureCategory::Generic,
                stderr,
                ..
            } => {
                if stderr.trim().is_empty() {
                    "Error downloading the video.".to_string()
                } else {
                    format!("Error downloading the video: {}", stderr.trim())
                }
            }
            Self::DownloadFailed { category, .. } => category.title().to_string(),
            Self::TimedOut { after_secs } => {
                format!("The download was stopped after {after_secs} seconds.")
            }
            Self::Cancelled => "The download was cancelled.".to_string(),
            Self::NotInstalled { program } => {
                format!("The downloader ({program}) is not installed on the server.")
            }
            Self::OutputNotFound { .. } => "File not found after the download.".to_string(),
            Self::Io { .. } => "Could not prepare or read the downloaded file.".to_string(),
        }
    }

    /// Category-specific advice for the user, if any.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        match self.category() {
            Some(category) => category.hint(),
            None => None,
        }
    }
}

impl From<DownloaderError> for FetchError {
    fn from(err: DownloaderError) -> Self {
        match err {
            DownloaderError::NotInstalled { program } => Self::NotInstalled { program },
            DownloaderError::TimedOut { after_secs } => Self::TimedOut { after_secs },
            DownloaderError::Cancelled => Self::Cancelled,
            DownloaderError::Io { kind, message } => Self::Io { kind, message },
        }
    }
}

/// Convenience result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_failed_classifies_stderr() {
        let err = FetchError::download_failed(Some(1), "ERROR: rate-limit reached");
        assert_eq!(err.category(), Some(FailureCategory::AccessBlocked));
        assert_eq!(err.kind(), "access_blocked");
        assert!(err.hint().is_some());
    }

    #[test]
    fn generic_failure_shows_raw_stderr() {
        let err = FetchError::download_failed(Some(2), "ERROR: something odd\n");
        assert_eq!(
            err.user_message(),
            "Error downloading the video: ERROR: something odd"
        );
        assert!(err.hint().is_none());
    }

    #[test]
    fn io_error_captures_kind() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = FetchError::from_io_error(&io_err);
        match err {
            FetchError::Io { kind, message } => {
                assert_eq!(kind, "NotFound");
                assert!(message.contains("file not found"));
            }
            _ => panic!("Expected Io variant"),
        }
    }

    #[test]
    fn io_message_does_not_assume_a_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/srv/dl: denied");
        let err = FetchError::io_with_context("creating job directory", &io_err);
        assert_eq!(
            err.user_message(),
            "Could not prepare or read the downloaded file."
        );
        assert!(!err.user_message().contains("/srv/dl"));
    }

    #[test]
    fn downloader_errors_map_one_to_one() {
        let err: FetchError = DownloaderError::TimedOut { after_secs: 5 }.into();
        assert_eq!(err, FetchError::TimedOut { after_secs: 5 });
        assert_eq!(err.category(), Some(FailureCategory::TimedOut));

        let err: FetchError = DownloaderError::Cancelled.into();
        assert!(err.is_cancelled());
    }

    #[test]
    fn validation_error_converts() {
        let err: FetchError = ValidationError::Empty.into();
        assert_eq!(err.kind(), "validation");
        assert_eq!(err.user_message(), "Please enter a valid URL");
    }
}
