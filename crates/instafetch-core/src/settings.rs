//! Settings domain types and validation.
//!
//! These are plain values; the CLI fills them from flags and environment
//! variables and every other crate only reads them.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default directory downloads are written into.
pub const DEFAULT_DOWNLOADS_DIR: &str = "./downloads";

/// Default downloader program.
pub const DEFAULT_DOWNLOADER: &str = "yt-dlp";

/// Default format selector passed with `-f`.
pub const DEFAULT_FORMAT: &str = "best";

/// Substring every accepted URL must contain.
pub const DEFAULT_EXPECTED_HOST: &str = "instagram.com";

/// Seconds a delivered file stays on disk.
pub const DEFAULT_CLEANUP_DELAY_SECS: u64 = 300;

/// Seconds between janitor passes.
pub const DEFAULT_JANITOR_INTERVAL_SECS: u64 = 15;

/// Seconds a single downloader run may take.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 600;

/// Downloads allowed to run at the same time.
pub const DEFAULT_MAX_CONCURRENT_DOWNLOADS: usize = 2;

/// Application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Root of all job directories.
    pub downloads_dir: PathBuf,

    /// Program name or path of the downloader.
    pub downloader_path: String,

    /// Format selector; `None` or empty leaves the choice to the downloader.
    pub format: Option<String>,

    /// Substring a URL must contain to be accepted.
    pub expected_host: String,

    /// How long a delivered file is kept before deletion.
    pub cleanup_delay_secs: u64,

    /// How often the janitor looks for expired files.
    pub janitor_interval_secs: u64,

    /// Wall-clock limit for one downloader run.
    pub download_timeout_secs: u64,

    /// Admission limit for concurrent downloader processes (1-16).
    pub max_concurrent_downloads: usize,

    /// Delete every remaining file when the server stops.
    pub purge_on_shutdown: bool,

    /// Extra arguments inserted before the URL.
    pub extra_args: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            downloads_dir: PathBuf::from(DEFAULT_DOWNLOADS_DIR),
            downloader_path: DEFAULT_DOWNLOADER.to_string(),
            format: Some(DEFAULT_FORMAT.to_string()),
            expected_host: DEFAULT_EXPECTED_HOST.to_string(),
            cleanup_delay_secs: DEFAULT_CLEANUP_DELAY_SECS,
            janitor_interval_secs: DEFAULT_JANITOR_INTERVAL_SECS,
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            max_concurrent_downloads: DEFAULT_MAX_CONCURRENT_DOWNLOADS,
            purge_on_shutdown: true,
            extra_args: Vec::new(),
        }
    }

    /// Format selector to pass, if any. Blank values count as unset.
    #[must_use]
    pub fn effective_format(&self) -> Option<&str> {
        self.format
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
    }

    /// Retention period of delivered files.
    #[must_use]
    pub const fn cleanup_delay(&self) -> Duration {
        Duration::from_secs(self.cleanup_delay_secs)
    }

    /// Period of the janitor loop.
    #[must_use]
    pub const fn janitor_interval(&self) -> Duration {
        Duration::from_secs(self.janitor_interval_secs)
    }

    /// Wall-clock limit for one downloader run.
    #[must_use]
    pub const fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Downloads directory cannot be empty")]
    EmptyDownloadsDir,

    #[error("Downloader path cannot be empty")]
    EmptyDownloaderPath,

    #[error("Expected host cannot be empty")]
    EmptyExpectedHost,

    #[error("Cleanup delay must be at least 1 second")]
    InvalidCleanupDelay,

    #[error("Janitor interval must be between 1 and 3600 seconds, got {0}")]
    InvalidJanitorInterval(u64),

    #[error("Download timeout must be at least 1 second")]
    InvalidDownloadTimeout,

    #[error("Max concurrent downloads must be between 1 and 16, got {0}")]
    InvalidConcurrency(usize),
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if settings.downloads_dir.as_os_str().is_empty() {
        return Err(SettingsError::EmptyDownloadsDir);
    }

    if settings.downloader_path.trim().is_empty() {
        return Err(SettingsError::EmptyDownloaderPath);
    }

    // An empty host would make every URL valid
    if settings.expected_host.trim().is_empty() {
        return Err(SettingsError::EmptyExpectedHost);
    }

    if settings.cleanup_delay_secs == 0 {
        return Err(SettingsError::InvalidCleanupDelay);
    }

    if !(1..=3600).contains(&settings.janitor_interval_secs) {
        return Err(SettingsError::InvalidJanitorInterval(
            settings.janitor_interval_secs,
        ));
    }

    if settings.download_timeout_secs == 0 {
        return Err(SettingsError::InvalidDownloadTimeout);
    }

    if !(1..=16).contains(&settings.max_concurrent_downloads) {
        return Err(SettingsError::InvalidConcurrency(
            settings.max_concurrent_downloads,
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::with_defaults();
        assert_eq!(settings.downloads_dir, PathBuf::from("./downloads"));
        assert_eq!(settings.downloader_path, "yt-dlp");
        assert_eq!(settings.effective_format(), Some("best"));
        assert_eq!(settings.expected_host, "instagram.com");
        assert_eq!(settings.cleanup_delay(), Duration::from_secs(300));
        assert_eq!(settings.janitor_interval(), Duration::from_secs(15));
        assert_eq!(settings.download_timeout(), Duration::from_secs(600));
        assert_eq!(settings.max_concurrent_downloads, 2);
        assert!(settings.purge_on_shutdown);
        assert!(settings.extra_args.is_empty());
    }

    #[test]
    fn test_validate_settings_valid() {
        assert!(validate_settings(&Settings::with_defaults()).is_ok());
    }

    #[test]
    fn test_blank_format_is_omitted() {
        let settings = Settings {
            format: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.effective_format(), None);

        let settings = Settings {
            format: None,
            ..Default::default()
        };
        assert_eq!(settings.effective_format(), None);
    }

    #[test]
    fn test_validate_empty_host() {
        let settings = Settings {
            expected_host: String::new(),
            ..Default::default()
        };
        assert_eq!(
            validate_settings(&settings),
            Err(SettingsError::EmptyExpectedHost)
        );
    }

    #[test]
    fn test_validate_concurrency_bounds() {
        for bad in [0, 17] {
            let settings = Settings {
                max_concurrent_downloads: bad,
                ..Default::default()
            };
            assert_eq!(
                validate_settings(&settings),
                Err(SettingsError::InvalidConcurrency(bad))
            );
        }
    }

    #[test]
    fn test_validate_zero_timeout() {
        let settings = Settings {
            download_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            validate_settings(&settings),
            Err(SettingsError::InvalidDownloadTimeout)
        );
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"cleanup_delay_secs": 60, "format": null}"#).unwrap();
        assert_eq!(settings.cleanup_delay_secs, 60);
        assert_eq!(settings.format, None);
        assert_eq!(settings.downloader_path, DEFAULT_DOWNLOADER);
    }
}
