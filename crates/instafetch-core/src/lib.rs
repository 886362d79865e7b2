//! Core domain types and port definitions for instafetch.
//!
//! This crate holds everything that is independent of how a video is actually
//! fetched or served: the request model, URL validation, the error taxonomy,
//! downloader stderr classification, settings, and the downloader port.
//!
//! No process spawning, HTTP, or runtime wiring lives here.
#![deny(unused_crate_dependencies)]

pub mod fetch;
pub mod paths;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use fetch::{
    Artifact, CookieBrowser, DeliveredVideo, FailureCategory, FetchError, FetchRequest,
    FetchResult, JobId, OUTPUT_FILE_PREFIX, ParseBrowserError, ValidationError, classify_stderr,
    output_file_stem, validate_url,
};
pub use paths::{
    DirectoryCreationStrategy, PathError, ensure_directory, job_directory, verify_writable,
};
pub use ports::{DownloaderError, DownloaderInvocation, DownloaderOutcome, VideoDownloaderPort};
pub use settings::{
    DEFAULT_CLEANUP_DELAY_SECS, DEFAULT_DOWNLOADER, DEFAULT_DOWNLOADS_DIR, DEFAULT_EXPECTED_HOST,
    DEFAULT_FORMAT, Settings, SettingsError, validate_settings,
};

#[cfg(feature = "test-utils")]
pub use ports::MockVideoDownloaderPort;

