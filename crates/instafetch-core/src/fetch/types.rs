//! Core fetch types.
//!
//! These are pure data types with no I/O. Paths are carried as values; the
//! download crate is the one that touches the filesystem.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Prefix of every file the downloader is asked to write.
pub const OUTPUT_FILE_PREFIX: &str = "instagram_video_";

/// File stem (without extension) for a request timestamp.
///
/// `output_file_stem(1_700_000_000)` is `instagram_video_1700000000`.
pub fn output_file_stem(timestamp: i64) -> String {
    format!("{OUTPUT_FILE_PREFIX}{timestamp}")
}

// ============================================================================
// JobId
// ============================================================================

/// Identifier of a single fetch; also names its job directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_hyphenated())
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

// ============================================================================
// CookieBrowser
// ============================================================================

/// Browsers the downloader can read session cookies from.
///
/// Nothing checks that the chosen browser is actually installed; the
/// downloader reports that itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CookieBrowser {
    Chrome,
    Firefox,
    Edge,
    Brave,
    Safari,
    Chromium,
    Opera,
}

impl CookieBrowser {
    /// Every supported browser, in the order shown to users.
    pub const ALL: [Self; 7] = [
        Self::Chrome,
        Self::Firefox,
        Self::Edge,
        Self::Brave,
        Self::Safari,
        Self::Chromium,
        Self::Opera,
    ];

    /// Identifier passed to `--cookies-from-browser`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
            Self::Edge => "edge",
            Self::Brave => "brave",
            Self::Safari => "safari",
            Self::Chromium => "chromium",
            Self::Opera => "opera",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Chrome => "Chrome",
            Self::Firefox => "Firefox",
            Self::Edge => "Edge",
            Self::Brave => "Brave",
            Self::Safari => "Safari",
            Self::Chromium => "Chromium",
            Self::Opera => "Opera",
        }
    }
}

impl fmt::Display for CookieBrowser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a browser name is not one of [`CookieBrowser::ALL`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unsupported browser '{0}' (expected one of: chrome, firefox, edge, brave, safari, chromium, opera)")]
pub struct ParseBrowserError(pub String);

impl FromStr for CookieBrowser {
    type Err = ParseBrowserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseBrowserError(s.to_string()))
    }
}

// ============================================================================
// FetchRequest
// ============================================================================

/// A single user request to fetch one video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// URL as typed by the user.
    pub url: String,
    /// Browser to borrow session cookies from, if cookie delegation is on.
    pub cookies_from_browser: Option<CookieBrowser>,
    /// Seconds since the Unix epoch; namespaces the output file name.
    pub timestamp: i64,
    /// Namespaces the job directory.
    pub job_id: JobId,
}

impl FetchRequest {
    /// Create a request stamped with the current time and a fresh job id.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            cookies_from_browser: None,
            timestamp: Utc::now().timestamp(),
            job_id: JobId::new(),
        }
    }

    /// Enable or disable cookie delegation.
    #[must_use]
    pub const fn with_cookies_from_browser(mut self, browser: Option<CookieBrowser>) -> Self {
        self.cookies_from_browser = browser;
        self
    }

    /// Override the timestamp.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Override the job id.
    #[must_use]
    pub const fn with_job_id(mut self, job_id: JobId) -> Self {
        self.job_id = job_id;
        self
    }

    /// Stem of the file the downloader will write.
    pub fn output_stem(&self) -> String {
        output_file_stem(self.timestamp)
    }
}

// ============================================================================
// Delivery
// ============================================================================

/// A downloaded video held in memory, ready to hand to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredVideo {
    pub job_id: JobId,
    /// Where the file lives until the janitor evicts it.
    pub path: PathBuf,
    /// Suggested download name (base name of `path`).
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    /// When the file is scheduled for deletion.
    pub expires_at: DateTime<Utc>,
}

impl DeliveredVideo {
    /// Size of the payload in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Bookkeeping entry for a file on disk awaiting cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub job_id: JobId,
    /// Job directory removed on eviction.
    pub directory: PathBuf,
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Artifact {
    /// Whether the artifact is due for eviction at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
