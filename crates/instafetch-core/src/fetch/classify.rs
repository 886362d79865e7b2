//! Classification of downloader failures.
//!
//! When the downloader exits with a non-zero status, its stderr is searched
//! for a handful of known phrases to pick a user-facing category. This is a
//! presentation heuristic only: the downloader's wording is not stable across
//! versions, so unknown output always falls back to [`FailureCategory::Generic`].

use serde::{Deserialize, Serialize};

/// Phrases indicating the site refused anonymous access.
const ACCESS_BLOCKED_MARKERS: &[&str] = &["login required", "rate-limit"];

/// Phrases indicating the downloader could not find a video in the page.
const EXTRACTION_FAILED_MARKERS: &[&str] = &["unable to extract"];

/// User-facing category of a failed download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// Login wall or rate limit; cookie delegation usually helps.
    AccessBlocked,
    /// The page was fetched but no video could be extracted.
    ExtractionFailed,
    /// The downloader ran past its time budget and was killed.
    TimedOut,
    /// Anything else; the raw stderr is shown.
    Generic,
}

impl FailureCategory {
    /// Stable machine-readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccessBlocked => "access_blocked",
            Self::ExtractionFailed => "extraction_failed",
            Self::TimedOut => "timed_out",
            Self::Generic => "generic",
        }
    }

    /// Short headline shown above the details.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::AccessBlocked => "Instagram blocked the request",
            Self::ExtractionFailed => "Could not extract the video",
            Self::TimedOut => "The download took too long",
            Self::Generic => "Error downloading the video",
        }
    }

    /// Category-specific advice, if there is any.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::AccessBlocked => Some(
                "Open the advanced options, enable \"Use browser cookies\" and pick a \
                 browser where you are logged in to Instagram, then try again.",
            ),
            Self::ExtractionFailed => Some(
                "Check that the URL points to a public post or reel that contains a video.",
            ),
            Self::TimedOut => Some("The downloader was stopped. Try again in a few minutes."),
            Self::Generic => None,
        }
    }
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick a category from the downloader's stderr.
///
/// Matching is an ASCII case-insensitive substring search. Access-blocked
/// phrases take precedence over everything else.
pub fn classify_stderr(stderr: &str) -> FailureCategory {
    let haystack = stderr.to_ascii_lowercase();
    let contains_any = |markers: &[&str]| markers.iter().any(|m| haystack.contains(m));

    if contains_any(ACCESS_BLOCKED_MARKERS) {
        FailureCategory::AccessBlocked
    } else if contains_any(EXTRACTION_FAILED_MARKERS) {
        FailureCategory::ExtractionFailed
    } else {
        FailureCategory::Generic
    }
}
