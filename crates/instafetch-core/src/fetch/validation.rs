//! URL validation.
//!
//! The check is deliberately shallow: the URL only has to be non-empty and
//! contain the expected host as a literal substring. Anything deeper is left
//! to the external downloader, which knows the site's URL shapes far better.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a URL is rejected before any process is spawned.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ValidationError {
    /// No URL was supplied (empty or whitespace only).
    #[error("Please enter a valid URL")]
    Empty,

    /// The URL does not mention the expected host.
    #[error("The URL must be an {expected} link")]
    WrongHost {
        /// The host substring that was required.
        expected: String,
    },
}

/// Validate a user-supplied URL against the expected host substring.
///
/// No parsing and no scheme check is performed.
///
/// A whitespace-only URL counts as missing and yields
/// [`ValidationError::Empty`], not [`ValidationError::WrongHost`]: the user
/// is asked for a URL rather than told the blank one has the wrong host.
/// Apart from that emptiness check the input is matched as-is.
pub fn validate_url(url: &str, expected_host: &str) -> Result<(), ValidationError> {
    if url.trim().is_empty() {
        return Err(ValidationError::Empty);
    }

    if !url.contains(expected_host) {
        return Err(ValidationError::WrongHost {
            expected: expected_host.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: &str = "instagram.com";

    #[test]
    fn accepts_reel_url() {
        assert!(validate_url("https://www.instagram.com/reel/ABC123/", HOST).is_ok());
    }

    #[test]
    fn accepts_without_scheme() {
        // Only the substring matters
        assert!(validate_url("instagram.com/p/xyz", HOST).is_ok());
    }

    #[test]
    fn rejects_empty_and_blank() {
        assert_eq!(validate_url("", HOST), Err(ValidationError::Empty));
        assert_eq!(validate_url("   \t", HOST), Err(ValidationError::Empty));
    }

    #[test]
    fn surrounding_whitespace_is_not_trimmed_away() {
        assert!(validate_url("  https://www.instagram.com/reel/ABC123/  ", HOST).is_ok());
        assert_eq!(
            validate_url("  not-a-url  ", HOST),
            Err(ValidationError::WrongHost {
                expected: HOST.to_string()
            })
        );
    }

    #[test]
    fn rejects_other_hosts() {
        let err = validate_url("not-a-url", HOST).unwrap_err();
        assert_eq!(
            err,
            ValidationError::WrongHost {
                expected: HOST.to_string()
            }
        );
        assert!(validate_url("https://www.youtube.com/watch?v=1", HOST).is_err());
    }

    #[test]
    fn host_match_is_case_sensitive() {
        assert!(validate_url("https://INSTAGRAM.COM/reel/1", HOST).is_err());
    }
}
