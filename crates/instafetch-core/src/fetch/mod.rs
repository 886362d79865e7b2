//! Fetch domain types, errors, and pure helpers.
//!
//! This module contains the data types describing a single video fetch and
//! the pure functions applied to it. No I/O, process, or runtime
//! dependencies allowed.
//!
//! # Structure
//!
//! - `types` - Identifiers and data structures (`JobId`, `FetchRequest`, `Artifact`)
//! - `validation` - URL validation performed before anything is spawned
//! - `classify` - Downloader stderr classification into user-facing categories
//! - `errors` - Error types for fetch operations

pub mod classify;
pub mod errors;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use classify::{FailureCategory, classify_stderr};
pub use errors::{FetchError, FetchResult};
pub use types::{
    Artifact, CookieBrowser, DeliveredVideo, FetchRequest, JobId, OUTPUT_FILE_PREFIX,
    ParseBrowserError, output_file_stem,
};
pub use validation::{ValidationError, validate_url};
