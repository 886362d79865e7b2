//! HTTP handlers.
//!
//! - `form` - HTML form and its submission
//! - `files` - Serving downloaded files
//! - `api` - JSON endpoint for programmatic clients

pub mod api;
pub mod files;
pub mod form;

use instafetch_core::{CookieBrowser, FetchRequest};

use crate::error::HttpError;

/// Parse an optional browser name from user input. Blank means none.
pub(crate) fn parse_browser(raw: Option<&str>) -> Result<Option<CookieBrowser>, HttpError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(name) => name
            .parse()
            .map(Some)
            .map_err(|e: instafetch_core::ParseBrowserError| HttpError::BadRequest(e.to_string())),
    }
}

/// Build a request for a user-supplied URL.
pub(crate) fn new_request(url: &str, browser: Option<CookieBrowser>) -> FetchRequest {
    FetchRequest::new(url).with_cookies_from_browser(browser)
}
