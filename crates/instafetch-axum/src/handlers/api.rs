//! JSON API handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use instafetch_core::JobId;

use crate::error::HttpError;
use crate::state::AppState;

use super::{new_request, parse_browser};

/// Request to download one video.
#[derive(Debug, Deserialize)]
pub struct CreateDownloadRequest {
    pub url: String,
    /// Browser to borrow cookies from; omitted or null disables delegation.
    #[serde(default)]
    pub cookies_from_browser: Option<String>,
}

/// A finished download, ready to fetch from `file_url`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadResponse {
    pub job_id: JobId,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub file_url: String,
    pub download_url: String,
    pub expires_at: DateTime<Utc>,
}

/// `POST /api/downloads` - run a fetch and describe the result.
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateDownloadRequest>, JsonRejection>,
) -> Result<Json<DownloadResponse>, HttpError> {
    let Json(req) = body.map_err(|e| HttpError::BadRequest(e.body_text()))?;
    let browser = parse_browser(req.cookies_from_browser.as_deref())?;

    let video = state
        .fetch
        .fetch_with_cancel(new_request(&req.url, browser), state.shutdown.child_token())
        .await?;

    let file_url = format!("/files/{}", video.job_id);
    Ok(Json(DownloadResponse {
        job_id: video.job_id,
        size_bytes: video.size_bytes(),
        download_url: format!("{file_url}?download=1"),
        file_url,
        file_name: video.file_name,
        mime_type: video.mime_type,
        expires_at: video.expires_at,
    }))
}
