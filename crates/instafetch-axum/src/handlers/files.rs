//! Serving downloaded files.

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use instafetch_core::JobId;

use crate::error::HttpError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct FileQuery {
    /// Any value other than `0`/`false` asks for an attachment.
    #[serde(default)]
    pub download: Option<String>,
}

impl FileQuery {
    fn as_attachment(&self) -> bool {
        self.download
            .as_deref()
            .is_some_and(|v| !matches!(v, "0" | "false"))
    }
}

/// Keep a file name safe for a quoted header parameter.
fn header_safe_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `Content-Disposition` value for a served file.
pub fn content_disposition(file_name: &str, attachment: bool) -> String {
    let disposition = if attachment { "attachment" } else { "inline" };
    format!("{disposition}; filename=\"{}\"", header_safe_name(file_name))
}

/// `GET /files/{job_id}` - the artifact's bytes.
pub async fn serve(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Query(query): Query<FileQuery>,
) -> Result<Response, HttpError> {
    let not_found = || HttpError::NotFound("File not found or already deleted".to_string());

    let job_id: JobId = job_id.parse().map_err(|_| not_found())?;
    let Some((_, file)) = state.fetch.open(&job_id).await? else {
        return Err(not_found());
    };

    tracing::debug!(
        target: "instafetch.http",
        job_id = %job_id,
        size = file.bytes.len(),
        attachment = query.as_attachment(),
        "Serving file"
    );

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(file.mime_type));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(file.bytes.len()));
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_str(&content_disposition(&file.file_name, query.as_attachment()))
            .map_err(|e| HttpError::Internal(e.to_string()))?,
    );

    Ok((headers, Body::from(file.bytes)).into_response())
}
