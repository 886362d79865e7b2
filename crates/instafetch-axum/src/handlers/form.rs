//! HTML form handlers.

use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use serde::Deserialize;

use instafetch_core::CookieBrowser;

use crate::error::HttpError;
use crate::page::{ErrorNotice, FormPage, ResultPage, render_form, render_result};
use crate::state::AppState;

use super::{new_request, parse_browser};

/// Form fields posted by the download page.
///
/// An unchecked checkbox is simply absent from the body.
#[derive(Debug, Default, Deserialize)]
pub struct DownloadForm {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub use_cookies: Option<String>,
    #[serde(default)]
    pub browser: Option<String>,
}

impl DownloadForm {
    fn cookies_enabled(&self) -> bool {
        self.use_cookies
            .as_deref()
            .is_some_and(|v| !matches!(v.trim(), "" | "off" | "false" | "0"))
    }
}

/// `GET /` - the empty form.
pub async fn index() -> Html<String> {
    Html(render_form(&FormPage::default()))
}

/// `POST /download` - run a fetch and render the outcome.
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<DownloadForm>,
) -> (StatusCode, Html<String>) {
    let use_cookies = form.cookies_enabled();
    let mut page = FormPage {
        url: form.url.clone(),
        use_cookies,
        browser: None,
        error: None,
    };

    let browser = if use_cookies {
        match parse_browser(form.browser.as_deref()) {
            Ok(browser) => Some(browser.unwrap_or(CookieBrowser::Chrome)),
            Err(err) => return form_error(page, &err),
        }
    } else {
        None
    };
    page.browser = browser;

    let request = new_request(&form.url, browser);
    let cancel = state.shutdown.child_token();

    match state.fetch.fetch_with_cancel(request, cancel).await {
        Ok(video) => {
            let html = render_result(&ResultPage {
                job_id: video.job_id,
                file_name: video.file_name.clone(),
                mime_type: video.mime_type.clone(),
                size_bytes: video.size_bytes(),
                retention_secs: state.settings().cleanup_delay_secs,
            });
            (StatusCode::OK, Html(html))
        }
        Err(err) => form_error(page, &HttpError::Fetch(err)),
    }
}

fn form_error(mut page: FormPage, err: &HttpError) -> (StatusCode, Html<String>) {
    page.error = Some(ErrorNotice {
        kind: err.error_type(),
        message: err.message(),
        hint: err.hint(),
    });
    (err.status(), Html(render_form(&page)))
}
