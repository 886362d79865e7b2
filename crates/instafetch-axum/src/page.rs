//! Server-rendered HTML pages.
//!
//! Pages are plain `format!` templates; every user-supplied value passes
//! through [`escape_html`] before it is interpolated.

use std::fmt::Write;

use instafetch_core::{CookieBrowser, JobId};

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:42rem;margin:2rem auto;\
padding:0 1rem;color:#222}input[type=url]{width:100%;padding:.5rem;box-sizing:border-box}\
button,.button{display:inline-block;margin-top:1rem;padding:.6rem 1.2rem;background:#d62976;\
color:#fff;border:0;border-radius:4px;text-decoration:none;cursor:pointer}\
.error{background:#fdecea;border-left:4px solid #d93025;padding:.75rem 1rem;margin:1rem 0}\
.success{background:#e6f4ea;border-left:4px solid #188038;padding:.75rem 1rem;margin:1rem 0}\
.hint{font-size:.9rem;margin-top:.5rem}details{margin-top:1rem}video{width:100%;margin-top:1rem}\
footer{margin-top:2rem;font-size:.85rem;color:#666}";

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Human-readable retention period ("5 minutes", "45 seconds").
pub fn retention_label(secs: u64) -> String {
    match secs {
        60 => "1 minute".to_string(),
        s if s >= 60 && s % 60 == 0 => format!("{} minutes", s / 60),
        1 => "1 second".to_string(),
        s => format!("{s} seconds"),
    }
}

/// An error shown above the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    /// Stable error type, used as a CSS hook.
    pub kind: &'static str,
    pub message: String,
    pub hint: Option<&'static str>,
}

/// State of the form when (re-)rendering it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPage {
    pub url: String,
    pub use_cookies: bool,
    pub browser: Option<CookieBrowser>,
    pub error: Option<ErrorNotice>,
}

/// Data for the success page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPage {
    pub job_id: JobId,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub retention_secs: u64,
}

fn layout(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>Instagram Video Downloader</title>\n<style>{STYLE}</style>\n</head>\n\
         <body>\n<h1>Instagram Video Downloader</h1>\n{body}\n<footer>\n\
         <p>Use this tool responsibly and respect copyright.</p>\n</footer>\n</body>\n</html>\n"
    )
}

/// Render the download form, optionally with an error above it.
pub fn render_form(page: &FormPage) -> String {
    let mut body = String::new();
    body.push_str("<p>Paste the URL of an Instagram post or reel to download its video.</p>\n");

    if let Some(error) = &page.error {
        let _ = write!(
            body,
            "<div class=\"error {}\" role=\"alert\"><strong>{}</strong>",
            error.kind,
            escape_html(&error.message)
        );
        if let Some(hint) = error.hint {
            let _ = write!(body, "<div class=\"hint\">{}</div>", escape_html(hint));
        }
        body.push_str("</div>\n");
    }

    let selected = page.browser.unwrap_or(CookieBrowser::Chrome);
    let mut options = String::new();
    for browser in CookieBrowser::ALL {
        let _ = write!(
            options,
            "<option value=\"{}\"{}>{}</option>",
            browser.as_str(),
            if browser == selected { " selected" } else { "" },
            browser.label()
        );
    }

    let _ = write!(
        body,
        "<form method=\"post\" action=\"/download\">\n\
         <label for=\"url\">Instagram URL:</label>\n\
         <input type=\"url\" id=\"url\" name=\"url\" value=\"{url}\" \
         placeholder=\"https://www.instagram.com/p/...\" required>\n\
         <details{open}>\n<summary>Advanced options</summary>\n\
         <p><label><input type=\"checkbox\" name=\"use_cookies\" value=\"on\"{checked}> \
         Use browser cookies (for posts that need a login)</label></p>\n\
         <p><label for=\"browser\">Browser:</label> \
         <select id=\"browser\" name=\"browser\">{options}</select></p>\n\
         </details>\n\
         <button type=\"submit\">Download video</button>\n</form>\n",
        url = escape_html(&page.url),
        open = if page.use_cookies { " open" } else { "" },
        checked = if page.use_cookies { " checked" } else { "" },
    );

    body.push_str(
        "<h2>How to use</h2>\n<ol>\n\
         <li>Open Instagram and find the video you want.</li>\n\
         <li>Copy the URL of the post or reel.</li>\n\
         <li>Paste it into the field above.</li>\n\
         <li>Click \"Download video\".</li>\n\
         <li>Wait for the download, then save the file.</li>\n</ol>\n",
    );

    layout(&body)
}

/// Render the page shown after a successful download.
pub fn render_result(page: &ResultPage) -> String {
    let file_url = format!("/files/{}", page.job_id);
    let body = format!(
        "<div class=\"success\">Video downloaded successfully!</div>\n\
         <video controls preload=\"metadata\"><source src=\"{file_url}\" type=\"{mime}\"></video>\n\
         <p><a class=\"button\" href=\"{file_url}?download=1\" download=\"{name}\">\
         Save {name}</a></p>\n\
         <p>{size} bytes. The file is deleted from the server after {retention}.</p>\n\
         <p><a href=\"/\">Download another video</a></p>\n",
        mime = escape_html(&page.mime_type),
        name = escape_html(&page.file_name),
        size = page.size_bytes,
        retention = retention_label(page.retention_secs),
    );

    layout(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn retention_labels() {
        assert_eq!(retention_label(300), "5 minutes");
        assert_eq!(retention_label(60), "1 minute");
        assert_eq!(retention_label(90), "90 seconds");
    }

    #[test]
    fn form_lists_every_browser_and_keeps_input() {
        let html = render_form(&FormPage {
            url: "https://instagram.com/p/x?a=\"b\"".to_string(),
            use_cookies: true,
            browser: Some(CookieBrowser::Firefox),
            error: Some(ErrorNotice {
                kind: "access_blocked",
                message: "Instagram blocked the request".to_string(),
                hint: Some("Try cookies"),
            }),
        });

        for browser in CookieBrowser::ALL {
            assert!(html.contains(&format!("value=\"{}\"", browser.as_str())));
        }
        assert!(html.contains("<option value=\"firefox\" selected>"));
        assert!(html.contains("value=\"https://instagram.com/p/x?a=&quot;b&quot;\""));
        assert!(html.contains("<details open>"));
        assert!(html.contains("class=\"error access_blocked\""));
        assert!(html.contains("Try cookies"));
    }

    #[test]
    fn result_links_preview_and_download() {
        let job_id = JobId::new();
        let html = render_result(&ResultPage {
            job_id,
            file_name: "instagram_video_1700000000.mp4".to_string(),
            mime_type: "video/mp4".to_string(),
            size_bytes: 16,
            retention_secs: 300,
        });

        assert!(html.contains(&format!("src=\"/files/{job_id}\"")));
        assert!(html.contains(&format!("href=\"/files/{job_id}?download=1\"")));
        assert!(html.contains("after 5 minutes"));
    }
}
