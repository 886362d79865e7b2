//! Downloader subprocess execution.
//!
//! [`build_invocation`] turns settings and a request into a command line;
//! [`YtDlpInvoker`] runs it. The invoker never interprets the exit status:
//! a non-zero exit comes back as a normal [`DownloaderOutcome`].

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use instafetch_core::{
    DownloaderError, DownloaderInvocation, DownloaderOutcome, FetchRequest, Settings,
    VideoDownloaderPort,
};

// ============================================================================
// Command line
// ============================================================================

/// Output template for a request inside its job directory.
///
/// The `%(ext)s` placeholder is expanded by the downloader.
pub fn output_template(job_dir: &Path, request: &FetchRequest) -> String {
    job_dir
        .join(format!("{}.%(ext)s", request.output_stem()))
        .to_string_lossy()
        .into_owned()
}

/// Build the downloader invocation for one request.
///
/// Argument order: `[-f <format>] -o <template> [--cookies-from-browser <b>]
/// <extra args...> <url>`. The URL is always the last argument.
pub fn build_invocation(
    settings: &Settings,
    request: &FetchRequest,
    job_dir: &Path,
) -> DownloaderInvocation {
    let template = output_template(job_dir, request);
    let mut args = Vec::with_capacity(6 + settings.extra_args.len());

    if let Some(format) = settings.effective_format() {
        args.push("-f".to_string());
        args.push(format.to_string());
    }

    args.push("-o".to_string());
    args.push(template.clone());

    if let Some(browser) = request.cookies_from_browser {
        args.push("--cookies-from-browser".to_string());
        args.push(browser.as_str().to_string());
    }

    args.extend(settings.extra_args.iter().cloned());
    args.push(request.url.clone());

    DownloaderInvocation {
        program: settings.downloader_path.clone(),
        args,
        job_dir: job_dir.to_path_buf(),
        output_template: template,
        timeout: settings.download_timeout(),
    }
}

/// Locate the downloader binary on `PATH` (or verify an explicit path).
pub fn resolve_program(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}

// ============================================================================
// Process execution
// ============================================================================

/// Runs the downloader as a child process.
///
/// The child is killed if the returned future is dropped, so a client that
/// disconnects takes its download with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct YtDlpInvoker;

impl YtDlpInvoker {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl VideoDownloaderPort for YtDlpInvoker {
    async fn run(
        &self,
        invocation: &DownloaderInvocation,
        cancel: CancellationToken,
    ) -> Result<DownloaderOutcome, DownloaderError> {
        tracing::debug!(
            target: "instafetch.fetch",
            program = %invocation.program,
            args = ?invocation.args,
            "Spawning downloader"
        );

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DownloaderError::from_io_error(&invocation.program, &e))?;

        let stderr = child.stderr.take().ok_or_else(|| DownloaderError::Io {
            kind: "BrokenPipe".to_string(),
            message: "missing stderr pipe".to_string(),
        })?;

        let mut stderr_reader = BufReader::new(stderr);
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr_reader.read_to_end(&mut buf).await;
            buf
        });

        let deadline = tokio::time::sleep(invocation.timeout);
        tokio::pin!(deadline);

        let status = tokio::select! {
            biased;

            () = cancel.cancelled() => {
                let _ = child.kill().await;
                stderr_task.abort();
                tracing::info!(target: "instafetch.fetch", "Downloader cancelled");
                return Err(DownloaderError::Cancelled);
            }

            () = &mut deadline => {
                let _ = child.kill().await;
                stderr_task.abort();
                let after_secs = invocation.timeout.as_secs();
                tracing::warn!(target: "instafetch.fetch", after_secs, "Downloader timed out");
                return Err(DownloaderError::TimedOut { after_secs });
            }

            status = child.wait() => {
                status.map_err(|e| DownloaderError::from_io_error(&invocation.program, &e))?
            }
        };

        let stderr_buf = stderr_task.await.unwrap_or_default();
        let outcome = DownloaderOutcome {
            exit_code: status.code(),
            stderr: String::from_utf8_lossy(&stderr_buf).into_owned(),
        };

        tracing::debug!(
            target: "instafetch.fetch",
            exit_code = ?outcome.exit_code,
            stderr_len = outcome.stderr.len(),
            "Downloader exited"
        );

        Ok(outcome)
    }
}
