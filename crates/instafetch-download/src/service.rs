//! The end-to-end fetch pipeline.
//!
//! validate -> job directory -> downloader (admission-controlled) ->
//! classify -> locate -> deliver -> register for cleanup.
//!
//! Any failure after the job directory exists removes that directory before
//! the error is returned, and so does dropping the future mid-flight.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use instafetch_core::{
    Artifact, DeliveredVideo, FetchError, FetchRequest, FetchResult, JobId, Settings,
    VideoDownloaderPort, job_directory, validate_url,
};

use crate::cleanup::{ArtifactRegistry, remove_job_directory};
use crate::deliverer::{DeliveredFile, deliver};
use crate::invoker::build_invocation;
use crate::locator::locate_output;

/// Owns a job directory until the fetch succeeds.
///
/// Failed fetches call [`JobDirGuard::discard`]. The blocking removal in
/// `Drop` only runs when the fetch future itself is dropped mid-flight.
struct JobDirGuard {
    path: Option<PathBuf>,
}

impl JobDirGuard {
    const fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    fn disarm(&mut self) {
        self.path = None;
    }

    /// Remove the directory without blocking the runtime.
    async fn discard(mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = tokio::fs::remove_dir_all(&path).await {
                log_discard_failure(&path, &e);
            }
        }
    }
}

impl Drop for JobDirGuard {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = std::fs::remove_dir_all(&path) {
                log_discard_failure(&path, &e);
            }
        }
    }
}

fn log_discard_failure(path: &Path, err: &std::io::Error) {
    if err.kind() == ErrorKind::NotFound {
        return;
    }
    tracing::warn!(
        target: "instafetch.cleanup",
        dir = %path.display(),
        error = %err,
        "Failed to discard job directory"
    );
}

/// Runs fetches and tracks their artifacts.
///
/// Cheap to share behind an `Arc`; all state is internally synchronized.
pub struct FetchService {
    settings: Settings,
    downloader: Arc<dyn VideoDownloaderPort>,
    registry: Arc<ArtifactRegistry>,
    permits: Semaphore,
}

impl FetchService {
    pub fn new(
        settings: Settings,
        downloader: Arc<dyn VideoDownloaderPort>,
        registry: Arc<ArtifactRegistry>,
    ) -> Self {
        let permits = Semaphore::new(settings.max_concurrent_downloads.max(1));
        Self {
            settings,
            downloader,
            registry,
            permits,
        }
    }

    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    pub const fn registry(&self) -> &Arc<ArtifactRegistry> {
        &self.registry
    }

    /// Fetch one video.
    pub async fn fetch(&self, request: FetchRequest) -> FetchResult<DeliveredVideo> {
        self.fetch_with_cancel(request, CancellationToken::new()).await
    }

    /// Fetch one video, giving up when `cancel` fires.
    pub async fn fetch_with_cancel(
        &self,
        request: FetchRequest,
        cancel: CancellationToken,
    ) -> FetchResult<DeliveredVideo> {
        validate_url(&request.url, &self.settings.expected_host)?;

        let job_dir = job_directory(&self.settings.downloads_dir, &request.job_id);
        tokio::fs::create_dir_all(&job_dir)
            .await
            .map_err(|e| FetchError::io_with_context("creating job directory", &e))?;
        let mut guard = JobDirGuard::new(job_dir.clone());

        tracing::info!(
            target: "instafetch.fetch",
            job_id = %request.job_id,
            url = %request.url,
            cookies = request.cookies_from_browser.map(|b| b.as_str()),
            "Fetch started"
        );

        match self.run_job(&request, &job_dir, cancel).await {
            Ok(video) => {
                guard.disarm();
                tracing::info!(
                    target: "instafetch.fetch",
                    job_id = %video.job_id,
                    file = %video.file_name,
                    size_bytes = video.size_bytes(),
                    "Fetch completed"
                );
                Ok(video)
            }
            Err(err) => {
                guard.discard().await;
                tracing::warn!(
                    target: "instafetch.fetch",
                    job_id = %request.job_id,
                    kind = err.kind(),
                    error = %err,
                    "Fetch failed"
                );
                Err(err)
            }
        }
    }

    async fn run_job(
        &self,
        request: &FetchRequest,
        job_dir: &Path,
        cancel: CancellationToken,
    ) -> FetchResult<DeliveredVideo> {
        let invocation = build_invocation(&self.settings, request, job_dir);

        let outcome = {
            let _permit = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(FetchError::Cancelled),
                permit = self.permits.acquire() => permit.map_err(|_| FetchError::Cancelled)?,
            };
            self.downloader.run(&invocation, cancel).await?
        };

        if !outcome.is_success() {
            return Err(FetchError::download_failed(
                outcome.exit_code,
                outcome.stderr,
            ));
        }

        let path = locate_output(job_dir, request.timestamp).await?;
        let file = deliver(&path).await?;

        let created_at = Utc::now();
        let expires_at = self.expiry_from(created_at);
        self.registry
            .register(Artifact {
                job_id: request.job_id,
                directory: job_dir.to_path_buf(),
                path: file.path.clone(),
                file_name: file.file_name.clone(),
                mime_type: file.mime_type.to_string(),
                size_bytes: file.bytes.len() as u64,
                created_at,
                expires_at,
            })
            .await;

        Ok(DeliveredVideo {
            job_id: request.job_id,
            path: file.path,
            file_name: file.file_name,
            mime_type: file.mime_type.to_string(),
            bytes: file.bytes,
            expires_at,
        })
    }

    fn expiry_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        TimeDelta::from_std(self.settings.cleanup_delay())
            .ok()
            .and_then(|delay| now.checked_add_signed(delay))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Read back a registered artifact.
    ///
    /// `Ok(None)` when the job is unknown, expired, or its file is gone.
    pub async fn open(&self, job_id: &JobId) -> FetchResult<Option<(Artifact, DeliveredFile)>> {
        let Some(artifact) = self.registry.get(job_id).await else {
            return Ok(None);
        };

        match deliver(&artifact.path).await {
            Ok(file) => Ok(Some((artifact, file))),
            Err(FetchError::Io { kind, .. }) if kind == format!("{:?}", ErrorKind::NotFound) => {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Delete a job's files now instead of waiting for the janitor.
    pub async fn release(&self, job_id: &JobId) -> bool {
        let artifact = self.registry.remove(job_id).await;
        let directory = artifact.as_ref().map_or_else(
            || job_directory(&self.settings.downloads_dir, job_id),
            |a| a.directory.clone(),
        );
        remove_job_directory(&directory).await;
        artifact.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use instafetch_core::{
        DownloaderError, DownloaderInvocation, DownloaderOutcome, FailureCategory,
        MockVideoDownloaderPort, ValidationError,
    };
    use tempfile::TempDir;

    const URL: &str = "https://www.instagram.com/reel/ABC123/";

    fn service(temp: &TempDir, mock: MockVideoDownloaderPort) -> FetchService {
        let settings = Settings {
            downloads_dir: temp.path().to_path_buf(),
            ..Settings::with_defaults()
        };
        FetchService::new(settings, Arc::new(mock), Arc::new(ArtifactRegistry::new()))
    }

    /// Mimic the downloader: expand the template and write `bytes` there.
    fn write_output(invocation: &DownloaderInvocation, ext: &str, bytes: &[u8]) {
        let path = invocation.output_template.replace("%(ext)s", ext);
        std::fs::write(path, bytes).unwrap();
    }

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn invalid_url_never_spawns_and_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let mut mock = MockVideoDownloaderPort::new();
        mock.expect_run().times(0);
        let service = service(&temp, mock);

        let err = service.fetch(FetchRequest::new("not-a-url")).await.unwrap_err();
        assert_eq!(
            err,
            FetchError::Validation(ValidationError::WrongHost {
                expected: "instagram.com".to_string()
            })
        );

        let err = service.fetch(FetchRequest::new("   ")).await.unwrap_err();
        assert_eq!(err, FetchError::Validation(ValidationError::Empty));
        assert_eq!(entries(temp.path()), 0);
    }

    #[tokio::test]
    async fn delivers_exact_bytes_and_registers_artifact() {
        let temp = TempDir::new().unwrap();
        let mut mock = MockVideoDownloaderPort::new();
        mock.expect_run().times(1).returning(|invocation, _| {
            write_output(invocation, "mp4", b"reel-bytes");
            Ok(DownloaderOutcome::succeeded(""))
        });
        let service = service(&temp, mock);

        let request = FetchRequest::new(URL).with_timestamp(1_700_000_000);
        let job_id = request.job_id;
        let video = service.fetch(request).await.unwrap();

        assert_eq!(video.bytes, b"reel-bytes");
        assert_eq!(video.file_name, "instagram_video_1700000000.mp4");
        assert_eq!(video.mime_type, "video/mp4");
        assert_eq!(
            video.path,
            temp.path()
                .join(job_id.to_string())
                .join("instagram_video_1700000000.mp4")
        );

        let artifact = service.registry().get(&job_id).await.unwrap();
        assert_eq!(artifact.size_bytes, 10);
        assert_eq!(artifact.expires_at, video.expires_at);
        assert_eq!(
            (artifact.expires_at - artifact.created_at).num_seconds(),
            300
        );

        let (_, file) = service.open(&job_id).await.unwrap().unwrap();
        assert_eq!(file.bytes, b"reel-bytes");
    }

    #[tokio::test]
    async fn zero_matches_reports_not_found_and_cleans_up() {
        let temp = TempDir::new().unwrap();
        let mut mock = MockVideoDownloaderPort::new();
        mock.expect_run()
            .returning(|_, _| Ok(DownloaderOutcome::succeeded("")));
        let service = service(&temp, mock);

        let err = service.fetch(FetchRequest::new(URL).with_timestamp(9)).await.unwrap_err();
        assert_eq!(
            err,
            FetchError::OutputNotFound {
                pattern: "instagram_video_9.*".to_string()
            }
        );
        assert_eq!(entries(temp.path()), 0);
        assert!(service.registry().is_empty().await);
    }

    #[tokio::test]
    async fn rate_limit_stderr_is_access_blocked() {
        let temp = TempDir::new().unwrap();
        let mut mock = MockVideoDownloaderPort::new();
        mock.expect_run().returning(|invocation, _| {
            // A partial file must not survive the failure
            write_output(invocation, "mp4.part", b"partial");
            Ok(DownloaderOutcome::failed(
                1,
                "ERROR: [Instagram] ABC123: Requested content is not available, rate-limit reached",
            ))
        });
        let service = service(&temp, mock);

        let err = service.fetch(FetchRequest::new(URL)).await.unwrap_err();
        assert_eq!(err.category(), Some(FailureCategory::AccessBlocked));
        assert!(err.hint().is_some());
        assert_eq!(entries(temp.path()), 0);
    }

    #[tokio::test]
    async fn timeout_surfaces_as_its_own_category() {
        let temp = TempDir::new().unwrap();
        let mut mock = MockVideoDownloaderPort::new();
        mock.expect_run()
            .returning(|_, _| Err(DownloaderError::TimedOut { after_secs: 600 }));
        let service = service(&temp, mock);

        let err = service.fetch(FetchRequest::new(URL)).await.unwrap_err();
        assert_eq!(err, FetchError::TimedOut { after_secs: 600 });
        assert_eq!(err.kind(), "timed_out");
    }

    #[tokio::test]
    async fn cancelled_before_admission_skips_the_downloader() {
        let temp = TempDir::new().unwrap();
        let mut mock = MockVideoDownloaderPort::new();
        mock.expect_run().times(0);
        let service = service(&temp, mock);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = service
            .fetch_with_cancel(FetchRequest::new(URL), cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(entries(temp.path()), 0);
    }

    #[tokio::test]
    async fn discarded_guard_removes_nested_job_directory() {
        let temp = TempDir::new().unwrap();
        let job_dir = temp.path().join("job");
        std::fs::create_dir_all(job_dir.join("fragments")).unwrap();
        std::fs::write(job_dir.join("fragments/frag1"), b"x").unwrap();
        std::fs::write(job_dir.join("instagram_video_1.mp4.part"), b"x").unwrap();

        JobDirGuard::new(job_dir.clone()).discard().await;

        assert!(!job_dir.exists());
    }

    #[tokio::test]
    async fn dropped_guard_still_removes_job_directory() {
        let temp = TempDir::new().unwrap();
        let job_dir = temp.path().join("job");
        std::fs::create_dir_all(&job_dir).unwrap();

        drop(JobDirGuard::new(job_dir.clone()));
        assert!(!job_dir.exists());

        // Already gone: neither path complains
        JobDirGuard::new(job_dir.clone()).discard().await;
        drop(JobDirGuard::new(job_dir));
    }

    #[tokio::test]
    async fn disarmed_guard_keeps_job_directory() {
        let temp = TempDir::new().unwrap();
        let job_dir = temp.path().join("job");
        std::fs::create_dir_all(&job_dir).unwrap();

        let mut guard = JobDirGuard::new(job_dir.clone());
        guard.disarm();
        drop(guard);

        assert!(job_dir.exists());
    }

    #[tokio::test]
    async fn release_deletes_files_immediately() {
        let temp = TempDir::new().unwrap();
        let mut mock = MockVideoDownloaderPort::new();
        mock.expect_run().returning(|invocation, _| {
            write_output(invocation, "webm", b"w");
            Ok(DownloaderOutcome::succeeded(""))
        });
        let service = service(&temp, mock);

        let video = service.fetch(FetchRequest::new(URL)).await.unwrap();
        assert!(video.path.exists());

        assert!(service.release(&video.job_id).await);
        assert!(!video.path.exists());
        assert!(service.open(&video.job_id).await.unwrap().is_none());
        assert!(!service.release(&video.job_id).await);
    }
}
