//! Background eviction of expired artifacts.
//!
//! One janitor runs per process. It wakes every `interval`, pops whatever
//! the registry says is due and deletes the matching job directories.
//! Failures are logged and never surface to requests.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use instafetch_core::Artifact;

use super::registry::ArtifactRegistry;
use super::sweep::remove_job_directory;

/// Delete the job directories of `artifacts`. Returns how many were evicted.
pub async fn evict(artifacts: Vec<Artifact>) -> usize {
    let count = artifacts.len();
    for artifact in artifacts {
        let removed = remove_job_directory(&artifact.directory).await;
        tracing::debug!(
            target: "instafetch.cleanup",
            job_id = %artifact.job_id,
            files = removed,
            "Evicted artifact"
        );
    }
    count
}

/// Configuration for the janitor task.
#[derive(Debug, Clone)]
pub struct Janitor {
    registry: Arc<ArtifactRegistry>,
    interval: Duration,
    purge_on_shutdown: bool,
}

impl Janitor {
    /// A zero `interval` is raised to one millisecond.
    pub fn new(registry: Arc<ArtifactRegistry>, interval: Duration) -> Self {
        Self {
            registry,
            interval: interval.max(Duration::from_millis(1)),
            purge_on_shutdown: true,
        }
    }

    /// Whether [`JanitorHandle::shutdown`] deletes artifacts that have not expired yet.
    #[must_use]
    pub const fn with_purge_on_shutdown(mut self, purge: bool) -> Self {
        self.purge_on_shutdown = purge;
        self
    }

    /// Run one eviction pass now.
    pub async fn run_once(&self) -> usize {
        evict(self.registry.take_expired(Utc::now()).await).await
    }

    /// Start the background task. Must be called inside a tokio runtime.
    pub fn spawn(self) -> JanitorHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let registry = Arc::clone(&self.registry);
        let purge_on_shutdown = self.purge_on_shutdown;

        tracing::info!(
            target: "instafetch.cleanup",
            interval_secs = self.interval.as_secs_f64(),
            "Janitor started"
        );

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let evicted = self.run_once().await;
                        if evicted > 0 {
                            tracing::info!(
                                target: "instafetch.cleanup",
                                evicted,
                                "Deleted expired downloads"
                            );
                        }
                    }
                }
            }
        });

        JanitorHandle {
            cancel,
            task,
            registry,
            purge_on_shutdown,
        }
    }
}

/// Owner of the running janitor task.
#[derive(Debug)]
pub struct JanitorHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
    registry: Arc<ArtifactRegistry>,
    purge_on_shutdown: bool,
}

impl JanitorHandle {
    /// Whether the task is still running.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the task and wait for it to finish.
    ///
    /// With purging enabled, every artifact still registered is deleted too.
    /// Returns the number of artifacts purged.
    pub async fn shutdown(self) -> usize {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::warn!(target: "instafetch.cleanup", error = %e, "Janitor task failed");
        }

        let purged = if self.purge_on_shutdown {
            evict(self.registry.drain().await).await
        } else {
            0
        };

        tracing::info!(target: "instafetch.cleanup", purged, "Janitor stopped");
        purged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use instafetch_core::JobId;
    use std::path::Path;
    use tempfile::TempDir;

    fn artifact_in(root: &Path, expires_in_secs: i64) -> Artifact {
        let job_id = JobId::new();
        let directory = root.join(job_id.to_string());
        std::fs::create_dir_all(&directory).unwrap();
        let path = directory.join("instagram_video_1.mp4");
        std::fs::write(&path, b"video").unwrap();
        let now = Utc::now();
        Artifact {
            job_id,
            directory,
            path,
            file_name: "instagram_video_1.mp4".to_string(),
            mime_type: "video/mp4".to_string(),
            size_bytes: 5,
            created_at: now,
            expires_at: now + ChronoDuration::seconds(expires_in_secs),
        }
    }

    #[tokio::test]
    async fn run_once_evicts_only_expired() {
        let temp = TempDir::new().unwrap();
        let registry = Arc::new(ArtifactRegistry::new());
        let old = artifact_in(temp.path(), -1);
        let fresh = artifact_in(temp.path(), 300);
        registry.register(old.clone()).await;
        registry.register(fresh.clone()).await;

        let janitor = Janitor::new(Arc::clone(&registry), Duration::from_secs(15));
        assert_eq!(janitor.run_once().await, 1);

        assert!(!old.directory.exists());
        assert!(fresh.path.exists());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn background_task_evicts_and_shutdown_purges() {
        let temp = TempDir::new().unwrap();
        let registry = Arc::new(ArtifactRegistry::new());
        let old = artifact_in(temp.path(), -1);
        let fresh = artifact_in(temp.path(), 300);
        registry.register(old.clone()).await;
        registry.register(fresh.clone()).await;

        let handle = Janitor::new(Arc::clone(&registry), Duration::from_millis(10)).spawn();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(handle.is_running());
        assert!(!old.directory.exists());
        assert!(fresh.path.exists());

        assert_eq!(handle.shutdown().await, 1);
        assert!(!fresh.directory.exists());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn shutdown_without_purge_keeps_files() {
        let temp = TempDir::new().unwrap();
        let registry = Arc::new(ArtifactRegistry::new());
        let fresh = artifact_in(temp.path(), 300);
        registry.register(fresh.clone()).await;

        let handle = Janitor::new(Arc::clone(&registry), Duration::from_secs(15))
            .with_purge_on_shutdown(false)
            .spawn();

        assert_eq!(handle.shutdown().await, 0);
        assert!(fresh.path.exists());
        assert_eq!(registry.len().await, 1);
    }
}
