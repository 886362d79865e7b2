//! In-memory registry of delivered files awaiting deletion.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use instafetch_core::{Artifact, JobId};

#[derive(Debug, Default)]
struct RegistryState {
    /// Expiry instant -> jobs due at that instant.
    by_expiry: BTreeMap<DateTime<Utc>, Vec<JobId>>,
    artifacts: HashMap<JobId, Artifact>,
}

impl RegistryState {
    fn unindex(&mut self, artifact: &Artifact) {
        if let Some(ids) = self.by_expiry.get_mut(&artifact.expires_at) {
            ids.retain(|id| id != &artifact.job_id);
            if ids.is_empty() {
                self.by_expiry.remove(&artifact.expires_at);
            }
        }
    }
}

/// Time-indexed set of artifacts.
///
/// Lookups by job id serve file requests; the expiry index lets the janitor
/// pop everything that is due without scanning the whole map.
#[derive(Debug, Default)]
pub struct ArtifactRegistry {
    state: Mutex<RegistryState>,
}

impl ArtifactRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track an artifact until it expires. Re-registering a job replaces it.
    pub async fn register(&self, artifact: Artifact) {
        let mut state = self.state.lock().await;
        if let Some(previous) = state.artifacts.remove(&artifact.job_id) {
            state.unindex(&previous);
        }
        state
            .by_expiry
            .entry(artifact.expires_at)
            .or_default()
            .push(artifact.job_id);
        state.artifacts.insert(artifact.job_id, artifact);
    }

    /// The artifact for `job_id`, if it exists and has not expired yet.
    pub async fn get(&self, job_id: &JobId) -> Option<Artifact> {
        self.get_at(job_id, Utc::now()).await
    }

    /// Like [`get`](Self::get), evaluated at `now`.
    pub async fn get_at(&self, job_id: &JobId, now: DateTime<Utc>) -> Option<Artifact> {
        let state = self.state.lock().await;
        state
            .artifacts
            .get(job_id)
            .filter(|a| !a.is_expired(now))
            .cloned()
    }

    /// Stop tracking `job_id`, returning its artifact.
    pub async fn remove(&self, job_id: &JobId) -> Option<Artifact> {
        let mut state = self.state.lock().await;
        let artifact = state.artifacts.remove(job_id)?;
        state.unindex(&artifact);
        Some(artifact)
    }

    /// Remove and return every artifact due at or before `now`.
    pub async fn take_expired(&self, now: DateTime<Utc>) -> Vec<Artifact> {
        let mut state = self.state.lock().await;
        let due: Vec<DateTime<Utc>> = state.by_expiry.range(..=now).map(|(at, _)| *at).collect();

        let mut expired = Vec::new();
        for at in due {
            for id in state.by_expiry.remove(&at).unwrap_or_default() {
                if let Some(artifact) = state.artifacts.remove(&id) {
                    expired.push(artifact);
                }
            }
        }
        expired
    }

    /// Remove and return every artifact regardless of expiry.
    pub async fn drain(&self) -> Vec<Artifact> {
        let mut state = self.state.lock().await;
        state.by_expiry.clear();
        state.artifacts.drain().map(|(_, a)| a).collect()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.artifacts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.artifacts.is_empty()
    }
}
