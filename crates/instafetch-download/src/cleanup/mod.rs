//! Artifact lifecycle: registration, expiry and deletion.
//!
//! # Structure
//!
//! - `registry` - Time-indexed map of files awaiting deletion
//! - `janitor` - The single background task that evicts expired artifacts
//! - `sweep` - Filesystem helpers (`sweep_directory`, `prune_orphans`)

mod janitor;
mod registry;
mod sweep;

pub use janitor::{Janitor, JanitorHandle, evict};
pub use registry::ArtifactRegistry;
pub use sweep::{prune_orphans, remove_job_directory, sweep_directory};
