//! Downloader execution and artifact lifecycle for instafetch.
//!
//! # Structure
//!
//! - `invoker` - Builds the downloader command line and runs it as a subprocess
//! - `locator` - Finds the file the downloader produced
//! - `deliverer` - Reads that file into memory with its MIME type
//! - `cleanup` - Artifact registry, janitor task and directory sweeping
//! - `service` - `FetchService`, the end-to-end fetch pipeline
//!
//! Every request writes into its own job directory, so concurrent requests
//! never see or delete each other's files.

// Re-export core types for convenience
pub use instafetch_core::{
    Artifact, DeliveredVideo, DownloaderInvocation, DownloaderOutcome, FetchError, FetchRequest,
    FetchResult, JobId, Settings, VideoDownloaderPort,
};

pub mod cleanup;
mod deliverer;
mod invoker;
mod locator;
mod service;

pub use cleanup::{
    ArtifactRegistry, Janitor, JanitorHandle, evict, prune_orphans, remove_job_directory,
    sweep_directory,
};
pub use deliverer::{DeliveredFile, deliver, mime_for_path};
pub use invoker::{YtDlpInvoker, build_invocation, output_template, resolve_program};
pub use locator::locate_output;
pub use service::FetchService;
