//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from
//! infrastructure. They contain no implementation details.
//!
//! # Design Rules
//!
//! - No `tokio::process` types in any signature
//! - Intent-based methods: callers describe what to run, adapters decide how

pub mod downloader;

pub use downloader::{
    DownloaderError, DownloaderInvocation, DownloaderOutcome, VideoDownloaderPort,
};

#[cfg(any(test, feature = "test-utils"))]
pub use downloader::MockVideoDownloaderPort;
