//! Path utilities for the downloads directory.
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - Every request gets its own job directory under the downloads directory

mod ensure;
mod error;

use std::path::{Path, PathBuf};

use crate::fetch::JobId;

pub use ensure::{DirectoryCreationStrategy, ensure_directory, verify_writable};
pub use error::PathError;

/// Directory holding the files of a single job.
pub fn job_directory(downloads_dir: &Path, job_id: &JobId) -> PathBuf {
    downloads_dir.join(job_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_directory_is_a_direct_child() {
        let id = JobId::new();
        let dir = job_directory(Path::new("downloads"), &id);
        assert_eq!(dir.parent(), Some(Path::new("downloads")));
        assert_eq!(dir.file_name().unwrap().to_string_lossy(), id.to_string());
    }
}
