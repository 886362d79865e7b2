//! Downloads directory preparation.

use std::fs;
use std::path::Path;

use super::error::PathError;

/// Name of the file written by [`verify_writable`].
const WRITE_TEST_FILE: &str = ".instafetch_write_test";

/// What [`ensure_directory`] does when the directory is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectoryCreationStrategy {
    /// Create it, parents included.
    #[default]
    AutoCreate,
    /// Fail with [`PathError::DirectoryNotFound`].
    Disallow,
}

/// Make sure `path` is an existing, writable directory.
pub fn ensure_directory(path: &Path, strategy: DirectoryCreationStrategy) -> Result<(), PathError> {
    if path.as_os_str().is_empty() {
        return Err(PathError::EmptyPath);
    }

    match (path.exists(), strategy) {
        (true, _) if !path.is_dir() => return Err(PathError::NotADirectory(path.to_path_buf())),
        (true, _) => {}
        (false, DirectoryCreationStrategy::Disallow) => {
            return Err(PathError::DirectoryNotFound(path.to_path_buf()));
        }
        (false, DirectoryCreationStrategy::AutoCreate) => {
            fs::create_dir_all(path).map_err(|e| PathError::CreateFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            tracing::debug!(
                target: "instafetch.paths",
                dir = %path.display(),
                "Created downloads directory"
            );
        }
    }

    verify_writable(path)
}

/// Check that files can be created in `path` by writing and removing a
/// small test file.
pub fn verify_writable(path: &Path) -> Result<(), PathError> {
    let test_file = path.join(WRITE_TEST_FILE);

    fs::write(&test_file, b"instafetch").map_err(|e| PathError::NotWritable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    // A leftover test file is harmless; `clean` sweeps it with the other loose files
    if let Err(e) = fs::remove_file(&test_file) {
        tracing::debug!(
            target: "instafetch.paths",
            file = %test_file.display(),
            error = %e,
            "Failed to remove write test file"
        );
    }

    Ok(())
}
