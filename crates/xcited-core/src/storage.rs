//! Destination directory preparation and partial-file cleanup.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::BatchError;

/// Ensures `path` exists as a directory and returns its canonical absolute form.
///
/// Creates all missing intermediate directories. Calling it on an existing
/// directory is a no-op. A batch must not start when this returns `Err`.
pub fn ensure_directory(path: &Path) -> Result<PathBuf, BatchError> {
    let absolute = std::path::absolute(path).map_err(|source| BatchError::Directory {
        path: path.to_path_buf(),
        source,
    })?;

    if absolute.is_dir() {
        tracing::info!("the output directory \"{}\" already exists", absolute.display());
    } else {
        fs::create_dir_all(&absolute).map_err(|source| BatchError::Directory {
            path: absolute.clone(),
            source,
        })?;
        tracing::info!("created the output directory \"{}\"", absolute.display());
    }

    absolute
        .canonicalize()
        .map_err(|source| BatchError::Directory {
            path: absolute,
            source,
        })
}

/// Removes a file left behind by a failed transfer. Missing files are fine.
pub(crate) fn remove_partial(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "removed partial download"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), "could not remove partial download: {}", e),
    }
}
