//! Batch-level and collaborator error types.
//!
//! Per-task download failures are not errors: they end as a
//! [`TaskStatus::Failed`](crate::task::TaskStatus) code. Only failures
//! that must stop a batch before any task is dispatched live here.

use std::path::PathBuf;

/// Precondition or setup failure that aborts a batch before dispatch.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// `urls` and `destinations` are not positionally paired.
    #[error("there must be as many destination paths as URLs ({urls} URLs, {destinations} destinations)")]
    LengthMismatch { urls: usize, destinations: usize },
    /// A destination path is empty.
    #[error("destination path {index} is empty")]
    EmptyDestination { index: usize },
    /// Two tasks would write the same file.
    #[error("destination path {index} ('{}') is already used by task {first}", path.display())]
    DuplicateDestination { index: usize, first: usize, path: PathBuf },
    /// A pool without workers would never drain.
    #[error("worker count must be a positive integer")]
    ZeroWorkers,
    /// The destination directory could not be created.
    #[error("the output directory cannot be created: '{}'", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of the publication metadata collaborator. Fatal for the whole run.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("error fetching author info for '{author_id}': {reason}")]
    AuthorLookup { author_id: String, reason: String },
    #[error("reading publication list {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing publication list {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_mismatch_message_names_both_counts() {
        let e = BatchError::LengthMismatch {
            urls: 3,
            destinations: 2,
        };
        let msg = e.to_string();
        assert!(msg.contains("3 URLs"));
        assert!(msg.contains("2 destinations"));
    }

    #[test]
    fn duplicate_destination_names_both_tasks() {
        let e = BatchError::DuplicateDestination {
            index: 4,
            first: 1,
            path: PathBuf::from("out/a.pdf"),
        };
        let msg = e.to_string();
        assert!(msg.contains("destination path 4"));
        assert!(msg.contains("task 1"));
        assert!(msg.contains("out/a.pdf"));
    }

    #[test]
    fn directory_error_keeps_source() {
        use std::error::Error;
        let e = BatchError::Directory {
            path: PathBuf::from("/nope"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(e.to_string().contains("/nope"));
        assert!(e.source().is_some());
    }
}
