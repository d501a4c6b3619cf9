//! Download task model shared by the fetcher, the progress reporter and the scheduler.

use std::fmt;
use std::path::PathBuf;

use crate::downloader::status;

/// Identifier of one task within a batch: its position in the input arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub usize);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Running,
    Succeeded,
    /// Terminal failure with the fetcher's status code (HTTP status or a negative sentinel).
    Failed(i32),
}

impl TaskStatus {
    /// Maps a fetcher status code to a terminal status: only 200 succeeds.
    pub fn from_code(code: i32) -> Self {
        if code == status::OK {
            TaskStatus::Succeeded
        } else {
            TaskStatus::Failed(code)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TaskStatus::Succeeded)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Succeeded | TaskStatus::Failed(_))
    }
}

/// One (URL, destination) unit of work. Owned by the worker executing it.
#[derive(Debug, Clone)]
pub struct DownloadTask {
    pub id: TaskId,
    pub url: String,
    pub destination_path: PathBuf,
    pub label: String,
    pub expected_total_bytes: Option<u64>,
    pub bytes_transferred: u64,
    pub status: TaskStatus,
}

impl DownloadTask {
    pub fn new(id: TaskId, url: String, destination_path: PathBuf, label: String) -> Self {
        Self {
            id,
            url,
            destination_path,
            label,
            expected_total_bytes: None,
            bytes_transferred: 0,
            status: TaskStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_200_succeeds() {
        assert_eq!(TaskStatus::from_code(200), TaskStatus::Succeeded);
        assert_eq!(TaskStatus::from_code(206), TaskStatus::Failed(206));
        assert_eq!(TaskStatus::from_code(404), TaskStatus::Failed(404));
        assert_eq!(TaskStatus::from_code(-1), TaskStatus::Failed(-1));
    }

    #[test]
    fn terminal_states() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(TaskStatus::Succeeded.is_terminal());
        assert!(TaskStatus::Failed(408).is_terminal());
    }
}
