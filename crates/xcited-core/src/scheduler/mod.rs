//! Batch coordinator.
//!
//! Validates a [`BatchRequest`], makes sure every destination directory
//! exists, registers one progress task per (URL, destination) pair, runs the
//! fetches on a bounded [`pool`] and tallies the outcomes as they complete.
//! Per-task failures never fail the batch; only precondition and setup
//! problems do, and those are reported before any request is sent.

pub mod pool;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::downloader::{self, FetchOptions, FetchOutcome};
use crate::error::BatchError;
use crate::naming;
use crate::progress::{DisplayMode, ProgressReporter};
use crate::storage;
use crate::task::{DownloadTask, TaskId, TaskStatus};

pub const DEFAULT_WORKERS: usize = 4;

/// Parallel URL/destination arrays plus pool settings.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub urls: Vec<String>,
    /// Same length as `urls`; `destinations[i]` receives `urls[i]`.
    pub destinations: Vec<PathBuf>,
    pub worker_count: usize,
    /// Per-task progress bars when true, one aggregate bar otherwise.
    pub verbose: bool,
}

impl BatchRequest {
    pub fn new(urls: Vec<String>, destinations: Vec<PathBuf>) -> Self {
        Self {
            urls,
            destinations,
            worker_count: DEFAULT_WORKERS,
            verbose: false,
        }
    }

    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Checks the positional pairing, that every destination is non-empty and
    /// that no two tasks share a destination file.
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.urls.len() != self.destinations.len() {
            return Err(BatchError::LengthMismatch {
                urls: self.urls.len(),
                destinations: self.destinations.len(),
            });
        }
        if self.worker_count == 0 {
            return Err(BatchError::ZeroWorkers);
        }
        if let Some(index) = self.destinations.iter().position(|d| d.as_os_str().is_empty()) {
            return Err(BatchError::EmptyDestination { index });
        }
        let mut seen: HashMap<&Path, usize> = HashMap::with_capacity(self.destinations.len());
        for (index, dest) in self.destinations.iter().enumerate() {
            if let Some(&first) = seen.get(dest.as_path()) {
                return Err(BatchError::DuplicateDestination {
                    index,
                    first,
                    path: dest.clone(),
                });
            }
            seen.insert(dest.as_path(), index);
        }
        Ok(())
    }

    fn tasks(&self) -> Vec<DownloadTask> {
        self.urls
            .iter()
            .zip(&self.destinations)
            .enumerate()
            .map(|(i, (url, dest))| {
                let filename = dest
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                DownloadTask::new(TaskId(i), url.clone(), dest.clone(), naming::task_label(i, &filename))
            })
            .collect()
    }
}

/// Outcome of one batch. Immutable once returned.
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Tasks whose fetch returned 200.
    pub succeeded_count: usize,
    pub per_task_status: BTreeMap<TaskId, TaskStatus>,
    /// Task ids in the order they finished.
    pub completion_order: Vec<TaskId>,
    pub elapsed: Duration,
}

impl BatchResult {
    pub fn attempted(&self) -> usize {
        self.per_task_status.len()
    }

    pub fn failed_count(&self) -> usize {
        self.attempted() - self.succeeded_count
    }

    pub fn status(&self, id: TaskId) -> Option<TaskStatus> {
        self.per_task_status.get(&id).copied()
    }
}

/// Downloads every `urls[i]` into `destinations[i]` with a fresh progress
/// display on stderr, sized by `request.verbose`.
pub fn download_all(request: &BatchRequest, opts: &FetchOptions) -> Result<BatchResult, BatchError> {
    request.validate()?;
    let reporter = ProgressReporter::new(DisplayMode::from_verbose(request.verbose));
    download_all_with(request, opts, &reporter)
}

/// Like [`download_all`] but reports into the given reporter.
pub fn download_all_with(
    request: &BatchRequest,
    opts: &FetchOptions,
    reporter: &ProgressReporter,
) -> Result<BatchResult, BatchError> {
    run_batch(request, reporter, |task, reporter| {
        downloader::fetch(task.id, &task.url, &task.destination_path, reporter, opts)
    })
}

fn prepare_directories(destinations: &[PathBuf]) -> Result<(), BatchError> {
    let parents: BTreeSet<&Path> = destinations
        .iter()
        .filter_map(|d| d.parent())
        .filter(|p| !p.as_os_str().is_empty())
        .collect();
    for dir in parents {
        storage::ensure_directory(dir)?;
    }
    Ok(())
}

/// Batch driver with a pluggable per-task job.
pub fn run_batch<F>(request: &BatchRequest, reporter: &ProgressReporter, job: F) -> Result<BatchResult, BatchError>
where
    F: Fn(&DownloadTask, &ProgressReporter) -> FetchOutcome + Sync,
{
    request.validate()?;
    prepare_directories(&request.destinations)?;

    let start = Instant::now();
    let tasks = request.tasks();
    for task in &tasks {
        reporter.add_task(task.id, &task.label, None);
    }
    reporter.begin(tasks.len());
    tracing::info!(
        tasks = tasks.len(),
        workers = request.worker_count,
        verbose = request.verbose,
        "batch started"
    );

    let mut succeeded_count = 0usize;
    let mut completion_order = Vec::with_capacity(tasks.len());
    let finished = pool::run_tasks(tasks, request.worker_count, reporter, job, |task| {
        completion_order.push(task.id);
        match task.status {
            TaskStatus::Succeeded => {
                succeeded_count += 1;
                tracing::debug!(task_id = %task.id, bytes = task.bytes_transferred, "downloaded {}", task.destination_path.display());
            }
            TaskStatus::Failed(code) => {
                tracing::warn!(task_id = %task.id, url = %task.url, status = code, "download failed");
            }
            TaskStatus::Pending | TaskStatus::Running => {}
        }
        reporter.complete_one();
    });
    reporter.finish();

    let per_task_status = finished.iter().map(|t| (t.id, t.status)).collect();
    let result = BatchResult {
        succeeded_count,
        per_task_status,
        completion_order,
        elapsed: start.elapsed(),
    };
    tracing::info!(
        succeeded = result.succeeded_count,
        attempted = result.attempted(),
        elapsed_secs = result.elapsed.as_secs_f64(),
        "batch finished"
    );
    Ok(result)
}
