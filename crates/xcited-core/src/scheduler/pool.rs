//! Bounded worker pool: a shared work queue drained by a fixed number of
//! scoped OS threads, with results collected in completion order.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Mutex, PoisonError};

use crate::downloader::{status, FetchOutcome};
use crate::progress::ProgressReporter;
use crate::task::{DownloadTask, TaskStatus};

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Runs `job` once per task on at most `worker_count` threads.
///
/// Every task comes back exactly once with a terminal status. `on_done` runs
/// on the calling thread as each task finishes, first-finished first. A job
/// that panics fails only its own task; the worker moves on to the next one.
/// All threads are joined before this returns.
pub fn run_tasks<F, D>(
    tasks: Vec<DownloadTask>,
    worker_count: usize,
    reporter: &ProgressReporter,
    job: F,
    mut on_done: D,
) -> Vec<DownloadTask>
where
    F: Fn(&DownloadTask, &ProgressReporter) -> FetchOutcome + Sync,
    D: FnMut(&DownloadTask),
{
    let count = tasks.len();
    if count == 0 {
        return Vec::new();
    }
    let num_workers = worker_count.max(1).min(count);
    let work: Mutex<VecDeque<DownloadTask>> = Mutex::new(tasks.into_iter().collect());
    let (tx, rx) = mpsc::channel::<DownloadTask>();
    let job = &job;
    let work = &work;

    std::thread::scope(|s| {
        for _ in 0..num_workers {
            let tx = tx.clone();
            s.spawn(move || loop {
                let next = work.lock().unwrap_or_else(PoisonError::into_inner).pop_front();
                let Some(mut task) = next else {
                    break;
                };
                task.status = TaskStatus::Running;
                tracing::debug!(task_id = %task.id, url = %task.url, "task started");

                match panic::catch_unwind(AssertUnwindSafe(|| job(&task, reporter))) {
                    Ok(outcome) => {
                        task.bytes_transferred = outcome.bytes_transferred;
                        task.expected_total_bytes = outcome.expected_total_bytes;
                        task.status = TaskStatus::from_code(outcome.status);
                    }
                    Err(payload) => {
                        let msg = panic_message(payload.as_ref());
                        tracing::error!(task_id = %task.id, url = %task.url, "task panicked: {}", msg);
                        reporter.println(format!("{:?} generated the following exception: {}", task.url, msg));
                        reporter.remove(task.id);
                        task.status = TaskStatus::Failed(status::TRANSPORT);
                    }
                }
                if tx.send(task).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        let mut finished = Vec::with_capacity(count);
        while let Ok(task) = rx.recv() {
            on_done(&task);
            finished.push(task);
        }
        finished
    })
}
