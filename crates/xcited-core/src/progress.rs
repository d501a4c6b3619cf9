//! Shared progress reporter for a batch of downloads.
//!
//! One reporter is constructed per batch and passed by reference to the
//! scheduler and every fetcher. All state sits behind a mutex, so workers can
//! register, advance and remove tasks concurrently. Rendering goes through
//! indicatif: one bar per in-flight task in [`DisplayMode::PerTask`], or a
//! single bar advanced once per finished task in [`DisplayMode::Aggregate`].

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::task::TaskId;

const TASK_BAR_TEMPLATE: &str =
    "{prefix:.bold.blue} {wide_bar} {percent:>3}% • {bytes}/{total_bytes} • {binary_bytes_per_sec} • {eta}";
const TASK_SPINNER_TEMPLATE: &str = "{prefix:.bold.blue} {spinner} {bytes} • {binary_bytes_per_sec}";
const AGGREGATE_TEMPLATE: &str = "{wide_bar} {pos}/{len} [{elapsed_precise}<{eta}]";
const SPINNER_TICK: Duration = Duration::from_millis(120);

/// How progress is displayed for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// One live bar per in-flight download (bytes, rate, ETA).
    PerTask,
    /// One coarse bar advancing once per completed task.
    Aggregate,
}

impl DisplayMode {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            DisplayMode::PerTask
        } else {
            DisplayMode::Aggregate
        }
    }
}

/// Snapshot of one registered task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskProgress {
    pub bytes_transferred: u64,
    /// `None` until the response advertises a content length.
    pub expected_total: Option<u64>,
    pub visible: bool,
    /// Set once the body starts streaming.
    pub started: bool,
}

impl TaskProgress {
    /// Fraction complete in [0.0, 1.0], or `None` when the total is unknown.
    pub fn fraction(&self) -> Option<f64> {
        match self.expected_total {
            Some(0) => Some(1.0),
            Some(total) => Some((self.bytes_transferred as f64 / total as f64).min(1.0)),
            None => None,
        }
    }
}

struct Entry {
    progress: TaskProgress,
    bar: Option<ProgressBar>,
}

pub struct ProgressReporter {
    mode: DisplayMode,
    multi: MultiProgress,
    tasks: Mutex<HashMap<TaskId, Entry>>,
    aggregate: Mutex<Option<ProgressBar>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    // A worker that panicked mid-update leaves plain counters behind; keep going.
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_bar())
}

fn bar_style() -> ProgressStyle {
    style(TASK_BAR_TEMPLATE).progress_chars("=> ")
}

impl ProgressReporter {
    /// Reporter drawing to stderr.
    pub fn new(mode: DisplayMode) -> Self {
        Self::with_multi(mode, MultiProgress::new())
    }

    /// Reporter that tracks state but never draws.
    pub fn hidden(mode: DisplayMode) -> Self {
        Self::with_multi(mode, MultiProgress::with_draw_target(ProgressDrawTarget::hidden()))
    }

    fn with_multi(mode: DisplayMode, multi: MultiProgress) -> Self {
        Self {
            mode,
            multi,
            tasks: Mutex::new(HashMap::new()),
            aggregate: Mutex::new(None),
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Prepares the aggregate indicator for `task_count` tasks. No-op in per-task mode.
    pub fn begin(&self, task_count: usize) {
        if self.mode != DisplayMode::Aggregate {
            return;
        }
        let bar = self.multi.add(ProgressBar::new(task_count as u64));
        bar.set_style(style(AGGREGATE_TEMPLATE).progress_chars("=> "));
        *lock(&self.aggregate) = Some(bar);
    }

    /// Registers a task. Its bar is only drawn in per-task mode, and the
    /// transfer clock does not run until [`start`](Self::start).
    pub fn add_task(&self, id: TaskId, label: &str, total: Option<u64>) -> TaskId {
        let visible = self.mode == DisplayMode::PerTask;
        let bar = visible.then(|| {
            let bar = match total {
                Some(len) => {
                    let bar = ProgressBar::new(len);
                    bar.set_style(bar_style());
                    bar
                }
                None => {
                    let bar = ProgressBar::new_spinner();
                    bar.set_style(style(TASK_SPINNER_TEMPLATE));
                    bar
                }
            };
            bar.set_prefix(label.to_string());
            self.multi.add(bar)
        });
        let entry = Entry {
            progress: TaskProgress {
                bytes_transferred: 0,
                expected_total: total,
                visible,
                started: false,
            },
            bar,
        };
        lock(&self.tasks).insert(id, entry);
        id
    }

    /// Sets the expected total (when `total` is `Some`) and advances the byte
    /// counter by `advance`. The counter never passes a known total.
    pub fn update(&self, id: TaskId, total: Option<u64>, advance: u64) {
        let mut tasks = lock(&self.tasks);
        let Some(entry) = tasks.get_mut(&id) else {
            return;
        };
        if let Some(total) = total {
            entry.progress.expected_total = Some(total);
            if let Some(bar) = &entry.bar {
                bar.set_length(total);
                bar.set_style(bar_style());
            }
        }
        let mut bytes = entry.progress.bytes_transferred.saturating_add(advance);
        if let Some(total) = entry.progress.expected_total {
            if bytes > total {
                tracing::debug!(task_id = %id, bytes, total, "progress clamped to expected total");
                bytes = total;
            }
        }
        entry.progress.bytes_transferred = bytes;
        if let Some(bar) = &entry.bar {
            bar.set_position(bytes);
        }
    }

    /// Marks the task as streaming and restarts its rate/ETA clock.
    pub fn start(&self, id: TaskId) {
        let mut tasks = lock(&self.tasks);
        let Some(entry) = tasks.get_mut(&id) else {
            return;
        };
        entry.progress.started = true;
        if let Some(bar) = &entry.bar {
            bar.reset_elapsed();
            bar.reset_eta();
            if entry.progress.expected_total.is_none() {
                bar.enable_steady_tick(SPINNER_TICK);
            }
        }
    }

    /// Deregisters the task and clears its bar. Returns the final snapshot.
    pub fn remove(&self, id: TaskId) -> Option<TaskProgress> {
        let entry = lock(&self.tasks).remove(&id)?;
        if let Some(bar) = entry.bar {
            bar.finish_and_clear();
            self.multi.remove(&bar);
        }
        Some(entry.progress)
    }

    pub fn snapshot(&self, id: TaskId) -> Option<TaskProgress> {
        lock(&self.tasks).get(&id).map(|e| e.progress)
    }

    /// Number of tasks currently registered.
    pub fn live_count(&self) -> usize {
        lock(&self.tasks).len()
    }

    /// Advances the aggregate indicator by one finished task.
    pub fn complete_one(&self) {
        if let Some(bar) = lock(&self.aggregate).as_ref() {
            bar.inc(1);
        }
    }

    /// Position of the aggregate indicator (finished tasks), if one is active.
    pub fn completed(&self) -> Option<u64> {
        lock(&self.aggregate).as_ref().map(|bar| bar.position())
    }

    /// Prints a line above the live bars (hidden reporters print nothing).
    pub fn println(&self, msg: impl AsRef<str>) {
        let _ = self.multi.println(msg);
    }

    /// Clears every remaining bar. Called once the batch has drained.
    pub fn finish(&self) {
        if let Some(bar) = lock(&self.aggregate).take() {
            bar.finish_and_clear();
            self.multi.remove(&bar);
        }
        for (_, entry) in lock(&self.tasks).drain() {
            if let Some(bar) = entry.bar {
                bar.finish_and_clear();
            }
        }
        let _ = self.multi.clear();
    }
}
