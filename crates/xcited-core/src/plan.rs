//! Turns an author's publications into a download batch and runs it.
//!
//! Layout produced: `<output_root>/<author_id>/<slugified year_title>.pdf`.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::downloader::FetchOptions;
use crate::error::BatchError;
use crate::naming;
use crate::progress::{DisplayMode, ProgressReporter};
use crate::publication::Publication;
use crate::scheduler::{self, BatchRequest, BatchResult};
use crate::storage;

/// Parallel URL/destination lists for the publications that have an eprint URL.
#[derive(Debug, Clone)]
pub struct DownloadPlan {
    pub author_dir: PathBuf,
    pub urls: Vec<String>,
    pub destinations: Vec<PathBuf>,
    /// All publications of the author, with or without a PDF.
    pub total_publications: usize,
}

impl DownloadPlan {
    /// Publications with a downloadable PDF.
    pub fn available(&self) -> usize {
        self.urls.len()
    }

    pub fn into_request(self, worker_count: usize, verbose: bool) -> BatchRequest {
        BatchRequest::new(self.urls, self.destinations)
            .with_workers(worker_count)
            .with_verbose(verbose)
    }
}

/// Destinations are unique within the plan: a repeated filename gets a
/// `-1`, `-2`, ... suffix in publication order.
pub fn plan_downloads(author_id: &str, pubs: &[Publication], output_root: &Path) -> DownloadPlan {
    let author_dir = output_root.join(author_id);
    let mut taken = HashSet::new();
    let (urls, destinations): (Vec<String>, Vec<PathBuf>) = pubs
        .iter()
        .filter_map(|p| {
            let url = p.eprint_url.as_deref()?.trim();
            if url.is_empty() {
                return None;
            }
            let filename = naming::publication_filename(&p.title, p.pub_year.as_deref());
            let filename = naming::unique_filename(&filename, &mut taken);
            Some((url.to_string(), author_dir.join(filename)))
        })
        .unzip();
    DownloadPlan {
        author_dir,
        urls,
        destinations,
        total_publications: pubs.len(),
    }
}

/// Final numbers of a run, printed by the CLI.
#[derive(Debug, Clone)]
pub struct DownloadSummary {
    pub succeeded: usize,
    pub attempted: usize,
    pub total_publications: usize,
    pub elapsed: Duration,
    pub author_dir: PathBuf,
}

impl DownloadSummary {
    fn from_batch(result: &BatchResult, total_publications: usize, author_dir: PathBuf) -> Self {
        Self {
            succeeded: result.succeeded_count,
            attempted: result.attempted(),
            total_publications,
            elapsed: result.elapsed,
            author_dir,
        }
    }
}

/// Plural suffix for "PDF".
pub fn plural(n: usize) -> &'static str {
    if n > 1 {
        "s"
    } else {
        ""
    }
}

impl fmt::Display for DownloadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Successfully downloaded {} out of {} PDF{} in {:.2} sec",
            self.succeeded,
            self.attempted,
            plural(self.attempted),
            self.elapsed.as_secs_f64()
        )
    }
}

/// Downloads the PDFs of `pubs` under `<output_root>/<author_id>/`.
pub fn download_publications(
    author_id: &str,
    pubs: &[Publication],
    output_root: &Path,
    worker_count: usize,
    reporter: &ProgressReporter,
    opts: &FetchOptions,
) -> Result<DownloadSummary, BatchError> {
    let plan = plan_downloads(author_id, pubs, output_root);
    let total = plan.total_publications;
    tracing::info!(
        author_id,
        available = plan.available(),
        total,
        "downloading PDF{} ({}/{} available)",
        plural(plan.available()),
        plan.available(),
        total
    );
    let author_dir = plan.author_dir.clone();
    let verbose = reporter.mode() == DisplayMode::PerTask;
    let request = plan.into_request(worker_count, verbose);
    if request.urls.is_empty() {
        storage::ensure_directory(&author_dir)?;
    }
    let result = scheduler::download_all_with(&request, opts, reporter)?;
    Ok(DownloadSummary::from_batch(&result, total, author_dir))
}
