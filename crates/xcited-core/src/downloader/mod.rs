//! Single-item fetcher.
//!
//! Streams one URL into one destination file over libcurl, reporting bytes to
//! the shared [`ProgressReporter`]. Never fails past its boundary: every
//! outcome is a status code (see [`status`]).
//!
//! The request first goes out over the verified transport. Only when that
//! fails during TLS negotiation, and the fallback is enabled, is one more
//! attempt made with certificate verification disabled.

mod handler;
pub mod status;
mod transport;

use std::path::Path;
use std::time::Duration;

use crate::config::XcitedConfig;
use crate::progress::ProgressReporter;
use crate::task::TaskId;

pub use transport::Transport;
use transport::AttemptOutcome;

/// Per-request settings shared by every task of a batch.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub user_agent: String,
    /// Connect timeout, and how long the transfer may go without receiving data.
    pub timeout: Duration,
    /// Receive buffer size; bounds each progress advance.
    pub chunk_size: usize,
    /// Allow the relaxed-TLS second attempt.
    pub tls_fallback: bool,
    pub proxy: Option<String>,
}

impl FetchOptions {
    pub fn from_config(cfg: &XcitedConfig) -> Self {
        Self {
            user_agent: cfg.user_agent.clone(),
            timeout: Duration::from_secs(cfg.timeout_secs),
            chunk_size: cfg.chunk_size,
            tls_fallback: cfg.tls_fallback,
            proxy: cfg.proxy.clone(),
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from_config(&XcitedConfig::default())
    }
}

/// What one fetch produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOutcome {
    /// 200 on success; otherwise the HTTP status or a negative sentinel.
    pub status: i32,
    pub bytes_transferred: u64,
    pub expected_total_bytes: Option<u64>,
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        self.status == status::OK
    }
}

/// Downloads `url` into `destination` (whose parent directory must exist).
///
/// On 200 the file holds the full body. On any other outcome the file is
/// absent. The task's progress entry is removed before returning, whatever
/// the outcome.
pub fn fetch(
    task_id: TaskId,
    url: &str,
    destination: &Path,
    reporter: &ProgressReporter,
    opts: &FetchOptions,
) -> FetchOutcome {
    let status = fetch_status(task_id, url, destination, reporter, opts);
    let last = reporter.remove(task_id);
    FetchOutcome {
        status,
        bytes_transferred: last.map(|p| p.bytes_transferred).unwrap_or(0),
        expected_total_bytes: last.and_then(|p| p.expected_total),
    }
}

fn fetch_status(
    task_id: TaskId,
    url: &str,
    destination: &Path,
    reporter: &ProgressReporter,
    opts: &FetchOptions,
) -> i32 {
    if !status::is_http_url(url) {
        tracing::warn!(task_id = %task_id, url, "malformed URL");
        return status::MALFORMED_URL;
    }
    with_tls_fallback(task_id, url, opts.tls_fallback, |mode| {
        transport::attempt(mode, task_id, url, destination, reporter, opts)
    })
}

/// Runs a verified attempt, then at most one insecure attempt when the first
/// failed in TLS negotiation and `tls_fallback` allows it. A TLS failure
/// that is not retried, or that repeats, ends as [`status::TIMEOUT`].
fn with_tls_fallback<A>(task_id: TaskId, url: &str, tls_fallback: bool, mut attempt: A) -> i32
where
    A: FnMut(Transport) -> AttemptOutcome,
{
    match attempt(Transport::Verified) {
        AttemptOutcome::Response(code) | AttemptOutcome::OtherFailure(code) => code,
        AttemptOutcome::TlsFailure(e) if tls_fallback => {
            tracing::warn!(task_id = %task_id, url, "TLS failure ({}), retrying without certificate verification", e);
            match attempt(Transport::Insecure) {
                AttemptOutcome::Response(code) | AttemptOutcome::OtherFailure(code) => code,
                AttemptOutcome::TlsFailure(e) => {
                    tracing::warn!(task_id = %task_id, url, "TLS failure without verification: {}", e);
                    status::TIMEOUT
                }
            }
        }
        AttemptOutcome::TlsFailure(e) => {
            tracing::warn!(task_id = %task_id, url, "TLS failure: {}", e);
            status::TIMEOUT
        }
    }
}
