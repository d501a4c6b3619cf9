//! One transfer attempt over libcurl, verified or with TLS checks relaxed.

use std::path::Path;
use std::time::Duration;

use curl::easy::Easy2;

use super::handler::FileHandler;
use super::status;
use super::FetchOptions;
use crate::progress::ProgressReporter;
use crate::storage;
use crate::task::TaskId;

/// Which transport carries the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Default: full certificate and host verification.
    Verified,
    /// Fallback after a TLS negotiation failure: peer and host verification off.
    Insecure,
}

/// Tagged result of one attempt.
#[derive(Debug)]
pub(super) enum AttemptOutcome {
    /// A response was received; carries its status (200 means the file is complete).
    Response(i32),
    /// TLS handshake or certificate validation failed before any response.
    TlsFailure(curl::Error),
    /// Any other failure, already mapped to a status code.
    OtherFailure(i32),
}

fn configure(easy: &mut Easy2<FileHandler<'_>>, url: &str, transport: Transport, opts: &FetchOptions) -> Result<(), curl::Error> {
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.useragent(&opts.user_agent)?;
    // Enable the in-memory cookie engine; some hosts set a cookie on a redirect hop.
    easy.cookie_file("")?;
    easy.connect_timeout(opts.timeout)?;
    // Read timeout: abort when nothing arrives for `timeout`.
    easy.low_speed_limit(1)?;
    easy.low_speed_time(opts.timeout.max(Duration::from_secs(1)))?;
    easy.buffer_size(opts.chunk_size)?;
    if let Some(proxy) = &opts.proxy {
        easy.proxy(proxy)?;
    }
    if transport == Transport::Insecure {
        easy.ssl_verify_peer(false)?;
        easy.ssl_verify_host(false)?;
    }
    Ok(())
}

/// Runs one GET of `url` into `destination`. The file is closed on every path
/// and removed again when the transfer does not complete.
pub(super) fn attempt(
    transport: Transport,
    task_id: TaskId,
    url: &str,
    destination: &Path,
    reporter: &ProgressReporter,
    opts: &FetchOptions,
) -> AttemptOutcome {
    let mut easy = Easy2::new(FileHandler::new(task_id, destination, reporter));
    if let Err(e) = configure(&mut easy, url, transport, opts) {
        tracing::warn!(task_id = %task_id, url, "curl setup failed: {}", e);
        return AttemptOutcome::OtherFailure(status::classify_curl_error(&e));
    }

    let performed = easy.perform();
    let response_code = easy.response_code().ok().filter(|c| *c != 0);
    let handler = easy.get_mut();
    let created = handler.created_file();
    let close_result = handler.close();
    let header_status = handler.status;
    let io_failed = handler.io_error.is_some();
    let bytes_written = handler.bytes_written;
    let content_length = handler.content_length;

    let outcome = match performed {
        Ok(()) => {
            let code = response_code.or(header_status).map(|c| c as i32).unwrap_or(status::TRANSPORT);
            if code != status::OK {
                AttemptOutcome::Response(code)
            } else if let Err(e) = close_result {
                tracing::warn!(task_id = %task_id, "closing destination failed: {}", e);
                AttemptOutcome::OtherFailure(status::TRANSPORT)
            } else if content_length.is_some_and(|len| len != bytes_written) {
                AttemptOutcome::OtherFailure(status::INCOMPLETE)
            } else if !created {
                // 200 with an empty body: the destination still has to exist.
                match handler.open_destination().and_then(|()| handler.close()) {
                    Ok(()) => AttemptOutcome::Response(status::OK),
                    Err(e) => {
                        tracing::warn!(task_id = %task_id, "cannot create destination: {}", e);
                        AttemptOutcome::OtherFailure(status::TRANSPORT)
                    }
                }
            } else {
                AttemptOutcome::Response(status::OK)
            }
        }
        Err(e) => match header_status {
            Some(code) if code != 200 => AttemptOutcome::Response(code as i32),
            _ if io_failed => AttemptOutcome::OtherFailure(status::TRANSPORT),
            _ if status::is_tls_error(&e) => AttemptOutcome::TlsFailure(e),
            _ => {
                tracing::debug!(task_id = %task_id, url, "transfer failed: {}", e);
                AttemptOutcome::OtherFailure(status::classify_curl_error(&e))
            }
        },
    };

    if created && !matches!(outcome, AttemptOutcome::Response(status::OK)) {
        storage::remove_partial(destination);
    }
    outcome
}
