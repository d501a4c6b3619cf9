//! Fetch status codes and curl error classification.
//!
//! A fetch always ends in one integer: the HTTP status when a response was
//! received, 408 for timeouts and connection-level failures, or a negative
//! sentinel when no meaningful HTTP status exists.

/// Full body written to the destination.
pub const OK: i32 = 200;
/// Connect/read timeout or other connection-level transport failure.
pub const TIMEOUT: i32 = 408;
/// URL could not be parsed or is not http(s). No network I/O happened.
pub const MALFORMED_URL: i32 = -1;
/// Body ended before the advertised length.
pub const INCOMPLETE: i32 = -1;
/// Unclassified transport error or local file failure during the transfer.
pub const TRANSPORT: i32 = -2;

/// True when `url` is an absolute http or https URL.
pub fn is_http_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(u) => (u.scheme() == "http" || u.scheme() == "https") && u.has_host(),
        Err(_) => false,
    }
}

/// True when curl failed while negotiating TLS or validating the peer certificate.
pub fn is_tls_error(e: &curl::Error) -> bool {
    e.is_ssl_connect_error()
        || e.is_peer_failed_verification()
        || e.is_ssl_certproblem()
        || e.is_ssl_cacert_badfile()
}

/// Maps a curl transfer error to a fetch status code.
pub fn classify_curl_error(e: &curl::Error) -> i32 {
    if e.is_partial_file() {
        return INCOMPLETE;
    }
    if e.is_url_malformed() || e.is_unsupported_protocol() {
        return MALFORMED_URL;
    }
    if e.is_operation_timedout()
        || e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || is_tls_error(e)
    {
        return TIMEOUT;
    }
    TRANSPORT
}
