//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed table of paths, each with a canned behavior: full body,
//! error status, stall, delayed body, truncated body, redirect. Every
//! connection is handled on its own thread so the server never limits
//! client-side parallelism.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Route {
    /// 200 with Content-Length.
    Ok(Vec<u8>),
    /// 200 without Content-Length; body ends when the connection closes.
    OkNoLength(Vec<u8>),
    /// Given status with a short text body.
    Status(u16),
    /// Read the request, then say nothing for this long and close.
    Stall(Duration),
    /// Wait, then 200 with the body.
    Delayed(Duration, Vec<u8>),
    /// Advertise `advertised` bytes, send `body`, close.
    Truncated { advertised: usize, body: Vec<u8> },
    /// 302 to another path on this server.
    Redirect(String),
    /// 200 only when the request carries this User-Agent, 403 otherwise.
    RequireAgent(String, Vec<u8>),
}

pub struct TestServer {
    base: String,
    hits: Arc<AtomicUsize>,
}

impl TestServer {
    /// Absolute URL for `path` (e.g. "/a.pdf").
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Number of requests received so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start(routes: Vec<(&str, Route)>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, Route>> =
        Arc::new(routes.into_iter().map(|(p, r)| (p.to_string(), r)).collect());
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_srv = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let hits = Arc::clone(&hits_srv);
            thread::spawn(move || handle(stream, &routes, &hits));
        }
    });
    TestServer {
        base: format!("http://127.0.0.1:{}", port),
        hits,
    }
}

/// A URL on a port nothing listens on.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/gone.pdf", port)
}

fn read_request(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") || buf.len() > 64 * 1024 {
            break;
        }
    }
    String::from_utf8(buf).ok()
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        302 => "Found",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

fn respond(stream: &mut TcpStream, status: u16, extra_headers: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n",
        status,
        reason(status),
        body.len(),
        extra_headers
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

fn handle(mut stream: TcpStream, routes: &HashMap<String, Route>, hits: &AtomicUsize) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let Some(request) = read_request(&mut stream) else {
        return;
    };
    hits.fetch_add(1, Ordering::SeqCst);

    let mut lines = request.lines();
    let path = lines
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    let user_agent = lines
        .filter_map(|l| l.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("user-agent"))
        .map(|(_, v)| v.trim().to_string());

    match routes.get(&path) {
        None => respond(&mut stream, 404, "", b"no such route"),
        Some(Route::Ok(body)) => respond(&mut stream, 200, "", body),
        Some(Route::OkNoLength(body)) => {
            let _ = stream.write_all(b"HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n");
            let _ = stream.write_all(body);
        }
        Some(Route::Status(code)) => respond(&mut stream, *code, "", reason(*code).as_bytes()),
        Some(Route::Stall(d)) => thread::sleep(*d),
        Some(Route::Delayed(d, body)) => {
            thread::sleep(*d);
            respond(&mut stream, 200, "", body);
        }
        Some(Route::Truncated { advertised, body }) => {
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                advertised
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(body);
        }
        Some(Route::Redirect(to)) => respond(&mut stream, 302, &format!("Location: {}\r\n", to), b""),
        Some(Route::RequireAgent(agent, body)) => {
            if user_agent.as_deref() == Some(agent.as_str()) {
                respond(&mut stream, 200, "", body);
            } else {
                respond(&mut stream, 403, "", b"forbidden");
            }
        }
    }
    let _ = stream.flush();
}
