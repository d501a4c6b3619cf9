//! Easy2 Handler that streams a 200 response body into the destination file.
//!
//! The destination is created on the first body chunk of a 200 response, so a
//! non-200 response never leaves a file behind.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str;

use crate::progress::ProgressReporter;
use crate::task::TaskId;

/// Parses the status code from an HTTP status line ("HTTP/1.1 404 Not Found", "HTTP/2 200").
pub(super) fn parse_status_line(line: &str) -> Option<u32> {
    let mut parts = line.split_whitespace();
    let version = parts.next()?;
    if !version.starts_with("HTTP/") {
        return None;
    }
    parts.next()?.parse().ok()
}

pub(super) struct FileHandler<'a> {
    task_id: TaskId,
    destination: PathBuf,
    reporter: &'a ProgressReporter,
    /// Status of the most recent response (redirects and 1xx reset it).
    pub(super) status: Option<u32>,
    pub(super) content_length: Option<u64>,
    pub(super) file: Option<File>,
    pub(super) bytes_written: u64,
    /// Local I/O failure that aborted the transfer.
    pub(super) io_error: Option<io::Error>,
}

impl<'a> FileHandler<'a> {
    pub(super) fn new(task_id: TaskId, destination: &Path, reporter: &'a ProgressReporter) -> Self {
        Self {
            task_id,
            destination: destination.to_path_buf(),
            reporter,
            status: None,
            content_length: None,
            file: None,
            bytes_written: 0,
            io_error: None,
        }
    }

    pub(super) fn created_file(&self) -> bool {
        self.file.is_some()
    }

    /// Registers the advertised total, creates the destination and starts the task clock.
    pub(super) fn open_destination(&mut self) -> io::Result<()> {
        self.reporter.update(self.task_id, self.content_length, 0);
        let file = File::create(&self.destination)?;
        self.file = Some(file);
        self.reporter.start(self.task_id);
        Ok(())
    }

    /// Flushes and closes the destination file, if one was opened.
    pub(super) fn close(&mut self) -> io::Result<()> {
        match self.file.take() {
            Some(mut f) => f.flush(),
            None => Ok(()),
        }
    }
}

impl curl::easy::Handler for FileHandler<'_> {
    fn header(&mut self, data: &[u8]) -> bool {
        let Ok(line) = str::from_utf8(data) else {
            return true;
        };
        let line = line.trim_end();
        if line.starts_with("HTTP/") {
            self.status = parse_status_line(line);
            self.content_length = None;
            return true;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                self.content_length = value.trim().parse::<u64>().ok();
            }
        }
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, curl::easy::WriteError> {
        if self.status != Some(200) {
            // Abort: the body of a non-200 response is never kept.
            return Ok(0);
        }
        if self.file.is_none() {
            if let Err(e) = self.open_destination() {
                tracing::warn!(task_id = %self.task_id, path = %self.destination.display(), "cannot create destination: {}", e);
                self.io_error = Some(e);
                return Ok(0);
            }
        }
        let Some(file) = self.file.as_mut() else {
            return Ok(0);
        };
        if let Err(e) = file.write_all(data) {
            tracing::warn!(task_id = %self.task_id, "write to destination failed: {}", e);
            self.io_error = Some(e);
            return Ok(0);
        }
        self.bytes_written += data.len() as u64;
        self.reporter.update(self.task_id, None, data.len() as u64);
        Ok(data.len())
    }
}
