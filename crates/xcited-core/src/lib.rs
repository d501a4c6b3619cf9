pub mod config;
pub mod logging;

pub mod downloader;
pub mod error;
pub mod naming;
pub mod plan;
pub mod progress;
pub mod publication;
pub mod scheduler;
pub mod storage;
pub mod task;
