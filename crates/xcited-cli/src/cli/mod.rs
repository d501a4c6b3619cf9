//! CLI for xCited: download every PDF of an author's publications.

mod args;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use xcited_core::config;

use args::{positive_integer, scholar_id};
use commands::run_download;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "xcited")]
#[command(
    about = "Download all PDFs of an author's publications given the Google Scholar ID",
    long_about = "Enter an author's Google Scholar ID to download all PDFs of their publications.\n\
                  The downloaded PDFs are saved as:\n\n\
                  \t'./<scholar_id>/<year_publication>_<title_publication>.pdf'"
)]
pub struct Cli {
    /// The Google Scholar ID: the 12-character value of the 'user' field in the profile URL.
    #[arg(value_parser = scholar_id)]
    pub scholar_id: String,

    /// Show a progress bar for each downloaded file instead of a single bar for all files.
    #[arg(short, long)]
    pub verbose: bool,

    /// Number of worker threads used during downloads (default 4).
    #[arg(short = 'w', long = "num-workers", alias = "num_workers", value_name = "N", value_parser = positive_integer)]
    pub num_workers: Option<usize>,

    /// Publication list exported from the scholarly service (default: ./<SCHOLAR_ID>.json).
    #[arg(long, value_name = "FILE")]
    pub publications: Option<PathBuf>,

    /// Directory under which `<SCHOLAR_ID>/` is created (default from config, ".").
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init().context("loading configuration")?;
        tracing::debug!("loaded config: {:?}", cfg);
        run_download(&cli, &cfg)
    }
}

#[cfg(test)]
mod tests;
