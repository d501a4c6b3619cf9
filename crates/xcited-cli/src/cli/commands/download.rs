//! `xcited <SCHOLAR_ID>` – fetch the publication list and download the PDFs.

use anyhow::{Context, Result};
use std::path::PathBuf;
use xcited_core::config::XcitedConfig;
use xcited_core::downloader::FetchOptions;
use xcited_core::plan::{self, plural};
use xcited_core::progress::{DisplayMode, ProgressReporter};
use xcited_core::publication::{JsonFileSource, PublicationSource};

use crate::cli::Cli;

fn publications_path(cli: &Cli) -> PathBuf {
    cli.publications
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.json", cli.scholar_id)))
}

pub fn run_download(cli: &Cli, cfg: &XcitedConfig) -> Result<()> {
    println!("Welcome to xCited!");

    println!("\nProcessing author info");
    let source = JsonFileSource::new(publications_path(cli));
    let author = source.author(&cli.scholar_id).with_context(|| {
        format!(
            "error in fetching author info; check the Google Scholar ID '{}'",
            cli.scholar_id
        )
    })?;
    for (key, value) in author.info() {
        println!("  • {:15}: {}", key, value);
    }
    let pubs = author.publications;
    let available = pubs.iter().filter(|p| p.eprint_url.as_deref().is_some_and(|u| !u.trim().is_empty())).count();
    println!("  • {:15}: {}", "publications", pubs.len());

    println!(
        "\nDownload PDF{} ({}/{} available)",
        plural(available),
        available,
        pubs.len()
    );
    let workers = cli.num_workers.unwrap_or(cfg.workers);
    let output_root = cli.output.clone().unwrap_or_else(|| cfg.output_root.clone());
    let reporter = ProgressReporter::new(DisplayMode::from_verbose(cli.verbose));
    let opts = FetchOptions::from_config(cfg);

    let summary = plan::download_publications(&cli.scholar_id, &pubs, &output_root, workers, &reporter, &opts)
        .context("download batch could not start")?;

    println!("{}", summary);
    println!("  • {:15}: {}", "saved to", summary.author_dir.display());
    tracing::info!(
        succeeded = summary.succeeded,
        attempted = summary.attempted,
        "run completed"
    );

    println!("\nClosing xCited");
    Ok(())
}
