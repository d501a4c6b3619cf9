//! CLI parse tests.

use super::Cli;
use clap::Parser;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

fn parse_err(args: &[&str]) -> clap::Error {
    Cli::try_parse_from(args).unwrap_err()
}

#[test]
fn cli_parse_defaults() {
    let cli = parse(&["xcited", "qc6CJjYAAAAJ"]);
    assert_eq!(cli.scholar_id, "qc6CJjYAAAAJ");
    assert!(!cli.verbose);
    assert!(cli.num_workers.is_none());
    assert!(cli.publications.is_none());
    assert!(cli.output.is_none());
}

#[test]
fn cli_parse_verbose_and_workers() {
    let cli = parse(&["xcited", "-v", "-w", "8", "qc6CJjYAAAAJ"]);
    assert!(cli.verbose);
    assert_eq!(cli.num_workers, Some(8));

    let cli = parse(&["xcited", "qc6CJjYAAAAJ", "--verbose", "--num-workers", "2"]);
    assert!(cli.verbose);
    assert_eq!(cli.num_workers, Some(2));
}

#[test]
fn cli_parse_underscore_alias() {
    let cli = parse(&["xcited", "qc6CJjYAAAAJ", "--num_workers", "3"]);
    assert_eq!(cli.num_workers, Some(3));
}

#[test]
fn cli_parse_paths() {
    let cli = parse(&[
        "xcited",
        "qc6CJjYAAAAJ",
        "--publications",
        "/tmp/pubs.json",
        "-o",
        "/srv/papers",
    ]);
    assert_eq!(cli.publications.as_deref(), Some(std::path::Path::new("/tmp/pubs.json")));
    assert_eq!(cli.output.as_deref(), Some(std::path::Path::new("/srv/papers")));
}

#[test]
fn cli_rejects_bad_scholar_id() {
    parse_err(&["xcited", "tooshort"]);
    parse_err(&["xcited", "qc6CJjYAAAAJJ"]);
    parse_err(&["xcited", "qc6CJjY.AAAJ"]);
}

#[test]
fn cli_rejects_non_positive_workers() {
    let err = parse_err(&["xcited", "qc6CJjYAAAAJ", "-w", "0"]);
    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    parse_err(&["xcited", "qc6CJjYAAAAJ", "-w", "-1"]);
}

#[test]
fn cli_requires_scholar_id() {
    let err = parse_err(&["xcited"]);
    assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
}
