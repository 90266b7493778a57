//! Tests for the add and run subcommands.

use super::parse;
use crate::cli::CliCommand;
use clap::Parser;

#[test]
fn cli_parse_add_defaults() {
    match parse(&[
        "mdq",
        "add",
        "--url",
        "https://example.com/playlist",
        "--title",
        "lectures",
        "--manifest",
        "items.json",
    ]) {
        CliCommand::Add {
            url,
            title,
            format,
            quality,
            order,
            output_dir,
            manifest,
        } => {
            assert_eq!(url, "https://example.com/playlist");
            assert_eq!(title, "lectures");
            assert_eq!(format, "video");
            assert_eq!(quality, "best");
            assert_eq!(order, "insertion");
            assert!(output_dir.is_none());
            assert_eq!(manifest, "items.json");
        }
        _ => panic!("expected Add"),
    }
}

#[test]
fn cli_parse_add_full() {
    match parse(&[
        "mdq",
        "add",
        "--url",
        "https://example.com/p",
        "--title",
        "music",
        "--format",
        "audio",
        "--quality",
        "320k",
        "--order",
        "oldest_first",
        "--output-dir",
        "/media/music",
        "--manifest",
        "/tmp/m.json",
    ]) {
        CliCommand::Add {
            format,
            quality,
            order,
            output_dir,
            ..
        } => {
            assert_eq!(format, "audio");
            assert_eq!(quality, "320k");
            assert_eq!(order, "oldest_first");
            assert_eq!(output_dir.as_deref(), Some("/media/music"));
        }
        _ => panic!("expected Add"),
    }
}

#[test]
fn cli_parse_add_requires_manifest() {
    assert!(crate::cli::Cli::try_parse_from([
        "mdq",
        "add",
        "--url",
        "https://example.com/p",
        "--title",
        "t"
    ])
    .is_err());
}

#[test]
fn cli_parse_run() {
    match parse(&["mdq", "run", "7"]) {
        CliCommand::Run {
            queue_id,
            force_redownload,
            no_retry_failed,
        } => {
            assert_eq!(queue_id, 7);
            assert!(!force_redownload);
            assert!(!no_retry_failed);
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_run_flags() {
    match parse(&["mdq", "run", "7", "--force-redownload", "--no-retry-failed"]) {
        CliCommand::Run {
            force_redownload,
            no_retry_failed,
            ..
        } => {
            assert!(force_redownload);
            assert!(no_retry_failed);
        }
        _ => panic!("expected Run"),
    }
}
