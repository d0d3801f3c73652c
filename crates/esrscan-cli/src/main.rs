// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// esrscan — crop photographed payment slips to their orange boundary markers.
//
// Entry point. Parses arguments, initialises logging and runs one command.
// Failures are reported in plain language and end with a non-zero exit code.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use esrscan_core::EsrScanError;
use esrscan_core::human_errors::humanize_error;

/// Locate and crop ESR payment slips in photos.
#[derive(Parser)]
#[command(name = "esrscan")]
#[command(about = "Crop photographed payment slips to their boundary markers", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rotate, crop and optionally filter a slip photo
    Preprocess(PreprocessArgs),

    /// Print the detected boundary as JSON without writing an image
    Locate(LocateArgs),
}

#[derive(Args)]
pub struct PreprocessArgs {
    /// Photo to process
    #[arg(name = "INPUT")]
    pub input: PathBuf,

    /// Where to write the result; the format follows the extension
    #[arg(name = "OUTPUT")]
    pub output: PathBuf,

    /// JSON settings file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Only rotate; do not look for markers
    #[arg(long)]
    pub no_crop: bool,

    /// Scale so the longer side has this many pixels
    #[arg(long)]
    pub max_dimension: Option<u32>,

    /// Invert colours after cropping
    #[arg(long)]
    pub invert: bool,

    /// Adaptive threshold with this blur radius in pixels (default 4)
    #[arg(long, num_args = 0..=1, default_missing_value = "4")]
    pub threshold: Option<f32>,

    /// Draw the detected boundary instead of cropping to it
    #[arg(long, conflicts_with_all = ["no_crop", "max_dimension", "invert", "threshold"])]
    pub outline: bool,
}

#[derive(Args)]
pub struct LocateArgs {
    /// Photo to inspect
    #[arg(name = "INPUT")]
    pub input: PathBuf,

    /// JSON settings file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Preprocess(args) => commands::preprocess(&args),
        Commands::Locate(args) => commands::locate(&args).and_then(|report| {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_failure(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn report_failure(err: &anyhow::Error) {
    tracing::error!(error = %format!("{err:#}"), "esrscan failed");

    match err.chain().find_map(|cause| cause.downcast_ref::<EsrScanError>()) {
        Some(scan_err) => {
            let human = humanize_error(scan_err);
            eprintln!("{}", human.message);
            eprintln!("{}", human.suggestion);
        }
        None => eprintln!("We couldn't process this image. ({err:#})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn outline_rejects_flags_it_would_ignore() {
        for flag in ["--no-crop", "--invert", "--threshold", "--max-dimension=800"] {
            let args = ["esrscan", "preprocess", "in.jpg", "out.png", "--outline", flag];
            let err = Cli::try_parse_from(args)
                .err()
                .unwrap_or_else(|| panic!("{flag} accepted alongside --outline"));
            assert_eq!(err.kind(), ErrorKind::ArgumentConflict, "{flag}");
        }
    }

    #[test]
    fn outline_alone_parses() {
        let cli =
            Cli::try_parse_from(["esrscan", "preprocess", "in.jpg", "out.png", "--outline"])
                .expect("parse");
        match cli.command {
            Commands::Preprocess(args) => {
                assert!(args.outline);
                assert!(!args.no_crop && !args.invert);
                assert_eq!(args.threshold, None);
            }
            Commands::Locate(_) => panic!("expected preprocess"),
        }
    }

    #[test]
    fn bare_threshold_uses_default_radius() {
        let cli =
            Cli::try_parse_from(["esrscan", "preprocess", "in.jpg", "out.png", "--threshold"])
                .expect("parse");
        match cli.command {
            Commands::Preprocess(args) => assert_eq!(args.threshold, Some(4.0)),
            Commands::Locate(_) => panic!("expected preprocess"),
        }
    }
}
