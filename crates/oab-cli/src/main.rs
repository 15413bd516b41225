//! # oab CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use oab_cli::check::{run_check, CheckArgs};
use oab_cli::export::{run_export, ExportArgs};
use oab_cli::kinds::{run_kinds, KindsArgs};

/// OpenAPI builder CLI
///
/// Builds OpenAPI 3.0 documents from declarative schema and route manifests.
#[derive(Parser, Debug)]
#[command(name = "oab", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the document described by a manifest and write it.
    Export(ExportArgs),

    /// Build a manifest and report degraded schemas.
    Check(CheckArgs),

    /// List the field kinds with registered converters.
    Kinds(KindsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Export(args) => run_export(&args),
        Commands::Check(args) => run_check(&args),
        Commands::Kinds(args) => run_kinds(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
