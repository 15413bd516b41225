//! # Check Subcommand
//!
//! Builds a manifest and prints every diagnostic. Load and build failures
//! (unknown kinds, undeclared schemas, name collisions) are errors; degraded
//! fields only fail the check with `--strict`.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

/// Arguments for the `oab check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Manifest to check.
    #[arg(long, value_name = "PATH")]
    pub manifest: PathBuf,

    /// Treat degraded fields as failures.
    #[arg(long)]
    pub strict: bool,
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 on success, 1 when `--strict` and any field degraded.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    let generated = crate::build_manifest(&args.manifest)?;
    let doc = &generated.document;

    let operations: usize = doc.paths.values().map(|item| item.len()).sum();
    println!(
        "{}: {} schema(s), {} operation(s)",
        args.manifest.display(),
        doc.components.schemas.len(),
        operations
    );

    for diagnostic in &generated.diagnostics {
        println!("  WARN: {diagnostic}");
    }

    if generated.diagnostics.is_empty() {
        println!("OK");
        return Ok(0);
    }

    println!("{} field(s) degraded to untyped schemas.", generated.diagnostics.len());
    Ok(if args.strict { 1 } else { 0 })
}
