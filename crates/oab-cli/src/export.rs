//! # Export Subcommand
//!
//! Builds the document described by a manifest and writes it to a file or
//! stdout. Degraded schemas are reported as warnings; they do not stop the
//! export.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use oab_core::Document;

/// Output encoding of an exported document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    #[default]
    Json,
    Yaml,
}

/// Arguments for the `oab export` subcommand.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Manifest describing schemas and routes (YAML or JSON).
    #[arg(long, value_name = "PATH")]
    pub manifest: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Json)]
    pub format: Format,

    /// Write to this file instead of stdout.
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Execute the export subcommand.
///
/// Returns exit code 0 on success.
pub fn run_export(args: &ExportArgs) -> Result<u8> {
    let generated = crate::build_manifest(&args.manifest)?;
    for diagnostic in &generated.diagnostics {
        tracing::warn!("{diagnostic}");
    }

    let rendered = render(&generated.document, args.format)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(0)
}

/// Serialize `document` in `format`, newline-terminated.
pub fn render(document: &Document, format: Format) -> Result<String> {
    let mut rendered = match format {
        Format::Json => serde_json::to_string_pretty(document).context("JSON serialization")?,
        Format::Yaml => serde_yaml::to_string(document).context("YAML serialization")?,
    };
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    Ok(rendered)
}
