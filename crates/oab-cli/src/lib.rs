//! # oab-cli: CLI Tool for the OpenAPI Builder
//!
//! Provides the `oab` command-line interface.
//!
//! ## Subcommands
//!
//! - `oab export`: build the document described by a manifest and write it
//!   as JSON or YAML.
//! - `oab check`: build a manifest and report schemas that degraded.
//! - `oab kinds`: list the field kinds the converter set understands.
//!
//! ```bash
//! oab export --manifest api.yaml --format yaml --output openapi.yaml
//! oab check --manifest api.yaml --strict
//! ```

pub mod check;
pub mod export;
pub mod kinds;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use oab_schema::{ConverterRegistry, GeneratedDocument, Manifest};

/// Load the manifest at `path` and run a build pass over it.
pub fn build_manifest(path: &Path) -> Result<GeneratedDocument> {
    let manifest = Manifest::load(path)
        .with_context(|| format!("failed to load manifest {}", path.display()))?;
    let registry = Arc::new(ConverterRegistry::with_defaults()?);
    let generated = manifest
        .generate(registry)
        .with_context(|| format!("failed to build manifest {}", path.display()))?;

    tracing::info!(
        manifest = %path.display(),
        schemas = generated.document.components.schemas.len(),
        diagnostics = generated.diagnostics.len(),
        "built manifest"
    );
    Ok(generated)
}
