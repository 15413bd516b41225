//! # Kinds Subcommand
//!
//! Lists every kind with a registered converter, and the scalar kind names
//! accepted in manifests.

use anyhow::Result;
use clap::Args;
use oab_schema::manifest::scalar_kind_names;
use oab_schema::{Converter, ConverterRegistry, PRIMITIVE_MAPPINGS};

/// Arguments for the `oab kinds` subcommand.
#[derive(Args, Debug)]
pub struct KindsArgs {
    /// Print the manifest kind names instead of converter kinds.
    #[arg(long)]
    pub manifest_names: bool,
}

/// Execute the kinds subcommand.
pub fn run_kinds(args: &KindsArgs) -> Result<u8> {
    for line in kind_lines(args.manifest_names)? {
        println!("{line}");
    }
    Ok(0)
}

/// One line per kind: the kind name, then `type/format` for primitives.
pub fn kind_lines(manifest_names: bool) -> Result<Vec<String>> {
    if manifest_names {
        return Ok(scalar_kind_names().map(str::to_string).collect());
    }

    let registry = ConverterRegistry::with_defaults()?;
    let lines = registry
        .kinds()
        .into_iter()
        .map(|kind| {
            match PRIMITIVE_MAPPINGS.iter().find(|mapping| mapping.converts() == kind) {
                Some(mapping) => match mapping.format() {
                    Some(format) => format!("{kind:<12} {}/{format}", mapping.schema_type()),
                    None => format!("{kind:<12} {}", mapping.schema_type()),
                },
                None => format!("{kind:<12} (structural)"),
            }
        })
        .collect();
    Ok(lines)
}
