//! # Error Types
//!
//! Errors raised while constructing or decoding specification model values.

use thiserror::Error;

/// Errors from the specification model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// A `$ref` pointer does not point into `#/components/schemas/`.
    #[error("invalid reference pointer \"{0}\" (expected #/components/schemas/<name>)")]
    InvalidReference(String),

    /// A reference was constructed with an empty schema name.
    #[error("reference target name must be non-empty")]
    EmptyReferenceName,
}
