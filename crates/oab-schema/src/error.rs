//! # Error Types
//!
//! One enum per phase, so that callers can tell configuration mistakes
//! (registration, manifests) from build-time failures:
//!
//! - [`RegistryError`]: converter registration.
//! - [`BuildError`]: a conversion pass. Some variants are recoverable; the
//!   builder turns those into diagnostics instead of failing.
//! - [`RouteError`]: route registration.
//! - [`ManifestError`]: loading a declarative manifest or building from it.

use std::path::PathBuf;

use oab_core::{HttpMethod, SpecError};
use thiserror::Error;

use crate::fields::KindId;

/// Errors raised while registering converters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two converters claim the same kind.
    #[error("a converter for kind {kind} is already registered")]
    DuplicateConverter {
        /// The contested kind.
        kind: KindId,
    },
}

/// Errors raised during a conversion pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// No registered converter matches any kind in the value's lineage.
    #[error("no converter registered for kind {kind} or any of its parents")]
    NoConverterFound {
        /// Most specific kind of the unconvertible value.
        kind: KindId,
    },

    /// A structural converter was handed a value of the wrong shape.
    #[error("converter for {kind} expected a {expected} value, got a {actual} value")]
    ShapeMismatch {
        /// Kind of the offending value.
        kind: KindId,
        /// Shape the converter requires.
        expected: &'static str,
        /// Shape the value reported.
        actual: &'static str,
    },

    /// Two distinct schema declarations derive the same component name.
    #[error("schema name \"{name}\" is claimed by both {existing} and {incoming}")]
    NameCollision {
        /// The contested component name.
        name: String,
        /// Origin of the declaration that registered the name first.
        existing: String,
        /// Origin of the declaration that tried to register it again.
        incoming: String,
    },

    /// A node could not be constructed.
    #[error("specification model error: {0}")]
    Spec(#[from] SpecError),
}

impl BuildError {
    /// Whether the builder may degrade to an untyped node instead of
    /// aborting the pass.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NoConverterFound { .. } | Self::ShapeMismatch { .. }
        )
    }
}

/// Errors raised while registering documented routes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The same path and method were registered twice.
    #[error("operation {method} {path} is already registered")]
    DuplicateOperation {
        /// Method of the duplicated operation.
        method: HttpMethod,
        /// Path template of the duplicated operation.
        path: String,
    },

    /// The path template is malformed.
    #[error("invalid path template \"{path}\": {reason}")]
    InvalidPath {
        /// The offending template.
        path: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Errors raised while loading a manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("failed to read manifest {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid YAML/JSON or does not match the format.
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A schema name cannot be used as a component key.
    #[error("schema name \"{name}\" must be non-empty and use only letters, digits, '.', '_' or '-'")]
    InvalidSchemaName {
        /// The offending name.
        name: String,
    },

    /// A field names a kind that does not exist.
    #[error("schema {schema}, field {field}: unknown field kind \"{kind}\"")]
    UnknownFieldKind {
        /// Schema declaring the field.
        schema: String,
        /// Field name.
        field: String,
        /// The unknown kind name.
        kind: String,
    },

    /// A schema name is used but never declared.
    #[error("{referenced_by} refers to undeclared schema \"{name}\"")]
    UnknownSchema {
        /// Where the reference occurs.
        referenced_by: String,
        /// The undeclared name.
        name: String,
    },

    /// A route uses an unknown HTTP method.
    #[error("route {path}: unknown HTTP method \"{method}\"")]
    InvalidMethod {
        /// Route path.
        path: String,
        /// The unknown method.
        method: String,
    },

    /// A response status is neither a 1xx to 5xx code nor `default`.
    #[error("route {path}: invalid response status \"{status}\"")]
    InvalidStatus {
        /// Route path.
        path: String,
        /// The offending status.
        status: String,
    },

    /// Route registration rejected a manifest route.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// The build pass over the manifest failed.
    #[error(transparent)]
    Build(#[from] BuildError),
}
