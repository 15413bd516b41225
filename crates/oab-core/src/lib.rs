#![deny(missing_docs)]

//! # oab-core: Specification Model
//!
//! In-memory representation of the OpenAPI document produced by the builder.
//! This crate is pure data: construction, accessors, equality, and serde.
//! It has no internal crate dependencies.
//!
//! ## Contents
//!
//! - [`spec`]: schema nodes ([`Schema`]), named pointers ([`Reference`]),
//!   and the [`RefOr`] union used wherever either may appear.
//! - [`document`]: the document tree: [`Info`], paths, operations, and
//!   `components.schemas`.
//!
//! ## Wire Conventions
//!
//! - Absent `type`/`format`/`items`/`properties` are omitted, never `null`.
//! - References serialize as `{"$ref": "#/components/schemas/<name>"}`.
//! - Maps are ordered, so identical inputs serialize to identical bytes.

#[allow(missing_docs)]
pub mod document;
pub mod error;
#[allow(missing_docs)]
pub mod spec;

pub use document::{
    Components, Document, HttpMethod, Info, MediaType, Operation, Parameter, ParameterLocation,
    PathItem, RequestBody, Response, JSON_MEDIA_TYPE, OPENAPI_VERSION,
};
pub use error::SpecError;
pub use spec::{RefOr, Reference, Schema, SchemaType, REF_PREFIX};
