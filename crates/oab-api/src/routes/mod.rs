//! # API Route Modules
//!
//! - `docs`: the documentation UI page and the configuration endpoint
//!   serving the generated document.

pub mod docs;
