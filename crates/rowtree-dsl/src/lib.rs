#![forbid(unsafe_code)]
//! rowtree-dsl: YAML → `Registry` (+ row fixtures).
//!
//! Definitions are read in document order, so a row type can only name
//! parents defined above it. Nothing is ever written back.

pub mod yaml;

pub use yaml::{parse_document, parse_schema, DslError, ParsedSchema, SchemaConfig, SchemaDoc};
