#![forbid(unsafe_code)]
//! rowtree-core: row-type hierarchy and the plain data the operators work on.
//!
//! - `registry` owns every `RowType` of one schema in an arena indexed by
//!   `RowTypeId`; paths are sequences of ids, so ancestry never needs borrowed
//!   references between types.
//! - Definitions happen on an owned `Registry` during setup. `Registry::freeze`
//!   then hands out an `Arc` that row processing shares read-only.
//! - No IO here; the DSL and CLI crates build registries from files.

pub mod config;
pub mod error;
pub mod id;
pub mod prelude;
pub mod registry;
pub mod row;
pub mod rowtype;
pub mod schema;

pub use error::{Error, Result};
