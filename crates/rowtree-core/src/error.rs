use thiserror::Error;

use crate::id::RowTypeId;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

/// Row-type definition failures. All of them are raised while building a
/// schema; ancestry queries never fail.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Duplicate RowType name {name}")]
    DuplicateName { name: String },

    #[error("{name}: Don't specify both parent_path and path")]
    ConflictingArguments { name: String },

    #[error("{name}: path must not be empty")]
    EmptyPath { name: String },

    #[error("{name}: path refers to unknown row type {id}")]
    UnknownRowType { name: String, id: RowTypeId },

    #[error("{name}: path depth {depth} exceeds configured maximum {max}")]
    DepthExceeded {
        name: String,
        depth: usize,
        max: usize,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}
