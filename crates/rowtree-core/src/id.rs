//! Strongly-typed row-type identifiers.
//!
//! Paths and rows refer to row types by `RowTypeId`, never by raw integers or
//! references into the registry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Arena slot of a row type within one `Registry`. Ids from different
/// registries are not comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Ord, PartialOrd)]
#[serde(transparent)]
pub struct RowTypeId(u64);

impl RowTypeId {
    pub const fn new(v: u64) -> Self {
        Self(v)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Arena slot, or `None` when the id does not fit in `usize`.
    pub(crate) fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl fmt::Display for RowTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RowTypeId({})", self.0)
    }
}
