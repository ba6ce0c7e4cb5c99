//! Row types and their materialized paths.
//!
//! A row type's `path` lists the ids of the types from the hierarchy root down
//! to the type's position. Ancestry is a prefix test over two paths, so it
//! costs O(path length) and needs no tree walk.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::RowTypeId;
use crate::schema::Field;

/// One kind of row shape, positioned in a hierarchy by its path.
///
/// Instances are only created by [`crate::registry::Registry::define`] and are
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowType {
    pub(crate) id: RowTypeId,
    pub(crate) name: String,
    pub(crate) value_fields: Vec<Field>,
    pub(crate) key_fields: Vec<Field>,
    pub(crate) path: Vec<RowTypeId>,
}

impl RowType {
    pub fn id(&self) -> RowTypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Non-key payload fields.
    pub fn value(&self) -> &[Field] {
        &self.value_fields
    }

    /// Identifying key fields.
    pub fn key(&self) -> &[Field] {
        &self.key_fields
    }

    pub fn path(&self) -> &[RowTypeId] {
        &self.path
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn root(&self) -> Option<RowTypeId> {
        self.path.first().copied()
    }

    /// The type directly above this one. Only defined when the path ends with
    /// this type; aliases made with the row-type shorthand and verbatim paths
    /// that do not end with the type have no parent.
    pub fn parent(&self) -> Option<RowTypeId> {
        match self.path.as_slice() {
            [.., parent, last] if *last == self.id => Some(*parent),
            _ => None,
        }
    }

    /// True if `self`'s path is a prefix of `other`'s path.
    ///
    /// Non-strict: every type is its own ancestor, and so is any type sharing
    /// its path.
    pub fn ancestor_of(&self, other: &RowType) -> bool {
        path_is_prefix(&self.path, &other.path)
    }

    /// Strict variant of [`RowType::ancestor_of`]: `other` must sit at least
    /// one level deeper.
    pub fn proper_ancestor_of(&self, other: &RowType) -> bool {
        self.path.len() < other.path.len() && self.ancestor_of(other)
    }
}

impl fmt::Display for RowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

pub(crate) fn path_is_prefix(ancestor: &[RowTypeId], descendant: &[RowTypeId]) -> bool {
    descendant.starts_with(ancestor)
}

/// Where a new row type is placed relative to existing ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentPath {
    /// Shorthand: reuse this row type's path as-is. The new type becomes an
    /// alias at the same position, not a child one level deeper.
    RowType(RowTypeId),
    /// The new type's path is this path with the new type appended.
    Path(Vec<RowTypeId>),
    /// One level below this row type: its path with the new type appended.
    Under(RowTypeId),
}

impl From<RowTypeId> for ParentPath {
    fn from(id: RowTypeId) -> Self {
        ParentPath::RowType(id)
    }
}

impl From<Vec<RowTypeId>> for ParentPath {
    fn from(path: Vec<RowTypeId>) -> Self {
        ParentPath::Path(path)
    }
}

impl From<&[RowTypeId]> for ParentPath {
    fn from(path: &[RowTypeId]) -> Self {
        ParentPath::Path(path.to_vec())
    }
}

/// Arguments for [`crate::registry::Registry::define`].
///
/// `parent_path` and `path` are mutually exclusive; with neither the new type
/// is a root.
#[derive(Debug, Clone, Default)]
pub struct RowTypeDef {
    pub name: String,
    pub value: Vec<Field>,
    pub key: Vec<Field>,
    pub parent_path: Option<ParentPath>,
    pub path: Option<Vec<RowTypeId>>,
}

impl RowTypeDef {
    pub fn new(name: impl Into<String>, value: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            value,
            ..Default::default()
        }
    }

    pub fn key(mut self, key: Vec<Field>) -> Self {
        self.key = key;
        self
    }

    pub fn parent_path(mut self, parent: impl Into<ParentPath>) -> Self {
        self.parent_path = Some(parent.into());
        self
    }

    /// One level below `parent`.
    pub fn under(self, parent: RowTypeId) -> Self {
        self.parent_path(ParentPath::Under(parent))
    }

    /// One level below the type owning `path` (list form).
    pub fn under_path(self, path: &[RowTypeId]) -> Self {
        self.parent_path(ParentPath::Path(path.to_vec()))
    }

    /// Same position as `other` (row-type shorthand).
    pub fn sibling_of(self, other: RowTypeId) -> Self {
        self.parent_path(ParentPath::RowType(other))
    }

    /// Explicit path, stored verbatim.
    pub fn path(mut self, path: Vec<RowTypeId>) -> Self {
        self.path = Some(path);
        self
    }
}
