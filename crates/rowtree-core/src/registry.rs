//! Arena of row types for one schema.
//!
//! The registry owns every `RowType` it defines; paths hold `RowTypeId`s into
//! the arena. Names are unique per registry, so independent schemas (and
//! independent tests) never collide.
//!
//! Lifecycle:
//! - setup: `define` on an owned `Registry`, single-threaded.
//! - processing: `freeze` into an `Arc<Registry>` and share it. Nothing
//!   reachable through the `Arc` mutates, so no locking is needed.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::id::RowTypeId;
use crate::rowtype::{path_is_prefix, ParentPath, RowType, RowTypeDef};

#[derive(Debug, Default)]
pub struct Registry {
    config: RegistryConfig,
    types: Vec<RowType>,
    names: HashMap<String, RowTypeId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with [`Error::Config`] when `config` does not validate.
    pub fn with_config(config: RegistryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Id the next successful `define` will assign. Lets callers build an
    /// explicit path that includes the type being defined.
    pub fn next_id(&self) -> RowTypeId {
        RowTypeId::new(self.types.len() as u64)
    }

    /// Define a new row type.
    ///
    /// Placement:
    /// - neither `parent_path` nor `path`: the type is a root, `path == [self]`.
    /// - `ParentPath::Path(p)`: `path == p + [self]`.
    /// - `ParentPath::RowType(t)`: `path == t.path()`, an alias of `t`'s position.
    /// - `ParentPath::Under(t)`: `path == t.path() + [self]`.
    /// - `path`: stored verbatim; it must not be empty.
    ///
    /// On error the registry is left untouched.
    pub fn define(&mut self, def: RowTypeDef) -> Result<RowTypeId> {
        let RowTypeDef {
            name,
            value,
            key,
            parent_path,
            path,
        } = def;

        if self.names.contains_key(&name) {
            return Err(Error::DuplicateName { name });
        }

        let id = self.next_id();
        let path = match (parent_path, path) {
            (Some(_), Some(_)) => return Err(Error::ConflictingArguments { name }),
            (None, None) => vec![id],
            (None, Some(path)) => {
                if path.is_empty() {
                    return Err(Error::EmptyPath { name });
                }
                self.check_references(&name, &path, id)?;
                path
            }
            (Some(ParentPath::Path(mut prefix)), None) => {
                self.check_references(&name, &prefix, id)?;
                prefix.push(id);
                prefix
            }
            (Some(ParentPath::RowType(other)), None) => match self.get(other) {
                Some(t) => t.path.clone(),
                None => return Err(Error::UnknownRowType { name, id: other }),
            },
            (Some(ParentPath::Under(parent)), None) => match self.get(parent) {
                Some(t) => {
                    let mut path = t.path.clone();
                    path.push(id);
                    path
                }
                None => return Err(Error::UnknownRowType { name, id: parent }),
            },
        };

        if let Some(max) = self.config.max_depth {
            if path.len() > max {
                return Err(Error::DepthExceeded {
                    name,
                    depth: path.len(),
                    max,
                });
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(%id, name = %name, depth = path.len(), "defined row type");

        self.names.insert(name.clone(), id);
        self.types.push(RowType {
            id,
            name,
            value_fields: value,
            key_fields: key,
            path,
        });
        Ok(id)
    }

    fn check_references(&self, name: &str, path: &[RowTypeId], own: RowTypeId) -> Result<()> {
        if !self.config.validate_paths {
            return Ok(());
        }
        match path
            .iter()
            .find(|&&id| id != own && self.get(id).is_none())
        {
            Some(&id) => Err(Error::UnknownRowType {
                name: name.to_string(),
                id,
            }),
            None => Ok(()),
        }
    }

    pub fn get(&self, id: RowTypeId) -> Option<&RowType> {
        self.types.get(id.index()?)
    }

    pub fn lookup(&self, name: &str) -> Option<RowTypeId> {
        self.names.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&RowType> {
        self.lookup(name).and_then(|id| self.get(id))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Row types in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &RowType> {
        self.types.iter()
    }

    /// Non-strict ancestry by id. Unknown ids are never related.
    pub fn ancestor_of(&self, ancestor: RowTypeId, descendant: RowTypeId) -> bool {
        match (self.get(ancestor), self.get(descendant)) {
            (Some(a), Some(d)) => a.ancestor_of(d),
            _ => false,
        }
    }

    pub fn proper_ancestor_of(&self, ancestor: RowTypeId, descendant: RowTypeId) -> bool {
        match (self.get(ancestor), self.get(descendant)) {
            (Some(a), Some(d)) => a.proper_ancestor_of(d),
            _ => false,
        }
    }

    /// Types whose path is `id`'s path plus exactly one element.
    pub fn children(&self, id: RowTypeId) -> Vec<RowTypeId> {
        let Some(parent) = self.get(id) else {
            return vec![];
        };
        self.types
            .iter()
            .filter(|t| t.path.len() == parent.path.len() + 1)
            .filter(|t| path_is_prefix(&parent.path, &t.path))
            .map(|t| t.id)
            .collect()
    }

    /// Types strictly below `id`.
    pub fn descendants(&self, id: RowTypeId) -> Vec<RowTypeId> {
        let Some(top) = self.get(id) else {
            return vec![];
        };
        self.types
            .iter()
            .filter(|t| top.proper_ancestor_of(t))
            .map(|t| t.id)
            .collect()
    }

    /// Types that head their own hierarchy (`path == [self]`).
    pub fn roots(&self) -> Vec<RowTypeId> {
        self.types
            .iter()
            .filter(|t| t.path == [t.id])
            .map(|t| t.id)
            .collect()
    }

    /// Render a path as `[a, b, c]`, falling back to the raw id for slots the
    /// registry does not know.
    pub fn display_path(&self, path: &[RowTypeId]) -> String {
        let parts: Vec<String> = path
            .iter()
            .map(|&id| match self.get(id) {
                Some(t) => t.name.clone(),
                None => id.to_string(),
            })
            .collect();
        format!("[{}]", parts.join(", "))
    }

    /// Forget every definition. Test harnesses call this between independent
    /// cases that reuse names.
    pub fn reset(&mut self) {
        self.types.clear();
        self.names.clear();
    }

    /// End of setup: share the registry read-only.
    pub fn freeze(self) -> Arc<Registry> {
        #[cfg(feature = "tracing")]
        tracing::debug!(row_types = self.types.len(), "registry frozen");
        Arc::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DataType, Field};

    fn value() -> Vec<Field> {
        vec![Field::new("v", DataType::Int64, true)]
    }

    /// R → C → G, built the way the testbed builds them.
    fn rcg(reg: &mut Registry) -> (RowTypeId, RowTypeId, RowTypeId) {
        let r = reg.define(RowTypeDef::new("R", value())).unwrap();
        let c = reg
            .define(RowTypeDef::new("C", value()).under_path(&[r]))
            .unwrap();
        let c_path = reg.get(c).unwrap().path().to_vec();
        let g = reg
            .define(RowTypeDef::new("G", value()).under_path(&c_path))
            .unwrap();
        (r, c, g)
    }

    #[test]
    fn root_path_is_self() {
        let mut reg = Registry::new();
        let r = reg.define(RowTypeDef::new("R", value())).unwrap();
        assert_eq!(reg.get(r).unwrap().path(), &[r]);
        assert_eq!(reg.roots(), vec![r]);
    }

    #[test]
    fn list_parent_appends_self() {
        let mut reg = Registry::new();
        let (r, c, g) = rcg(&mut reg);
        assert_eq!(reg.get(c).unwrap().path(), &[r, c]);
        assert_eq!(reg.get(g).unwrap().path(), &[r, c, g]);
        assert!(reg.ancestor_of(r, g));
        assert!(reg.ancestor_of(c, g));
        assert!(!reg.ancestor_of(g, r));
    }

    #[test]
    fn rowtype_parent_aliases_path() {
        let mut reg = Registry::new();
        let (r, c, _) = rcg(&mut reg);
        let alias = reg
            .define(RowTypeDef::new("C2", value()).sibling_of(c))
            .unwrap();
        assert_eq!(reg.get(alias).unwrap().path(), &[r, c]);
        assert!(reg.ancestor_of(alias, c));
        assert!(reg.ancestor_of(c, alias));
        assert!(!reg.proper_ancestor_of(c, alias));
    }

    #[test]
    fn parent_path_converts_from_ids_and_paths() {
        let mut reg = Registry::new();
        let r = reg.define(RowTypeDef::new("R", value())).unwrap();
        let c = reg
            .define(RowTypeDef::new("C", value()).parent_path(vec![r]))
            .unwrap();
        let alias = reg
            .define(RowTypeDef::new("C2", value()).parent_path(c))
            .unwrap();
        let path = reg.get(c).unwrap().path().to_vec();
        let g = reg
            .define(RowTypeDef::new("G", value()).parent_path(path.as_slice()))
            .unwrap();
        assert_eq!(reg.get(alias).unwrap().path(), &[r, c]);
        assert_eq!(reg.get(g).unwrap().path(), &[r, c, g]);
    }

    #[test]
    fn explicit_path_is_verbatim() {
        let mut reg = Registry::new();
        let r = reg.define(RowTypeDef::new("R", value())).unwrap();
        let x = reg
            .define(RowTypeDef::new("X", value()).path(vec![r]))
            .unwrap();
        assert_eq!(reg.get(x).unwrap().path(), &[r]);
    }

    #[test]
    fn explicit_path_may_name_the_new_type() {
        let mut reg = Registry::new();
        let r = reg.define(RowTypeDef::new("R", value())).unwrap();
        let next = reg.next_id();
        let x = reg
            .define(RowTypeDef::new("X", value()).path(vec![r, next]))
            .unwrap();
        assert_eq!(x, next);
        assert_eq!(reg.get(x).unwrap().parent(), Some(r));
    }

    #[test]
    fn under_appends_self_to_parent_path() {
        let mut reg = Registry::new();
        let (r, c, g) = rcg(&mut reg);
        let h = reg.define(RowTypeDef::new("H", value()).under(c)).unwrap();
        assert_eq!(reg.get(h).unwrap().path(), &[r, c, h]);
        assert_eq!(reg.get(h).unwrap().parent(), Some(c));
        assert!(!reg.ancestor_of(g, h));

        let ghost = RowTypeId::new(77);
        let err = reg
            .define(RowTypeDef::new("Z", value()).under(ghost))
            .unwrap_err();
        assert_eq!(
            err,
            Error::UnknownRowType {
                name: "Z".into(),
                id: ghost
            }
        );
    }

    #[test]
    fn empty_explicit_path_is_rejected() {
        let config = RegistryConfig::default().with_validate_paths(false);
        let mut reg = Registry::with_config(config).unwrap();
        let r = reg.define(RowTypeDef::new("R", value())).unwrap();
        let err = reg
            .define(RowTypeDef::new("E", value()).path(vec![]))
            .unwrap_err();
        assert_eq!(err, Error::EmptyPath { name: "E".into() });
        assert!(!reg.contains("E"));
        assert_eq!(reg.len(), 1);
        assert!(reg.iter().all(|t| reg.ancestor_of(t.id(), t.id())));
        assert!(reg.ancestor_of(r, r));
    }

    #[test]
    fn zero_depth_config_is_rejected() {
        let err = Registry::with_config(RegistryConfig::default().with_max_depth(0)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(Registry::with_config(RegistryConfig::default().with_max_depth(1)).is_ok());
    }

    #[test]
    fn duplicate_name_leaves_registry_unchanged() {
        let mut reg = Registry::new();
        reg.define(RowTypeDef::new("R", value())).unwrap();
        let err = reg.define(RowTypeDef::new("R", vec![])).unwrap_err();
        assert_eq!(err, Error::DuplicateName { name: "R".into() });
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn both_placements_conflict() {
        let mut reg = Registry::new();
        let r = reg.define(RowTypeDef::new("R", value())).unwrap();
        let err = reg
            .define(RowTypeDef::new("C", value()).under_path(&[r]).path(vec![r]))
            .unwrap_err();
        assert_eq!(err, Error::ConflictingArguments { name: "C".into() });
        assert!(!reg.contains("C"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn unknown_references_are_rejected() {
        let mut reg = Registry::new();
        let ghost = RowTypeId::new(42);
        let err = reg
            .define(RowTypeDef::new("C", value()).sibling_of(ghost))
            .unwrap_err();
        assert_eq!(
            err,
            Error::UnknownRowType {
                name: "C".into(),
                id: ghost
            }
        );
        assert!(reg
            .define(RowTypeDef::new("D", value()).under_path(&[ghost]))
            .is_err());
        assert!(reg.is_empty());
    }

    #[test]
    fn unvalidated_paths_are_kept() {
        let mut reg = Registry::with_config(RegistryConfig::default().with_validate_paths(false)).unwrap();
        let ghost = RowTypeId::new(42);
        let c = reg
            .define(RowTypeDef::new("C", value()).under_path(&[ghost]))
            .unwrap();
        assert_eq!(reg.get(c).unwrap().path(), &[ghost, c]);
        assert_eq!(reg.display_path(reg.get(c).unwrap().path()), "[RowTypeId(42), C]");
    }

    #[test]
    fn depth_cap_is_enforced() {
        let mut reg = Registry::with_config(RegistryConfig::default().with_max_depth(2)).unwrap();
        let r = reg.define(RowTypeDef::new("R", value())).unwrap();
        let c = reg
            .define(RowTypeDef::new("C", value()).under_path(&[r]))
            .unwrap();
        let err = reg
            .define(RowTypeDef::new("G", value()).under_path(&[r, c]))
            .unwrap_err();
        assert!(matches!(err, Error::DepthExceeded { depth: 3, max: 2, .. }));
        assert!(!reg.contains("G"));
    }

    #[test]
    fn children_and_descendants() {
        let mut reg = Registry::new();
        let (r, c, g) = rcg(&mut reg);
        assert_eq!(reg.children(r), vec![c]);
        assert_eq!(reg.children(c), vec![g]);
        assert_eq!(reg.descendants(r), vec![c, g]);
        assert!(reg.descendants(g).is_empty());
    }

    #[test]
    fn unknown_ids_are_never_related() {
        let mut reg = Registry::new();
        let (r, _, _) = rcg(&mut reg);
        let ghost = RowTypeId::new(99);
        assert!(!reg.ancestor_of(r, ghost));
        assert!(!reg.ancestor_of(ghost, r));
        assert!(!reg.ancestor_of(ghost, ghost));
        let far = RowTypeId::new(u64::MAX);
        assert!(reg.get(far).is_none());
        assert!(!reg.ancestor_of(r, far));
    }

    #[test]
    fn reset_allows_reusing_names() {
        let mut reg = Registry::new();
        rcg(&mut reg);
        reg.reset();
        assert!(reg.is_empty());
        let (r, _, _) = rcg(&mut reg);
        assert_eq!(r, RowTypeId::new(0));
    }

    #[test]
    fn lookups_by_name() {
        let mut reg = Registry::new();
        let (_, c, _) = rcg(&mut reg);
        assert_eq!(reg.lookup("C"), Some(c));
        assert_eq!(reg.by_name("C").map(|t| t.name()), Some("C"));
        assert_eq!(reg.lookup("nope"), None);
        let names: Vec<&str> = reg.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["R", "C", "G"]);
    }

    #[test]
    fn frozen_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>(_: &T) {}
        let mut reg = Registry::new();
        let (r, _, g) = rcg(&mut reg);
        let shared = reg.freeze();
        assert_send_sync(&shared);
        let handle = {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || shared.ancestor_of(r, g))
        };
        assert!(handle.join().unwrap());
    }
}
