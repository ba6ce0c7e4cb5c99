//! Registry configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Longest path a row type may have. `None` means unbounded.
    pub max_depth: Option<usize>,

    /// Reject list-form and explicit paths that mention ids the registry does
    /// not hold. When off, such paths are stored verbatim.
    pub validate_paths: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            validate_paths: true,
        }
    }
}

impl RegistryConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `ROWTREE_MAX_DEPTH`: maximum path length
    /// - `ROWTREE_VALIDATE_PATHS`: `true`/`false`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        if let Some(s) = lookup("ROWTREE_MAX_DEPTH") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.max_depth = Some(v);
            }
        }

        if let Some(s) = lookup("ROWTREE_VALIDATE_PATHS") {
            if let Ok(v) = s.parse::<bool>() {
                cfg.validate_paths = v;
            }
        }

        cfg
    }

    /// A depth cap of zero would reject every row type, roots included.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == Some(0) {
            return Err(Error::Config("max_depth must be at least 1".into()));
        }
        Ok(())
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_validate_paths(mut self, validate: bool) -> Self {
        self.validate_paths = validate;
        self
    }
}
