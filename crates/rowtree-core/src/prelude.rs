//! Convenient re-exports for downstream crates.

pub use crate::config::RegistryConfig;
pub use crate::error::{Error, Result};
pub use crate::id::RowTypeId;
pub use crate::registry::Registry;
pub use crate::row::{HasRowType, Row, Scalar};
pub use crate::rowtype::{ParentPath, RowType, RowTypeDef};
pub use crate::schema::{DataType, Field};
