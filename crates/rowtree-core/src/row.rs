//! Lightweight row values.
//!
//! Operators only ever ask a row for its row type (`HasRowType`); `Row` is the
//! concrete shape used by scans, fixtures and tests.

use serde::{Deserialize, Serialize};

use crate::id::RowTypeId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Null,
    Bool(bool),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Str(String),
    Bin(Vec<u8>),
}

/// Anything that knows which row type describes its shape.
pub trait HasRowType {
    fn rowtype(&self) -> RowTypeId;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub rowtype: RowTypeId,
    /// Key fields first, then value fields, in row-type order.
    pub values: Vec<Scalar>,
}

impl Row {
    pub fn new(rowtype: RowTypeId, values: Vec<Scalar>) -> Self {
        Self { rowtype, values }
    }
}

impl HasRowType for Row {
    fn rowtype(&self) -> RowTypeId {
        self.rowtype
    }
}

impl<T: HasRowType + ?Sized> HasRowType for &T {
    fn rowtype(&self) -> RowTypeId {
        (**self).rowtype()
    }
}
