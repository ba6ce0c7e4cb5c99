//! In-memory scan: yields a fixed list of rows in order.

use std::collections::VecDeque;

use rowtree_core::prelude::HasRowType;

use crate::traits::{OpError, RowSource};

#[derive(Debug, Clone)]
pub struct Scan<R> {
    rows: VecDeque<R>,
}

impl<R> Scan<R> {
    pub fn new(rows: impl IntoIterator<Item = R>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
        }
    }

    /// Rows not yet pulled.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl<R: HasRowType> RowSource for Scan<R> {
    type Row = R;

    fn name(&self) -> &'static str {
        "scan"
    }

    fn next_row(&mut self) -> Result<Option<R>, OpError> {
        Ok(self.rows.pop_front())
    }
}
