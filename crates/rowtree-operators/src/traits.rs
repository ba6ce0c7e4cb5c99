//! Operator protocol: rows are pulled from the top of a pipeline, one at a
//! time, each operator pulling from its input.
//!
//! `RowSource` is what every operator exposes downstream. `SimpleOperator` is
//! the single-input case whose whole behavior is a per-row transform: it gets
//! the pull loop for free and only implements `handle_row`.

use rowtree_core::prelude::{HasRowType, RowTypeId};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpError {
    #[error("input error: {0}")]
    Input(String),

    #[error("schema error: {0}")]
    Schema(String),
}

/// A pull-based producer of rows.
pub trait RowSource {
    type Row: HasRowType;

    /// Human-readable operator name (stable).
    fn name(&self) -> &'static str;

    /// Next row in stream order, or `Ok(None)` once exhausted. Exhausted
    /// sources keep returning `Ok(None)`.
    fn next_row(&mut self) -> Result<Option<Self::Row>, OpError>;
}

/// A single-input operator defined by a per-row transform.
pub trait SimpleOperator {
    type Input: RowSource;

    fn input_mut(&mut self) -> &mut Self::Input;

    /// Transform one input row. `None` suppresses it.
    ///
    /// Must not fail and must not depend on rows seen earlier.
    fn handle_row(
        &self,
        row: <Self::Input as RowSource>::Row,
    ) -> Option<<Self::Input as RowSource>::Row>;

    /// Called for each row `handle_row` suppressed.
    fn on_suppressed(&mut self, _rowtype: RowTypeId) {}

    /// Called every time `pull` finds the input exhausted.
    fn on_exhausted(&mut self) {}

    /// Pull input rows until one survives `handle_row` or the input runs dry.
    /// Input errors are returned unchanged.
    fn pull(&mut self) -> Result<Option<<Self::Input as RowSource>::Row>, OpError> {
        while let Some(row) = self.input_mut().next_row()? {
            let rowtype = row.rowtype();
            match self.handle_row(row) {
                Some(out) => return Ok(Some(out)),
                None => self.on_suppressed(rowtype),
            }
        }
        self.on_exhausted();
        Ok(None)
    }
}

/// Iterator adaptor over a `RowSource`. Stops after the first error.
pub struct Rows<'a, S: ?Sized> {
    source: &'a mut S,
    done: bool,
}

impl<S: RowSource + ?Sized> Iterator for Rows<'_, S> {
    type Item = Result<S::Row, OpError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.source.next_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

pub trait RowSourceExt: RowSource {
    fn rows(&mut self) -> Rows<'_, Self> {
        Rows {
            source: self,
            done: false,
        }
    }

    /// Drain the source into a vector, failing on the first error.
    fn collect_rows(&mut self) -> Result<Vec<Self::Row>, OpError> {
        self.rows().collect()
    }
}

impl<S: RowSource + ?Sized> RowSourceExt for S {}
