//! Cut: drop every row at or below a row type in the hierarchy.
//!
//! A row is suppressed when the configured row type is an ancestor of the
//! row's type (non-strict, so rows of the cut type itself go too). All other
//! rows pass through unchanged and in order.

use std::sync::Arc;

use rowtree_core::prelude::{HasRowType, Registry, RowTypeId};

use crate::traits::{OpError, RowSource, SimpleOperator};

/// Rows emitted and suppressed so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CutStats {
    pub emitted: u64,
    pub suppressed: u64,
}

impl CutStats {
    pub fn seen(&self) -> u64 {
        self.emitted + self.suppressed
    }
}

pub struct Cut<I> {
    input: I,
    registry: Arc<Registry>,
    rowtype: RowTypeId,
    stats: CutStats,
}

impl<I: RowSource> Cut<I> {
    pub fn new(input: I, registry: Arc<Registry>, rowtype: RowTypeId) -> Self {
        Self {
            input,
            registry,
            rowtype,
            stats: CutStats::default(),
        }
    }

    /// Cut at the row type called `name`.
    pub fn by_name(input: I, registry: Arc<Registry>, name: &str) -> Result<Self, OpError> {
        let rowtype = registry
            .lookup(name)
            .ok_or_else(|| OpError::Schema(format!("unknown row type '{}'", name)))?;
        Ok(Self::new(input, registry, rowtype))
    }

    pub fn rowtype(&self) -> RowTypeId {
        self.rowtype
    }

    pub fn stats(&self) -> CutStats {
        self.stats
    }

    pub fn into_input(self) -> I {
        self.input
    }
}

impl<I: RowSource> SimpleOperator for Cut<I> {
    type Input = I;

    fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    fn handle_row(&self, row: I::Row) -> Option<I::Row> {
        if self.registry.ancestor_of(self.rowtype, row.rowtype()) {
            None
        } else {
            Some(row)
        }
    }

    fn on_suppressed(&mut self, _rowtype: RowTypeId) {
        self.stats.suppressed += 1;
        #[cfg(feature = "tracing")]
        tracing::trace!(cut = %self.rowtype, row = %_rowtype, "suppressed row");
    }

    fn on_exhausted(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            cut = %self.rowtype,
            emitted = self.stats.emitted,
            suppressed = self.stats.suppressed,
            "cut input exhausted"
        );
    }
}

impl<I: RowSource> RowSource for Cut<I> {
    type Row = I::Row;

    fn name(&self) -> &'static str {
        "cut"
    }

    fn next_row(&mut self) -> Result<Option<I::Row>, OpError> {
        let row = self.pull()?;
        if row.is_some() {
            self.stats.emitted += 1;
        }
        Ok(row)
    }
}
