#![forbid(unsafe_code)]
//! rowtree-operators: pull-based physical operators over typed rows.
//!
//! Design intent:
//! - Synchronous, one row at a time, in upstream order.
//! - Operators only look at a row through `HasRowType`; the row payload is
//!   passed through untouched.
//! - Ancestry questions go to a frozen `Arc<Registry>` shared with every other
//!   execution.

pub mod cut;
pub mod scan;
pub mod traits;

pub use cut::{Cut, CutStats};
pub use scan::Scan;
pub use traits::{OpError, RowSource, RowSourceExt, Rows, SimpleOperator};
