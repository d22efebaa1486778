//! Cart quantity reconciliation.
//!
//! Edits are optimistic: they change a local pending quantity and nothing
//! else. A save sends the lines that differ from the server, one request at a
//! time, and reloads the cart afterwards.

mod commit;
mod reconciler;
mod totals;

pub use commit::{
    CommitBatch, CommitError, CommitOutcome, CommitReport, CommitSummary, LineUpdate,
};
pub use reconciler::{QuantityReconciler, SnapshotVersion};
pub use totals::CartTotals;
