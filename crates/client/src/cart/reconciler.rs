//! Pending-quantity reconciler.
//!
//! Holds the last cart snapshot the server confirmed and a map of locally
//! proposed quantities. Edits touch only the map; [`QuantityReconciler::commit`]
//! sends the differences one line at a time.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::{debug, instrument, warn};

use cartwheel_core::{CartItemId, CartLine, LineSyncState};

use super::commit::{CommitBatch, CommitError, CommitOutcome, CommitReport, CommitSummary, LineUpdate};
use crate::gateway::CartGateway;

/// Identifies one cart snapshot. Bumped on every [`QuantityReconciler::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SnapshotVersion(u64);

impl SnapshotVersion {
    #[must_use]
    const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Raw counter value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SnapshotVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Optimistic quantity edits over a server-confirmed cart snapshot.
///
/// # Invariants
///
/// - An item missing from the pending map falls back to its server quantity.
/// - `increment`/`decrement` keep a pending quantity within `1..=stock`.
/// - A failed commit leaves every pending quantity as it was.
#[derive(Debug, Default)]
pub struct QuantityReconciler {
    lines: Vec<CartLine>,
    pending: HashMap<CartItemId, u32>,
    version: SnapshotVersion,
    committing: Option<HashSet<CartItemId>>,
}

impl QuantityReconciler {
    /// Create an empty reconciler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot and reset every pending quantity to the server value.
    ///
    /// Any commit derived from the previous snapshot becomes stale.
    pub fn initialize(&mut self, lines: Vec<CartLine>) {
        self.pending = lines
            .iter()
            .map(|line| (line.item_id.clone(), line.quantity))
            .collect();
        self.lines = lines;
        self.version = self.version.next();
        self.committing = None;
        debug!(version = %self.version, lines = self.lines.len(), "Cart snapshot loaded");
    }

    /// The server-confirmed lines, in snapshot order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The current snapshot version.
    #[must_use]
    pub const fn version(&self) -> SnapshotVersion {
        self.version
    }

    /// Look up a line in the snapshot.
    #[must_use]
    pub fn line(&self, item_id: &CartItemId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.item_id == item_id)
    }

    /// Pending quantity, falling back to the server quantity.
    ///
    /// Returns `None` for items not in the snapshot.
    #[must_use]
    pub fn effective_quantity(&self, item_id: &CartItemId) -> Option<u32> {
        self.line(item_id).map(|line| self.quantity_of(line))
    }

    fn quantity_of(&self, line: &CartLine) -> u32 {
        self.pending
            .get(&line.item_id)
            .copied()
            .unwrap_or(line.quantity)
    }

    /// Propose one more unit, up to `stock`.
    ///
    /// A server quantity above `stock` is pulled down to `stock`. Returns the
    /// resulting quantity (unchanged when already at `stock`), or `None` if
    /// the item is not in the snapshot.
    pub fn increment(&mut self, item_id: &CartItemId, stock: u32) -> Option<u32> {
        let current = self.effective_quantity(item_id)?;
        let proposed = current.min(stock).saturating_add(1).min(stock).max(1);
        if proposed == current {
            return Some(current);
        }
        self.pending.insert(item_id.clone(), proposed);
        Some(proposed)
    }

    /// Propose one less unit, down to 1.
    ///
    /// The result never exceeds the line's stock. Returns the resulting
    /// quantity (unchanged when already at 1), or `None` if the item is not
    /// in the snapshot.
    pub fn decrement(&mut self, item_id: &CartItemId) -> Option<u32> {
        let line = self.line(item_id)?;
        let current = self.quantity_of(line);
        let proposed = current.saturating_sub(1).min(line.stock).max(1);
        if proposed == current {
            return Some(current);
        }
        self.pending.insert(item_id.clone(), proposed);
        Some(proposed)
    }

    /// Whether any line's pending quantity differs from its server quantity.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.lines
            .iter()
            .any(|line| self.quantity_of(line) != line.quantity)
    }

    /// Lines whose pending quantity differs from the server, in snapshot order.
    #[must_use]
    pub fn dirty_lines(&self) -> Vec<LineUpdate> {
        self.lines
            .iter()
            .filter_map(|line| {
                let quantity = self.quantity_of(line);
                (quantity != line.quantity).then(|| LineUpdate {
                    item_id: line.item_id.clone(),
                    quantity,
                })
            })
            .collect()
    }

    /// Sync state of one line.
    #[must_use]
    pub fn line_state(&self, item_id: &CartItemId) -> Option<LineSyncState> {
        let line = self.line(item_id)?;
        if self
            .committing
            .as_ref()
            .is_some_and(|ids| ids.contains(item_id))
        {
            return Some(LineSyncState::Committing);
        }
        if self.quantity_of(line) == line.quantity {
            Some(LineSyncState::Synced)
        } else {
            Some(LineSyncState::Dirty)
        }
    }

    /// Whether a commit started from the current snapshot has not finished.
    #[must_use]
    pub const fn is_committing(&self) -> bool {
        self.committing.is_some()
    }

    // =========================================================================
    // Commit
    // =========================================================================

    /// Capture the dirty lines of the current snapshot as a commit batch.
    ///
    /// The captured lines report [`LineSyncState::Committing`] until
    /// [`finish_commit`](Self::finish_commit) or the next `initialize`.
    ///
    /// # Errors
    ///
    /// Returns [`CommitError::InFlight`] if a batch from this snapshot is
    /// still outstanding.
    pub fn begin_commit(&mut self) -> Result<CommitBatch, CommitError> {
        if self.committing.is_some() {
            return Err(CommitError::InFlight);
        }
        let updates = self.dirty_lines();
        self.committing = Some(updates.iter().map(|u| u.item_id.clone()).collect());
        Ok(CommitBatch::new(self.version, updates))
    }

    /// Apply the result of an executed batch.
    ///
    /// A report from an older snapshot is discarded without touching state.
    /// On failure the pending map is left exactly as it is. On success the
    /// committed quantities become the server-confirmed ones and lines the
    /// server no longer has are dropped.
    pub fn finish_commit(&mut self, report: CommitReport) -> CommitOutcome {
        if report.version != self.version {
            warn!(
                batch_version = %report.version,
                current_version = %self.version,
                "Discarding commit result for a stale cart snapshot"
            );
            return CommitOutcome::Stale;
        }
        self.committing = None;

        if let Some((item_id, error)) = report.failure {
            debug!(item_id = %item_id, error = %error, "Commit failed, keeping pending quantities");
            return CommitOutcome::Failed { item_id, error };
        }

        for update in &report.applied {
            if let Some(line) = self
                .lines
                .iter_mut()
                .find(|line| line.item_id == update.item_id)
            {
                line.quantity = update.quantity;
            }
        }
        if !report.skipped.is_empty() {
            self.lines
                .retain(|line| !report.skipped.contains(&line.item_id));
            for item_id in &report.skipped {
                self.pending.remove(item_id);
            }
        }

        CommitOutcome::Applied(CommitSummary {
            updated: report.applied.len(),
            skipped: report.skipped,
        })
    }

    /// Send every dirty line to the gateway, then reload the snapshot.
    ///
    /// Updates run one at a time in snapshot order and stop at the first
    /// failure. Lines the server reports as gone are skipped. When nothing is
    /// dirty only the reload is made.
    ///
    /// # Errors
    ///
    /// - [`CommitError::Update`] if an update failed; pending quantities are
    ///   untouched so the same edits can be retried.
    /// - [`CommitError::Refresh`] if every update succeeded but the snapshot
    ///   reload failed; the committed quantities are already recorded as
    ///   server-confirmed.
    /// - [`CommitError::InFlight`] if a split commit is outstanding.
    #[instrument(skip(self, gateway), fields(version = %self.version))]
    pub async fn commit<G: CartGateway>(
        &mut self,
        gateway: &G,
    ) -> Result<CommitSummary, CommitError> {
        let batch = self.begin_commit()?;
        let report = batch.execute(gateway).await;
        let summary = match self.finish_commit(report) {
            CommitOutcome::Applied(summary) => summary,
            CommitOutcome::Failed { item_id, error } => {
                return Err(CommitError::Update {
                    item_id,
                    source: error,
                });
            }
            CommitOutcome::Stale => return Ok(CommitSummary::default()),
        };

        let lines = gateway
            .fetch_cart_snapshot()
            .await
            .map_err(CommitError::Refresh)?;
        self.initialize(lines);

        Ok(summary)
    }
}
