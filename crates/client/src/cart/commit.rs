//! Commit batches: the network half of a cart save.

use thiserror::Error;
use tracing::{debug, warn};

use cartwheel_core::CartItemId;

use super::reconciler::SnapshotVersion;
use crate::gateway::{CartGateway, GatewayError};

/// Errors from saving pending cart quantities.
#[derive(Debug, Error)]
pub enum CommitError {
    /// An update was rejected. Pending quantities are unchanged.
    #[error("failed to update cart line {item_id}: {source}")]
    Update {
        /// The line whose update failed.
        item_id: CartItemId,
        /// The gateway error.
        #[source]
        source: GatewayError,
    },

    /// Every update succeeded but the cart could not be reloaded afterwards.
    #[error("cart saved but reload failed: {0}")]
    Refresh(#[source] GatewayError),

    /// A commit from the current snapshot has not finished yet.
    #[error("a cart save is already in progress")]
    InFlight,
}

impl CommitError {
    /// The gateway error behind this failure, if any.
    #[must_use]
    pub const fn gateway_error(&self) -> Option<&GatewayError> {
        match self {
            Self::Update { source, .. } | Self::Refresh(source) => Some(source),
            Self::InFlight => None,
        }
    }
}

/// One quantity to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineUpdate {
    /// Cart line to update.
    pub item_id: CartItemId,
    /// Quantity to set.
    pub quantity: u32,
}

/// Dirty lines captured from one snapshot, ready to send.
#[derive(Debug, Clone)]
#[must_use = "a batch does nothing until executed and finished"]
pub struct CommitBatch {
    version: SnapshotVersion,
    updates: Vec<LineUpdate>,
}

impl CommitBatch {
    pub(crate) const fn new(version: SnapshotVersion, updates: Vec<LineUpdate>) -> Self {
        Self { version, updates }
    }

    /// Snapshot the batch was captured from.
    pub const fn version(&self) -> SnapshotVersion {
        self.version
    }

    /// Updates in send order.
    #[must_use]
    pub fn updates(&self) -> &[LineUpdate] {
        &self.updates
    }

    /// Number of updates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Whether there is nothing to send.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Send every update, one at a time, in order.
    ///
    /// A line the server no longer has is skipped and the batch continues.
    /// Any other error stops the batch; later updates are not attempted.
    pub async fn execute<G: CartGateway>(self, gateway: &G) -> CommitReport {
        let mut report = CommitReport {
            version: self.version,
            applied: Vec::with_capacity(self.updates.len()),
            skipped: Vec::new(),
            failure: None,
        };

        for update in self.updates {
            match gateway
                .update_cart_line(&update.item_id, update.quantity)
                .await
            {
                Ok(()) => {
                    debug!(item_id = %update.item_id, quantity = update.quantity, "Cart line updated");
                    report.applied.push(update);
                }
                Err(GatewayError::NotFound(message)) => {
                    warn!(item_id = %update.item_id, message = %message, "Cart line gone, skipping");
                    report.skipped.push(update.item_id);
                }
                Err(error) => {
                    warn!(item_id = %update.item_id, error = %error, "Cart line update failed");
                    report.failure = Some((update.item_id, error));
                    break;
                }
            }
        }

        report
    }
}

/// What happened when a batch was executed.
#[derive(Debug)]
pub struct CommitReport {
    pub(crate) version: SnapshotVersion,
    pub(crate) applied: Vec<LineUpdate>,
    pub(crate) skipped: Vec<CartItemId>,
    pub(crate) failure: Option<(CartItemId, GatewayError)>,
}

impl CommitReport {
    /// Snapshot the executed batch came from.
    #[must_use]
    pub const fn version(&self) -> SnapshotVersion {
        self.version
    }

    /// Updates the server accepted.
    #[must_use]
    pub fn applied(&self) -> &[LineUpdate] {
        &self.applied
    }

    /// Lines the server no longer had.
    #[must_use]
    pub fn skipped(&self) -> &[CartItemId] {
        &self.skipped
    }

    /// Whether the batch stopped on an error.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    #[cfg(test)]
    pub(crate) fn succeeded(batch: CommitBatch) -> Self {
        Self {
            version: batch.version,
            applied: batch.updates,
            skipped: Vec::new(),
            failure: None,
        }
    }
}

/// Counts from a successful save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitSummary {
    /// Lines whose quantity was updated.
    pub updated: usize,
    /// Lines skipped because the server no longer had them.
    pub skipped: Vec<CartItemId>,
}

/// Result of applying a [`CommitReport`] to the reconciler.
#[derive(Debug)]
pub enum CommitOutcome {
    /// Every update was accepted or skipped.
    Applied(CommitSummary),
    /// An update failed; nothing local changed.
    Failed {
        /// The line whose update failed.
        item_id: CartItemId,
        /// The gateway error.
        error: GatewayError,
    },
    /// The snapshot was replaced while the batch ran; the report was ignored.
    Stale,
}
