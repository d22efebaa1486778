//! Sync status of a cart line.

use serde::{Deserialize, Serialize};

/// Where a cart line sits in the optimistic-edit cycle.
///
/// ```text
/// Synced ──edit──▶ Dirty ──commit──▶ Committing ──ok──▶ Synced
///                    ▲                    │
///                    └──────failure───────┘
/// ```
///
/// A failed commit returns the line to `Dirty` with its pending quantity
/// intact, so the user can retry without re-entering their changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LineSyncState {
    /// Pending quantity equals the server-confirmed quantity.
    #[default]
    Synced,
    /// Pending quantity differs from the server-confirmed quantity.
    Dirty,
    /// An update for this line is in flight.
    Committing,
}

impl LineSyncState {
    /// Whether the line has local edits not yet confirmed by the server.
    #[must_use]
    pub const fn has_unsaved_changes(&self) -> bool {
        matches!(self, Self::Dirty | Self::Committing)
    }
}
