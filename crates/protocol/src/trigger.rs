use serde::{Deserialize, Serialize};

use crate::ids::RowId;

/// External events that start a layout pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "row", rename_all = "camelCase")]
pub enum Trigger {
    /// Item data or visibility changed somewhere; every row is laid out.
    ItemsChanged,
    /// The visible time window moved or was zoomed; every row is laid out
    /// with the horizontal geometry supplied beforehand.
    ViewportRangeChanged,
    /// The user clicked a row's stacked/unstacked toggle.
    ToggleRequested(RowId),
    /// Items were added to, removed from, or moved into the row. Forces a
    /// full recompute of that row.
    ItemStructureChanged(RowId),
}

impl Trigger {
    /// The single row this trigger targets, or `None` for timeline-wide triggers.
    pub fn target_row(&self) -> Option<&RowId> {
        match self {
            Self::ItemsChanged | Self::ViewportRangeChanged => None,
            Self::ToggleRequested(row) | Self::ItemStructureChanged(row) => Some(row),
        }
    }
}
