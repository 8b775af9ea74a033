use serde::{Deserialize, Serialize};

use crate::ids::{ItemId, RowId};

/// A single, stateless instruction for the rendering collaborator.
///
/// A layout pass emits a `Vec<LayoutCommand>`; renderers apply them in order
/// and each command carries all the data it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum LayoutCommand {
    /// Move an item's visual element to a vertical offset within its row.
    #[serde(rename_all = "camelCase")]
    SetItemOffset { item: ItemId, offset: f64 },

    /// Resize a row to the aggregate height of its placed items.
    #[serde(rename_all = "camelCase")]
    SetRowHeight { row: RowId, height: f64 },

    /// Show or hide the stacked/unstacked toggle of a row.
    #[serde(rename_all = "camelCase")]
    SetToggleAffordanceVisible { row: RowId, visible: bool },
}
