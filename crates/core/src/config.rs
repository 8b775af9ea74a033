use serde::{Deserialize, Serialize};

/// Pixel constants and defaults shared by every row of a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Top margin of a row. No item is ever placed above it.
    pub base_offset: f64,
    /// Spacing added below the lowest item when computing row height.
    pub margin: f64,
    /// Height of the row label; rows never shrink below it.
    pub min_label_height: f64,
    /// Whether rows without an explicit `collapsed` value start stacked.
    pub prefer_stacked: bool,
}

impl LayoutConfig {
    /// Height of a row with nothing worth measuring in it.
    pub fn min_row_height(&self) -> f64 {
        self.min_label_height + self.margin
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_offset: 5.0,
            margin: 5.0,
            min_label_height: 24.0,
            prefer_stacked: true,
        }
    }
}
