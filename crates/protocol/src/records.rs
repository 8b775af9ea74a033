use serde::{Deserialize, Deserializer, Serialize};

use crate::ids::{ItemId, RowId, SubLaneKey};
use crate::types::{Extent, Timestamp};

/// An item as registered by the data collaborator.
///
/// `left`/`width` are the horizontal placement computed outside the engine;
/// `height` is the rendered height of the item's visual element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: ItemId,
    #[serde(alias = "group")]
    pub row: RowId,
    /// Sub-lane membership. Values that are not a string or an integer are
    /// read as "no sub-lane" instead of failing the whole record.
    #[serde(default, alias = "subgroup", deserialize_with = "lenient_sub_lane")]
    pub sub_lane: Option<SubLaneKey>,
    #[serde(default, alias = "subgroupOrder")]
    pub sub_lane_order: Option<i64>,
    pub start: Timestamp,
    pub end: Timestamp,
    #[serde(default = "default_item_height")]
    pub height: f64,
    #[serde(default)]
    pub extent: Extent,
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl ItemRecord {
    pub fn new(id: impl Into<ItemId>, row: impl Into<RowId>, start: Timestamp, end: Timestamp) -> Self {
        Self {
            id: id.into(),
            row: row.into(),
            sub_lane: None,
            sub_lane_order: None,
            start,
            end,
            height: default_item_height(),
            extent: Extent::default(),
            visible: true,
        }
    }

    pub fn with_sub_lane(mut self, key: impl Into<SubLaneKey>) -> Self {
        self.sub_lane = Some(key.into());
        self
    }

    pub fn with_sub_lane_order(mut self, order: i64) -> Self {
        self.sub_lane_order = Some(order);
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    pub fn with_extent(mut self, left: f64, width: f64) -> Self {
        self.extent = Extent::new(left, width);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// A row as registered by the data collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowRecord {
    pub id: RowId,
    /// `Some(true)` starts the row unstacked, `Some(false)` stacked; unset
    /// defers to the configured preference.
    #[serde(default)]
    pub collapsed: Option<bool>,
    #[serde(default, alias = "subgroupStack")]
    pub sub_lane_stacking: bool,
}

impl RowRecord {
    pub fn new(id: impl Into<RowId>) -> Self {
        Self {
            id: id.into(),
            collapsed: None,
            sub_lane_stacking: false,
        }
    }

    pub fn with_sub_lane_stacking(mut self, enabled: bool) -> Self {
        self.sub_lane_stacking = enabled;
        self
    }

    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = Some(collapsed);
        self
    }
}

fn default_item_height() -> f64 {
    20.0
}

fn default_true() -> bool {
    true
}

fn lenient_sub_lane<'de, D>(deserializer: D) -> Result<Option<SubLaneKey>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) if !s.trim().is_empty() => Some(SubLaneKey::from(s.trim())),
        Raw::Int(n) => Some(SubLaneKey::from(n.to_string())),
        Raw::Text(_) | Raw::Other(_) => None,
    })
}
