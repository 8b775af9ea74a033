use stackline_protocol::{ItemId, RowId, RowRecord};

use crate::config::LayoutConfig;
use crate::layout::{HeightTracker, RowCache, RowMode, ToggleController};
use crate::model::Item;

/// A row of items laid out together, with its memoized layout state.
#[derive(Debug, Clone)]
pub struct Row {
    pub id: RowId,
    /// Whether sub-lanes get their own bands (stacked) or lanes (unstacked).
    pub sub_lane_stacking: bool,
    pub(crate) items: Vec<Item>,
    pub(crate) toggle: ToggleController,
    pub(crate) cache: RowCache,
    pub(crate) heights: HeightTracker,
}

impl Row {
    pub fn new(record: RowRecord, config: &LayoutConfig) -> Self {
        Self {
            id: record.id,
            sub_lane_stacking: record.sub_lane_stacking,
            items: Vec::new(),
            toggle: ToggleController::new(record.collapsed, config.prefer_stacked),
            cache: RowCache::default(),
            heights: HeightTracker::default(),
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub(crate) fn item_mut(&mut self, id: &ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| &item.id == id)
    }

    pub(crate) fn insert(&mut self, item: Item) {
        self.items.push(item);
    }

    pub(crate) fn take(&mut self, id: &ItemId) -> Option<Item> {
        let at = self.items.iter().position(|item| &item.id == id)?;
        Some(self.items.remove(at))
    }

    pub fn mode(&self) -> RowMode {
        self.toggle.mode()
    }

    /// Height computed by the last layout pass, if any pass ran.
    pub fn height(&self) -> Option<f64> {
        self.heights.current()
    }

    pub fn cache(&self) -> &RowCache {
        &self.cache
    }

    /// Switch sub-lane stacking. A change invalidates every memo of the row.
    pub fn set_sub_lane_stacking(&mut self, enabled: bool) {
        if self.sub_lane_stacking != enabled {
            self.sub_lane_stacking = enabled;
            self.reset();
        }
    }

    /// Forget memoized offsets and lanes for the next pass of each mode.
    pub fn reset(&mut self) {
        self.cache.force_recompute();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackline_protocol::ItemRecord;

    #[test]
    fn take_removes_only_the_named_item() {
        let mut row = Row::new(RowRecord::new("r"), &LayoutConfig::default());
        for id in ["a", "b", "c"] {
            row.insert(Item::from_record(ItemRecord::new(id, "r", 0, 1)).unwrap());
        }
        let taken = row.take(&ItemId::from("b")).unwrap();
        assert_eq!(taken.id.as_str(), "b");
        assert_eq!(row.items().len(), 2);
        assert!(row.take(&ItemId::from("b")).is_none());
    }

    #[test]
    fn stacking_change_forces_recompute() {
        let mut row = Row::new(RowRecord::new("r"), &LayoutConfig::default());
        row.set_sub_lane_stacking(false);
        assert!(!row.cache().stack_forced());
        row.set_sub_lane_stacking(true);
        assert!(row.cache().stack_forced());
        assert!(row.cache().unstack_forced());
    }
}
