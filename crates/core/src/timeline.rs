use std::collections::HashMap;

use stackline_protocol::{
    Extent, ItemId, ItemRecord, LayoutCommand, RowId, RowRecord, Timestamp, Trigger,
};
use tracing::{debug, warn};

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::layout::{self, RowMode, UpstreamToggle};
use crate::model::{Item, ItemChange, Row};

/// How an accepted [`Timeline::move_item`] changed the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// Both ends shifted by the same amount.
    Moved,
    /// The duration changed.
    Resized,
}

/// All rows of a timeline and the entry point for layout triggers.
///
/// Rows keep the order in which they were first registered; that order is
/// the vertical order used by [`Timeline::row_tops`].
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    config: LayoutConfig,
    rows: Vec<Row>,
    row_index: HashMap<RowId, usize>,
    item_rows: HashMap<ItemId, RowId>,
}

impl Timeline {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Register a row, or update the sub-lane setting of a known one. An
    /// existing row keeps its current mode.
    pub fn add_row(&mut self, record: RowRecord) {
        if let Some(row) = self.row_mut(&record.id) {
            row.set_sub_lane_stacking(record.sub_lane_stacking);
            return;
        }
        self.row_index.insert(record.id.clone(), self.rows.len());
        self.rows.push(Row::new(record, &self.config));
    }

    /// Drop a row together with its items.
    pub fn remove_row(&mut self, id: &RowId) -> Result<Row, LayoutError> {
        let at = self
            .row_index
            .remove(id)
            .ok_or_else(|| LayoutError::UnknownRow(id.clone()))?;
        let row = self.rows.remove(at);
        for item in row.items() {
            self.item_rows.remove(&item.id);
        }
        self.reindex_rows();
        Ok(row)
    }

    /// Register an item. Its row is created on first use.
    ///
    /// Adding does not force the row to recompute: memoized neighbours keep
    /// their offsets and the new item is placed around them.
    pub fn add_item(&mut self, record: ItemRecord) -> Result<(), LayoutError> {
        if self.item_rows.contains_key(&record.id) {
            warn!(item = %record.id, "rejecting duplicate item");
            return Err(LayoutError::DuplicateItem(record.id));
        }
        let item = Item::from_record(record)?;
        let row_id = item.row.clone();
        self.item_rows.insert(item.id.clone(), row_id.clone());
        self.row_or_insert(&row_id).insert(item);
        Ok(())
    }

    pub fn remove_item(&mut self, id: &ItemId) -> Result<Item, LayoutError> {
        let row_id = self
            .item_rows
            .remove(id)
            .ok_or_else(|| LayoutError::UnknownItem(id.clone()))?;
        self.row_mut(&row_id)
            .and_then(|row| row.take(id))
            .ok_or_else(|| LayoutError::UnknownItem(id.clone()))
    }

    /// Replace an item's data. Layout-relevant changes clear the item's memos
    /// and force its row to recompute; a new owning row moves the item and
    /// forces both rows.
    pub fn update_item(&mut self, record: ItemRecord) -> Result<ItemChange, LayoutError> {
        let current_row = self
            .item_rows
            .get(&record.id)
            .cloned()
            .ok_or_else(|| LayoutError::UnknownItem(record.id.clone()))?;

        if current_row != record.row {
            let item = Item::from_record(record)?;
            if let Some(row) = self.row_mut(&current_row) {
                row.take(&item.id);
                row.reset();
            }
            debug!(item = %item.id, from = %current_row, to = %item.row, "item moved between rows");
            self.item_rows.insert(item.id.clone(), item.row.clone());
            let target = item.row.clone();
            let row = self.row_or_insert(&target);
            row.insert(item);
            row.reset();
            return Ok(ItemChange::Content);
        }

        let row = self
            .row_mut(&current_row)
            .ok_or_else(|| LayoutError::UnknownRow(current_row.clone()))?;
        let item = row
            .item_mut(&record.id)
            .ok_or_else(|| LayoutError::UnknownItem(record.id.clone()))?;
        let change = item.apply(record)?;
        if change == ItemChange::Content {
            row.reset();
        }
        Ok(change)
    }

    /// Move or resize an item on the time axis.
    ///
    /// A resize that would leave the item without duration is refused and the
    /// item keeps its previous range.
    pub fn move_item(
        &mut self,
        id: &ItemId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<EditKind, LayoutError> {
        let (at, index) = self.locate(id)?;
        let row = &mut self.rows[at];
        let item = &mut row.items[index];
        let kind = if i128::from(end) - i128::from(start) == item.duration() {
            EditKind::Moved
        } else {
            EditKind::Resized
        };
        if kind == EditKind::Resized && start >= end {
            warn!(item = %id, start, end, "refusing empty resize");
            return Err(LayoutError::EmptyResize { id: id.clone() });
        }
        item.set_range(start, end)?;
        row.reset();
        Ok(kind)
    }

    /// Update the horizontal placement of an item. Never invalidates memos.
    pub fn set_item_geometry(&mut self, id: &ItemId, extent: Extent) -> Result<(), LayoutError> {
        self.item_mut(id)?.extent = extent;
        Ok(())
    }

    pub fn set_item_visible(&mut self, id: &ItemId, visible: bool) -> Result<(), LayoutError> {
        self.item_mut(id)?.visible = visible;
        Ok(())
    }

    pub fn set_sub_lane_stacking(&mut self, row: &RowId, enabled: bool) -> Result<(), LayoutError> {
        self.require_row_mut(row)?.set_sub_lane_stacking(enabled);
        Ok(())
    }

    /// Explicit recalculation request for one row.
    pub fn reset_row(&mut self, row: &RowId) -> Result<(), LayoutError> {
        self.require_row_mut(row)?.reset();
        Ok(())
    }

    /// React to a trigger and return the commands for the renderer.
    pub fn handle(&mut self, trigger: &Trigger) -> Result<Vec<LayoutCommand>, LayoutError> {
        if let Some(row) = trigger.target_row()
            && !self.row_index.contains_key(row)
        {
            warn!(row = %row, ?trigger, "trigger for unknown row");
            return Err(LayoutError::UnknownRow(row.clone()));
        }
        match trigger {
            Trigger::ItemsChanged | Trigger::ViewportRangeChanged => Ok(self.layout_all()),
            Trigger::ToggleRequested(row) => self.toggle(row),
            Trigger::ItemStructureChanged(row) => {
                self.reset_row(row)?;
                self.layout_row(row)
            }
        }
    }

    /// Flip a row between stacked and unstacked and lay it out right away.
    pub fn toggle(&mut self, row: &RowId) -> Result<Vec<LayoutCommand>, LayoutError> {
        self.require_row_mut(row)?.toggle.toggle();
        self.layout_row(row)
    }

    /// Route the host framework's generic expand/collapse notification.
    pub fn on_upstream_toggle(&mut self, row: &RowId) -> Result<UpstreamToggle, LayoutError> {
        Ok(self.require_row_mut(row)?.toggle.on_upstream_toggle())
    }

    pub fn layout_all(&mut self) -> Vec<LayoutCommand> {
        let config = self.config;
        self.rows
            .iter_mut()
            .flat_map(|row| layout::layout_row(row, &config))
            .collect()
    }

    pub fn layout_row(&mut self, row: &RowId) -> Result<Vec<LayoutCommand>, LayoutError> {
        let config = self.config;
        Ok(layout::layout_row(self.require_row_mut(row)?, &config))
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, id: &RowId) -> Option<&Row> {
        self.row_index.get(id).map(|&at| &self.rows[at])
    }

    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        let row = self.item_rows.get(id)?;
        self.row(row)?.item(id)
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.rows.iter().flat_map(|row| row.items().iter())
    }

    pub fn row_mode(&self, id: &RowId) -> Option<RowMode> {
        self.row(id).map(Row::mode)
    }

    pub fn row_height(&self, id: &RowId) -> Option<f64> {
        self.row(id)?.height()
    }

    pub fn item_offset(&self, id: &ItemId) -> Option<f64> {
        self.item(id)?.offset()
    }

    /// Top of every row, stacking rows in registration order. Rows that never
    /// had a pass count with the label height.
    pub fn row_tops(&self) -> Vec<(RowId, f64)> {
        let mut top = 0.0;
        self.rows
            .iter()
            .map(|row| {
                let this = (row.id.clone(), top);
                top += row.height().unwrap_or(self.config.min_row_height());
                this
            })
            .collect()
    }

    fn row_mut(&mut self, id: &RowId) -> Option<&mut Row> {
        let at = *self.row_index.get(id)?;
        self.rows.get_mut(at)
    }

    fn require_row_mut(&mut self, id: &RowId) -> Result<&mut Row, LayoutError> {
        self.row_mut(id)
            .ok_or_else(|| LayoutError::UnknownRow(id.clone()))
    }

    fn row_or_insert(&mut self, id: &RowId) -> &mut Row {
        if !self.row_index.contains_key(id) {
            self.add_row(RowRecord::new(id.clone()));
        }
        let at = self.row_index[id];
        &mut self.rows[at]
    }

    /// Row index and item index of an item.
    fn locate(&self, id: &ItemId) -> Result<(usize, usize), LayoutError> {
        let row_id = self
            .item_rows
            .get(id)
            .ok_or_else(|| LayoutError::UnknownItem(id.clone()))?;
        let at = *self
            .row_index
            .get(row_id)
            .ok_or_else(|| LayoutError::UnknownRow(row_id.clone()))?;
        let index = self.rows[at]
            .items()
            .iter()
            .position(|item| &item.id == id)
            .ok_or_else(|| LayoutError::UnknownItem(id.clone()))?;
        Ok((at, index))
    }

    fn item_mut(&mut self, id: &ItemId) -> Result<&mut Item, LayoutError> {
        let (at, index) = self.locate(id)?;
        Ok(&mut self.rows[at].items[index])
    }

    fn reindex_rows(&mut self) {
        self.row_index = self
            .rows
            .iter()
            .enumerate()
            .map(|(at, row)| (row.id.clone(), at))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, row: &str, start: i64, end: i64) -> ItemRecord {
        ItemRecord::new(id, row, start, end).with_extent(start as f64, (end - start) as f64)
    }

    fn timeline() -> Timeline {
        let mut t = Timeline::new(LayoutConfig::default());
        t.add_item(record("a", "r", 0, 10)).unwrap();
        t.add_item(record("b", "r", 5, 15)).unwrap();
        t
    }

    #[test]
    fn rows_are_created_on_first_item() {
        let t = timeline();
        assert_eq!(t.rows().len(), 1);
        assert_eq!(t.row_mode(&RowId::from("r")), Some(RowMode::Stacked));
    }

    #[test]
    fn duplicate_and_unknown_ids_are_errors() {
        let mut t = timeline();
        assert_eq!(
            t.add_item(record("a", "r", 0, 1)),
            Err(LayoutError::DuplicateItem(ItemId::from("a")))
        );
        assert_eq!(
            t.remove_item(&ItemId::from("zzz")).unwrap_err(),
            LayoutError::UnknownItem(ItemId::from("zzz"))
        );
        assert_eq!(
            t.handle(&Trigger::ToggleRequested(RowId::from("nope"))).unwrap_err(),
            LayoutError::UnknownRow(RowId::from("nope"))
        );
        assert_eq!(
            t.handle(&Trigger::ItemStructureChanged(RowId::from("nope"))),
            Err(LayoutError::UnknownRow(RowId::from("nope")))
        );
    }

    #[test]
    fn empty_resize_is_refused_and_reverted() {
        let mut t = timeline();
        let id = ItemId::from("a");
        assert_eq!(
            t.move_item(&id, 10, 10),
            Err(LayoutError::EmptyResize { id: id.clone() })
        );
        let item = t.item(&id).unwrap();
        assert_eq!((item.start, item.end), (0, 10));

        assert_eq!(t.move_item(&id, 100, 110), Ok(EditKind::Moved));
        assert_eq!(t.move_item(&id, 100, 150), Ok(EditKind::Resized));
    }

    #[test]
    fn extreme_ranges_move_without_overflow() {
        let mut t = timeline();
        let id = ItemId::from("a");
        assert_eq!(t.move_item(&id, i64::MIN, i64::MAX), Ok(EditKind::Resized));
        assert_eq!(t.move_item(&id, 0, 10), Ok(EditKind::Resized));
        assert_eq!(t.move_item(&id, i64::MAX - 10, i64::MAX), Ok(EditKind::Moved));
        assert_eq!(
            t.move_item(&id, i64::MAX, i64::MIN),
            Err(LayoutError::EmptyResize { id: id.clone() })
        );

        t.add_item(record("wide", "r", 0, 1)).unwrap();
        let wide = ItemId::from("wide");
        assert_eq!(t.move_item(&wide, i64::MIN, i64::MAX), Ok(EditKind::Resized));
        assert_eq!(t.move_item(&wide, i64::MIN + 1, i64::MAX), Ok(EditKind::Resized));
        let item = t.item(&wide).unwrap();
        assert_eq!((item.start, item.end), (i64::MIN + 1, i64::MAX));
    }

    #[test]
    fn moving_between_rows_forces_both_rows() {
        let mut t = timeline();
        t.add_item(record("c", "other", 0, 10)).unwrap();
        t.layout_all();

        let change = t.update_item(record("b", "other", 5, 15)).unwrap();
        assert_eq!(change, ItemChange::Content);
        assert_eq!(t.row(&RowId::from("r")).unwrap().items().len(), 1);
        assert_eq!(t.row(&RowId::from("other")).unwrap().items().len(), 2);
        assert!(t.row(&RowId::from("r")).unwrap().cache().stack_forced());
        assert!(t.row(&RowId::from("other")).unwrap().cache().stack_forced());

        t.layout_all();
        assert_eq!(t.item_offset(&ItemId::from("b")), Some(26.0));
        assert_eq!(t.item_offset(&ItemId::from("a")), Some(5.0));
    }

    #[test]
    fn geometry_updates_keep_memos() {
        let mut t = timeline();
        t.layout_all();
        t.set_item_geometry(&ItemId::from("b"), Extent::new(5.0, 10.0))
            .unwrap();
        assert!(!t.item(&ItemId::from("b")).unwrap().is_dirty());
    }

    #[test]
    fn upstream_echo_of_toggle_is_suppressed_once() {
        let mut t = timeline();
        let row = RowId::from("r");
        t.layout_all();
        assert_eq!(t.on_upstream_toggle(&row), Ok(UpstreamToggle::Forward));
        t.handle(&Trigger::ToggleRequested(row.clone())).unwrap();
        assert_eq!(t.row_mode(&row), Some(RowMode::Unstacked));
        assert_eq!(t.on_upstream_toggle(&row), Ok(UpstreamToggle::Suppressed));
        assert_eq!(t.on_upstream_toggle(&row), Ok(UpstreamToggle::Forward));
    }

    #[test]
    fn row_tops_accumulate_heights() {
        let mut t = timeline();
        t.add_row(RowRecord::new("empty"));
        t.layout_all();
        let tops = t.row_tops();
        assert_eq!(tops[0], (RowId::from("r"), 0.0));
        assert_eq!(tops[1], (RowId::from("empty"), 51.0));
    }

    #[test]
    fn removing_a_row_forgets_its_items() {
        let mut t = timeline();
        let row = t.remove_row(&RowId::from("r")).unwrap();
        assert_eq!(row.items().len(), 2);
        assert!(t.item(&ItemId::from("a")).is_none());
        assert!(t.add_item(record("a", "r", 0, 1)).is_ok());
    }
}
