use stackline_protocol::{Extent, ItemId, ItemRecord, RowId, SubLaneKey, Timestamp};

use crate::error::LayoutError;
use crate::model::Bounds;

/// A time-interval item owned by a row, together with its memoized offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub row: RowId,
    pub sub_lane: Option<SubLaneKey>,
    pub sub_lane_order: Option<i64>,
    pub start: Timestamp,
    pub end: Timestamp,
    /// Rendered height in pixels.
    pub height: f64,
    pub extent: Extent,
    pub visible: bool,
    stack_top: Option<f64>,
    unstack_top: Option<f64>,
    /// Offset most recently handed to the renderer, in whichever mode ran last.
    top: Option<f64>,
    dirty: bool,
}

/// What a record update touched on an existing item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemChange {
    /// Nothing layout-relevant changed (geometry and visibility are inputs to
    /// every pass and never invalidate caches).
    Cosmetic,
    /// Time range, sub-lane membership or height changed.
    Content,
}

impl Item {
    pub fn from_record(record: ItemRecord) -> Result<Self, LayoutError> {
        check_range(&record.id, record.start, record.end)?;
        Ok(Self {
            id: record.id,
            row: record.row,
            sub_lane: record.sub_lane,
            sub_lane_order: record.sub_lane_order,
            start: record.start,
            end: record.end,
            height: record.height,
            extent: record.extent,
            visible: record.visible,
            stack_top: None,
            unstack_top: None,
            top: None,
            dirty: true,
        })
    }

    /// Apply a fresh record for the same id. The owning row is not changed
    /// here; moving between rows is the timeline's job.
    pub fn apply(&mut self, record: ItemRecord) -> Result<ItemChange, LayoutError> {
        check_range(&record.id, record.start, record.end)?;
        let content_changed = self.start != record.start
            || self.end != record.end
            || self.sub_lane != record.sub_lane
            || self.sub_lane_order != record.sub_lane_order
            || self.height != record.height;

        self.sub_lane = record.sub_lane;
        self.sub_lane_order = record.sub_lane_order;
        self.start = record.start;
        self.end = record.end;
        self.height = record.height;
        self.extent = record.extent;
        self.visible = record.visible;

        if content_changed {
            self.invalidate();
            Ok(ItemChange::Content)
        } else {
            Ok(ItemChange::Cosmetic)
        }
    }

    /// Change the time range, invalidating the memoized offsets.
    pub fn set_range(&mut self, start: Timestamp, end: Timestamp) -> Result<(), LayoutError> {
        check_range(&self.id, start, end)?;
        self.start = start;
        self.end = end;
        self.invalidate();
        Ok(())
    }

    /// Drop both memoized offsets and mark the item for recomputation.
    pub fn invalidate(&mut self) {
        self.stack_top = None;
        self.unstack_top = None;
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Length in milliseconds. Widened so any pair of timestamps fits.
    pub fn duration(&self) -> i128 {
        i128::from(self.end) - i128::from(self.start)
    }

    /// Memoized stacked-mode offset, unless the item is dirty.
    pub fn cached_stack_top(&self) -> Option<f64> {
        if self.dirty { None } else { self.stack_top }
    }

    /// Memoized unstacked-mode offset, unless the item is dirty.
    pub fn cached_unstack_top(&self) -> Option<f64> {
        if self.dirty { None } else { self.unstack_top }
    }

    /// The offset last emitted for this item.
    pub fn offset(&self) -> Option<f64> {
        self.top
    }

    pub fn bounds_at(&self, top: f64) -> Bounds {
        Bounds::from_extent(self.extent, top, self.height)
    }

    /// Record a stacked placement. Leaves the unstacked memo alone so a
    /// toggle back finds it intact.
    pub(crate) fn place_stacked(&mut self, top: f64) {
        self.stack_top = Some(top);
        self.top = Some(top);
        self.dirty = false;
    }

    pub(crate) fn place_unstacked(&mut self, top: f64) {
        self.unstack_top = Some(top);
        self.top = Some(top);
        self.dirty = false;
    }

    /// Forget the rendered offset of an item that was skipped by a pass.
    pub(crate) fn clear_rendered(&mut self) {
        self.top = None;
    }
}

fn check_range(id: &ItemId, start: Timestamp, end: Timestamp) -> Result<(), LayoutError> {
    if start > end {
        return Err(LayoutError::InvalidRange {
            id: id.clone(),
            start,
            end,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> Item {
        Item::from_record(ItemRecord::new("a", "r", 0, 10)).unwrap()
    }

    #[test]
    fn rejects_inverted_range() {
        let err = Item::from_record(ItemRecord::new("a", "r", 10, 0)).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidRange { start: 10, end: 0, .. }));
    }

    #[test]
    fn zero_duration_is_valid() {
        let item = Item::from_record(ItemRecord::new("a", "r", 5, 5)).unwrap();
        assert_eq!(item.duration(), 0);
    }

    #[test]
    fn duration_spans_the_whole_timestamp_range() {
        let item = Item::from_record(ItemRecord::new("a", "r", i64::MIN, i64::MAX)).unwrap();
        assert_eq!(item.duration(), i128::from(u64::MAX));
    }

    #[test]
    fn content_change_invalidates_memos() {
        let mut item = item();
        item.place_stacked(26.0);
        item.place_unstacked(5.0);
        assert_eq!(item.cached_stack_top(), Some(26.0));

        let change = item.apply(ItemRecord::new("a", "r", 0, 20)).unwrap();
        assert_eq!(change, ItemChange::Content);
        assert!(item.is_dirty());
        assert_eq!(item.cached_stack_top(), None);
        assert_eq!(item.cached_unstack_top(), None);
    }

    #[test]
    fn geometry_change_keeps_memos() {
        let mut item = item();
        item.place_stacked(26.0);
        let change = item
            .apply(ItemRecord::new("a", "r", 0, 10).with_extent(40.0, 80.0))
            .unwrap();
        assert_eq!(change, ItemChange::Cosmetic);
        assert_eq!(item.cached_stack_top(), Some(26.0));
        assert_eq!(item.extent, Extent::new(40.0, 80.0));
    }
}
