use std::collections::HashMap;

use stackline_protocol::SubLaneKey;
use tracing::debug;

/// Lane identity in unstacked mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LaneKey {
    /// Items without a sub-lane, or every item when sub-lane stacking is off.
    Default,
    SubLane(SubLaneKey),
}

impl LaneKey {
    pub fn of(sub_lane: Option<&SubLaneKey>) -> Self {
        sub_lane.map_or(Self::Default, |key| Self::SubLane(key.clone()))
    }
}

/// Row-scoped memo of lane assignments plus the flags that invalidate memos.
#[derive(Debug, Clone, Default)]
pub struct RowCache {
    /// Unstacked-mode lane offset per lane key, built lazily.
    pub(crate) lanes: HashMap<LaneKey, f64>,
    /// Stacked-mode band top per sub-lane, rebuilt on every stacked pass.
    pub(crate) bands: HashMap<SubLaneKey, f64>,
    last_item_count: Option<usize>,
    recalc_stack: bool,
    recalc_unstack: bool,
}

impl RowCache {
    /// Bypass every memo of this row for the next pass of each mode.
    pub fn force_recompute(&mut self) {
        debug!("row cache: forced recompute");
        self.recalc_stack = true;
        self.recalc_unstack = true;
        self.lanes.clear();
    }

    pub fn stack_forced(&self) -> bool {
        self.recalc_stack
    }

    pub fn unstack_forced(&self) -> bool {
        self.recalc_unstack
    }

    pub fn lane_top(&self, key: &LaneKey) -> Option<f64> {
        self.lanes.get(key).copied()
    }

    /// Note the number of visible items of the current pass. Lane assignment
    /// depends on it, so a change drops the lane memo and forces the next
    /// unstacked pass to recompute. Returns whether the count changed.
    pub(crate) fn observe_item_count(&mut self, count: usize) -> bool {
        if self.last_item_count == Some(count) {
            return false;
        }
        debug!(
            previous = ?self.last_item_count,
            count, "row cache: visible item count changed, dropping lanes"
        );
        self.last_item_count = Some(count);
        self.lanes.clear();
        self.recalc_unstack = true;
        true
    }

    pub(crate) fn finish_stack_pass(&mut self) {
        self.recalc_stack = false;
    }

    pub(crate) fn finish_unstack_pass(&mut self) {
        self.recalc_unstack = false;
    }
}
