use stackline_protocol::Timestamp;
use tracing::trace;

use crate::layout::cache::{LaneKey, RowCache};
use crate::model::Item;

/// Inputs of an unstacked-mode pass that come from the row.
#[derive(Debug, Clone, Copy)]
pub struct UnstackParams {
    pub base_offset: f64,
    pub sub_lane_stacking: bool,
}

/// One occupied lane while a pass is running.
#[derive(Debug, Clone, Copy)]
struct Lane {
    top: f64,
    /// Latest end time of anything placed in the lane so far.
    end: Timestamp,
    /// Lowest pixel reached by anything placed in the lane so far.
    bottom: f64,
}

/// Lanes in use during one pass, ordered by offset.
#[derive(Debug, Default)]
struct Occupancy {
    lanes: Vec<Lane>,
}

impl Occupancy {
    fn occupy(&mut self, top: f64, end: Timestamp, height: f64) {
        let bottom = top + height;
        match self.lanes.iter_mut().find(|lane| lane.top == top) {
            Some(lane) => {
                lane.end = lane.end.max(end);
                lane.bottom = lane.bottom.max(bottom);
            }
            None => {
                let at = self.lanes.partition_point(|lane| lane.top < top);
                self.lanes.insert(at, Lane { top, end, bottom });
            }
        }
    }

    /// Topmost lane whose occupant has ended before `start`.
    fn reusable(&self, start: Timestamp) -> Option<f64> {
        self.lanes.iter().find(|lane| lane.end < start).map(|lane| lane.top)
    }

    /// A fresh lane one pixel below everything placed so far.
    fn next_free(&self, base_offset: f64) -> f64 {
        self.lanes
            .iter()
            .map(|lane| lane.bottom + 1.0)
            .fold(None, |acc: Option<f64>, b| Some(acc.map_or(b, |a| a.max(b))))
            .unwrap_or(base_offset)
    }
}

/// Give every sub-lane one fixed offset and put all its items there.
///
/// Without sub-lane stacking every item shares the default lane at the base
/// offset. With it, the first lane gets the base offset; each new lane first
/// tries to reuse the topmost lane whose occupant ended before the new
/// item starts and otherwise opens a lane below everything placed so far.
///
/// Lane offsets are memoized in `cache` and reused until the cache is forced
/// or the visible item count changes. Items in one lane are assumed to be
/// temporally disjoint; no collision search runs here.
pub fn unstack_items(items: &mut [&mut Item], params: UnstackParams, cache: &mut RowCache) {
    let recompute = cache.unstack_forced();
    if recompute {
        cache.lanes.clear();
    }
    let mut occupancy = Occupancy::default();

    for item in items.iter_mut() {
        let top = if params.sub_lane_stacking {
            let key = LaneKey::of(item.sub_lane.as_ref());
            let memo = if recompute {
                None
            } else {
                item.cached_unstack_top()
                    .filter(|&top| top >= params.base_offset)
            };
            match (memo, cache.lane_top(&key)) {
                (_, Some(top)) => top,
                (Some(top), None) => {
                    cache.lanes.insert(key, top);
                    top
                }
                (None, None) => {
                    let top = if cache.lanes.is_empty() {
                        params.base_offset
                    } else if let Some(top) = occupancy.reusable(item.start) {
                        trace!(item = %item.id, top, "unstack: reusing ended lane");
                        top
                    } else {
                        occupancy.next_free(params.base_offset)
                    };
                    trace!(item = %item.id, ?key, top, "unstack: assigned lane");
                    cache.lanes.insert(key, top);
                    top
                }
            }
        } else {
            cache.lanes.insert(LaneKey::Default, params.base_offset);
            params.base_offset
        };

        occupancy.occupy(top, item.end, item.height);
        item.place_unstacked(top);
    }
}
