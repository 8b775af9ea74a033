use std::collections::HashMap;

use stackline_protocol::SubLaneKey;
use tracing::trace;

use crate::layout::collision::first_collision;
use crate::model::{Bounds, Item};

/// Inputs of a stacked-mode pass that come from the row.
#[derive(Debug, Clone, Copy)]
pub struct StackParams {
    pub base_offset: f64,
    pub sub_lane_stacking: bool,
    /// Ignore every memoized offset for this pass.
    pub force: bool,
}

/// Place `items` (already in layout order) so that no two colliding boxes
/// share vertical space.
///
/// Each item keeps its memoized offset when it has one, the pass is not
/// forced, and the memo still fits among the items placed before it.
/// Otherwise a first-fit search runs from the row's base offset, or from the
/// top of the item's sub-lane band when sub-lane stacking is on.
///
/// `bands` is rebuilt: it ends up holding the first offset seen for every
/// sub-lane key.
pub fn stack_items(
    items: &mut [&mut Item],
    params: StackParams,
    bands: &mut HashMap<SubLaneKey, f64>,
) {
    bands.clear();
    let mut placed: Vec<Bounds> = Vec::with_capacity(items.len());

    for item in items.iter_mut() {
        let band = match (&item.sub_lane, params.sub_lane_stacking) {
            (Some(key), true) => bands.get(key).copied(),
            _ => None,
        };
        let search_from = band.unwrap_or(params.base_offset);

        let memo = if params.force {
            None
        } else {
            item.cached_stack_top()
                .filter(|&top| top >= params.base_offset)
                .filter(|&top| first_collision(&item.bounds_at(top), &placed).is_none())
        };

        let top = match memo {
            Some(top) => {
                trace!(item = %item.id, top, "stack: reusing memoized offset");
                top
            }
            None => {
                let top = first_free_top(&placed, item.bounds_at(search_from));
                trace!(item = %item.id, top, search_from, "stack: searched offset");
                top
            }
        };

        item.place_stacked(top);
        placed.push(item.bounds_at(top));
        if params.sub_lane_stacking
            && let Some(key) = &item.sub_lane
        {
            bands.entry(key.clone()).or_insert(top);
        }
    }
}

/// First-fit search: slide `candidate` down past every box it collides
/// with, restarting the scan after each move, until it collides with none.
///
/// Every move lands one pixel below the box that was hit, so the candidate
/// only ever moves down and can never hit that box again. The scan therefore
/// restarts at most once per placed box.
pub fn first_free_top(placed: &[Bounds], candidate: Bounds) -> f64 {
    let mut candidate = candidate;
    while let Some(hit) = first_collision(&candidate, placed) {
        let next = hit.bottom() + 1.0;
        if !(next > candidate.top) {
            // Non-finite geometry; there is no lower slot to find.
            break;
        }
        candidate = candidate.at_top(next);
    }
    candidate.top
}
