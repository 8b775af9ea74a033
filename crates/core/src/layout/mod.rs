pub mod cache;
pub mod collision;
pub mod filter;
pub mod height;
pub mod stack;
pub mod toggle;
pub mod unstack;

pub use cache::{LaneKey, RowCache};
pub use collision::collides;
pub use height::{HeightTracker, aggregate_height};
pub use stack::{StackParams, stack_items};
pub use toggle::{RowMode, ToggleController, UpstreamToggle};
pub use unstack::{UnstackParams, unstack_items};

use stackline_protocol::LayoutCommand;
use tracing::debug_span;

use crate::config::LayoutConfig;
use crate::model::Row;

/// Run one complete layout pass over a row and return what the renderer must
/// apply.
///
/// Visible items are sorted, placed by the engine of the row's current mode
/// and measured. Every placed item gets an offset command; the row height is
/// reported per [`HeightTracker::settle`]; the toggle affordance is always
/// reported.
pub fn layout_row(row: &mut Row, config: &LayoutConfig) -> Vec<LayoutCommand> {
    let mode = row.toggle.mode();
    let Row {
        id,
        sub_lane_stacking,
        items,
        toggle,
        cache,
        heights,
    } = row;

    for item in items.iter_mut().filter(|item| !item.visible) {
        item.clear_rendered();
    }

    let mut visible = filter::visible_in_layout_order(items, mode);
    let _span = debug_span!("layout_row", row = %id, ?mode, items = visible.len()).entered();
    cache.observe_item_count(visible.len());

    match mode {
        RowMode::Stacked => {
            let params = StackParams {
                base_offset: config.base_offset,
                sub_lane_stacking: *sub_lane_stacking,
                force: cache.stack_forced(),
            };
            stack_items(&mut visible, params, &mut cache.bands);
            cache.finish_stack_pass();
        }
        RowMode::Unstacked => {
            let params = UnstackParams {
                base_offset: config.base_offset,
                sub_lane_stacking: *sub_lane_stacking,
            };
            unstack_items(&mut visible, params, cache);
            cache.finish_unstack_pass();
        }
    }

    let placed = visible
        .iter()
        .filter_map(|item| item.offset().map(|top| item.bounds_at(top)));
    let height = aggregate_height(placed, config);

    let mut commands = Vec::with_capacity(visible.len() + 2);
    for item in &visible {
        if let Some(offset) = item.offset() {
            commands.push(LayoutCommand::SetItemOffset {
                item: item.id.clone(),
                offset,
            });
        }
    }
    if let Some(height) = heights.settle(visible.len(), height) {
        commands.push(LayoutCommand::SetRowHeight {
            row: id.clone(),
            height,
        });
    }
    let first_height = visible.first().map(|item| item.height);
    commands.push(LayoutCommand::SetToggleAffordanceVisible {
        row: id.clone(),
        visible: toggle.affordance_visible(visible.len(), height, first_height, config.margin),
    });
    commands
}
