use std::cmp::Ordering;

use crate::layout::RowMode;
use crate::model::Item;

/// Visible items of a row, in the order both engines place them.
///
/// Order: sub-lane key (items without one last), sub-lane order (unset
/// last), then, in unstacked mode, the memoized lane offset (unset last),
/// then start time. End time and id break the remaining ties so the order is
/// total and reproducible.
pub fn visible_in_layout_order(items: &mut [Item], mode: RowMode) -> Vec<&mut Item> {
    let mut visible: Vec<&mut Item> = items.iter_mut().filter(|item| item.visible).collect();
    visible.sort_by(|a, b| layout_order(a, b, mode));
    visible
}

pub fn layout_order(a: &Item, b: &Item, mode: RowMode) -> Ordering {
    none_last(a.sub_lane.as_ref(), b.sub_lane.as_ref(), |x, y| x.cmp(y))
        .then_with(|| none_last(a.sub_lane_order, b.sub_lane_order, |x, y| x.cmp(&y)))
        .then_with(|| match mode {
            RowMode::Unstacked => none_last(a.cached_unstack_top(), b.cached_unstack_top(), |x, y| {
                x.total_cmp(&y)
            }),
            RowMode::Stacked => Ordering::Equal,
        })
        .then_with(|| a.start.cmp(&b.start))
        .then_with(|| a.end.cmp(&b.end))
        .then_with(|| a.id.cmp(&b.id))
}

fn none_last<T>(a: Option<T>, b: Option<T>, cmp: impl FnOnce(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackline_protocol::ItemRecord;

    fn item(record: ItemRecord) -> Item {
        Item::from_record(record).unwrap()
    }

    fn ids(items: &[&mut Item]) -> Vec<String> {
        items.iter().map(|i| i.id.to_string()).collect()
    }

    #[test]
    fn hidden_items_are_dropped() {
        let mut items = vec![
            item(ItemRecord::new("a", "r", 0, 10)),
            item(ItemRecord::new("b", "r", 0, 10).hidden()),
        ];
        let visible = visible_in_layout_order(&mut items, RowMode::Stacked);
        assert_eq!(ids(&visible), ["a"]);
    }

    #[test]
    fn sub_lanes_first_then_order_then_start() {
        let mut items = vec![
            item(ItemRecord::new("plain", "r", 0, 10)),
            item(ItemRecord::new("b-late", "r", 50, 60).with_sub_lane("b")),
            item(ItemRecord::new("b-early", "r", 10, 20).with_sub_lane("b")),
            item(ItemRecord::new("a-2", "r", 0, 5).with_sub_lane("a").with_sub_lane_order(2)),
            item(ItemRecord::new("a-1", "r", 90, 95).with_sub_lane("a").with_sub_lane_order(1)),
        ];
        let visible = visible_in_layout_order(&mut items, RowMode::Stacked);
        assert_eq!(ids(&visible), ["a-1", "a-2", "b-early", "b-late", "plain"]);
    }

    #[test]
    fn unstacked_mode_prefers_memoized_offsets() {
        let mut items = vec![
            item(ItemRecord::new("x", "r", 0, 10)),
            item(ItemRecord::new("y", "r", 20, 30)),
        ];
        items[0].place_unstacked(40.0);
        items[1].place_unstacked(5.0);

        let unstacked = visible_in_layout_order(&mut items, RowMode::Unstacked);
        assert_eq!(ids(&unstacked), ["y", "x"]);
        let stacked = visible_in_layout_order(&mut items, RowMode::Stacked);
        assert_eq!(ids(&stacked), ["x", "y"]);
    }
}
