//! End-to-end layout scenarios driven through `Timeline` triggers:
//! collision placement, single-item height, lane reuse, toggle round-trip,
//! structural invalidation, idempotence and the search termination guard.

use stackline_core::{LayoutConfig, RowMode, Timeline};
use stackline_protocol::{ItemId, ItemRecord, LayoutCommand, RowId, RowRecord, Trigger};

/// One millisecond per pixel keeps time overlap and pixel overlap aligned.
fn item(id: &str, row: &str, start: i64, end: i64) -> ItemRecord {
    ItemRecord::new(id, row, start, end).with_extent(start as f64, (end - start) as f64)
}

fn offsets(timeline: &Timeline, ids: &[&str]) -> Vec<f64> {
    ids.iter()
        .map(|id| {
            timeline
                .item_offset(&ItemId::from(*id))
                .expect("item should be placed")
        })
        .collect()
}

fn row_height_command(commands: &[LayoutCommand], row: &str) -> Option<f64> {
    commands.iter().find_map(|cmd| match cmd {
        LayoutCommand::SetRowHeight { row: r, height } if r.as_str() == row => Some(*height),
        _ => None,
    })
}

fn affordance(commands: &[LayoutCommand], row: &str) -> Option<bool> {
    commands.iter().find_map(|cmd| match cmd {
        LayoutCommand::SetToggleAffordanceVisible { row: r, visible } if r.as_str() == row => {
            Some(*visible)
        }
        _ => None,
    })
}

#[test]
fn overlapping_pair_is_stacked_one_pixel_apart() {
    let mut t = Timeline::new(LayoutConfig::default());
    t.add_item(item("A", "r", 0, 10)).unwrap();
    t.add_item(item("B", "r", 5, 15)).unwrap();

    let commands = t.handle(&Trigger::ItemsChanged).unwrap();

    assert_eq!(offsets(&t, &["A", "B"]), [5.0, 26.0]);
    assert_eq!(row_height_command(&commands, "r"), Some(51.0));
    assert_eq!(t.row_height(&RowId::from("r")), Some(51.0));
    assert_eq!(affordance(&commands, "r"), Some(true));
}

#[test]
fn single_item_row_uses_label_height() {
    let config = LayoutConfig {
        min_label_height: 40.0,
        ..LayoutConfig::default()
    };
    let mut t = Timeline::new(config);
    t.add_item(item("A", "r", 0, 10)).unwrap();

    let commands = t.handle(&Trigger::ItemsChanged).unwrap();

    assert_eq!(row_height_command(&commands, "r"), Some(40.0 + 5.0));
    assert_eq!(affordance(&commands, "r"), Some(false));
}

#[test]
fn unstacked_lanes_are_reused_once_their_occupant_ended() {
    let mut t = Timeline::new(LayoutConfig::default());
    t.add_row(
        RowRecord::new("r")
            .with_collapsed(true)
            .with_sub_lane_stacking(true),
    );
    // A and B never overlap; C overlaps A.
    t.add_item(item("A", "r", 0, 10).with_sub_lane("s1")).unwrap();
    t.add_item(item("C", "r", 5, 15).with_sub_lane("s2")).unwrap();
    t.add_item(item("B", "r", 20, 30).with_sub_lane("s3")).unwrap();

    let commands = t.handle(&Trigger::ItemsChanged).unwrap();

    assert_eq!(t.row_mode(&RowId::from("r")), Some(RowMode::Unstacked));
    assert_eq!(offsets(&t, &["A", "C", "B"]), [5.0, 26.0, 5.0]);
    assert_eq!(row_height_command(&commands, "r"), Some(51.0));
    assert_eq!(affordance(&commands, "r"), Some(true));
}

#[test]
fn unstacked_row_without_sub_lane_stacking_uses_one_lane() {
    let mut t = Timeline::new(LayoutConfig {
        prefer_stacked: false,
        ..LayoutConfig::default()
    });
    t.add_item(item("A", "r", 0, 10).with_sub_lane("s1")).unwrap();
    t.add_item(item("B", "r", 5, 15).with_sub_lane("s2")).unwrap();

    t.handle(&Trigger::ItemsChanged).unwrap();

    assert_eq!(t.row_mode(&RowId::from("r")), Some(RowMode::Unstacked));
    assert_eq!(offsets(&t, &["A", "B"]), [5.0, 5.0]);
}

#[test]
fn toggle_round_trip_restores_stacked_offsets() {
    let mut t = Timeline::new(LayoutConfig::default());
    t.add_item(item("a", "r", 0, 30)).unwrap();
    t.add_item(item("b", "r", 10, 40)).unwrap();
    t.add_item(item("c", "r", 20, 50)).unwrap();
    let row = RowId::from("r");

    t.handle(&Trigger::ItemsChanged).unwrap();
    let stacked = offsets(&t, &["a", "b", "c"]);
    assert_eq!(stacked, [5.0, 26.0, 47.0]);

    t.handle(&Trigger::ToggleRequested(row.clone())).unwrap();
    assert_eq!(t.row_mode(&row), Some(RowMode::Unstacked));
    assert_eq!(offsets(&t, &["a", "b", "c"]), [5.0, 5.0, 5.0]);

    t.handle(&Trigger::ToggleRequested(row.clone())).unwrap();
    assert_eq!(t.row_mode(&row), Some(RowMode::Stacked));
    assert_eq!(offsets(&t, &["a", "b", "c"]), stacked);
    for id in ["a", "b", "c"] {
        assert!(!t.item(&ItemId::from(id)).unwrap().is_dirty());
    }
}

#[test]
fn new_item_is_placed_around_memoized_neighbours() {
    let mut t = Timeline::new(LayoutConfig::default());
    t.add_item(item("a", "r", 0, 10)).unwrap();
    t.add_item(item("b", "r", 5, 15)).unwrap();
    t.add_item(item("c", "r", 12, 20)).unwrap();
    t.handle(&Trigger::ItemsChanged).unwrap();
    assert_eq!(offsets(&t, &["a", "b", "c"]), [5.0, 26.0, 5.0]);

    // Sorts first and would take a slot a memo already holds.
    t.add_item(item("d", "r", -5, 8)).unwrap();
    assert!(!t.row(&RowId::from("r")).unwrap().cache().stack_forced());
    t.handle(&Trigger::ItemsChanged).unwrap();

    let row = t.row(&RowId::from("r")).unwrap();
    let items = row.items();
    for (i, x) in items.iter().enumerate() {
        for y in &items[i + 1..] {
            let time_overlap = x.start < y.end && y.start < x.end;
            let (xt, yt) = (x.offset().unwrap(), y.offset().unwrap());
            let disjoint = xt + x.height <= yt || yt + y.height <= xt;
            assert!(!time_overlap || disjoint, "{} and {} overlap", x.id, y.id);
        }
    }
}

#[test]
fn structure_change_recomputes_from_scratch() {
    let mut t = Timeline::new(LayoutConfig::default());
    t.add_item(item("a", "r", 0, 10)).unwrap();
    t.add_item(item("b", "r", 5, 15)).unwrap();
    t.handle(&Trigger::ItemsChanged).unwrap();
    t.remove_item(&ItemId::from("a")).unwrap();

    // Memo keeps b on the lower band until the structure change is announced.
    t.handle(&Trigger::ItemsChanged).unwrap();
    assert_eq!(offsets(&t, &["b"]), [26.0]);

    t.handle(&Trigger::ItemStructureChanged(RowId::from("r")))
        .unwrap();
    assert_eq!(offsets(&t, &["b"]), [5.0]);
    assert!(!t.row(&RowId::from("r")).unwrap().cache().stack_forced());
}

#[test]
fn repeated_passes_are_identical() {
    let mut t = Timeline::new(LayoutConfig::default());
    t.add_row(RowRecord::new("u").with_collapsed(true).with_sub_lane_stacking(true));
    for (i, lane) in ["p", "q", "p", "r", "q"].into_iter().enumerate() {
        let start = i as i64 * 7;
        t.add_item(item(&format!("s{i}"), "s", start, start + 12)).unwrap();
        t.add_item(item(&format!("u{i}"), "u", start, start + 12).with_sub_lane(lane))
            .unwrap();
    }

    let first = t.handle(&Trigger::ViewportRangeChanged).unwrap();
    let second = t.handle(&Trigger::ViewportRangeChanged).unwrap();
    assert_eq!(first, second);
}

#[test]
fn hidden_items_do_not_take_space() {
    let mut t = Timeline::new(LayoutConfig::default());
    t.add_item(item("a", "r", 0, 10)).unwrap();
    t.add_item(item("b", "r", 5, 15).hidden()).unwrap();

    let commands = t.handle(&Trigger::ItemsChanged).unwrap();

    assert_eq!(t.item_offset(&ItemId::from("b")), None);
    assert!(!commands.iter().any(|cmd| matches!(
        cmd,
        LayoutCommand::SetItemOffset { item, .. } if item.as_str() == "b"
    )));
    // One item: the row reaches max(label, item bottom) plus the margin.
    assert_eq!(row_height_command(&commands, "r"), Some(25.0 + 5.0));
}

#[test]
fn emptied_row_reports_its_shrink_once() {
    let mut t = Timeline::new(LayoutConfig::default());
    t.add_item(item("a", "r", 0, 10)).unwrap();
    t.handle(&Trigger::ItemsChanged).unwrap();

    t.set_item_visible(&ItemId::from("a"), false).unwrap();
    let shrink = t.handle(&Trigger::ItemsChanged).unwrap();
    assert_eq!(row_height_command(&shrink, "r"), Some(29.0));

    let again = t.handle(&Trigger::ItemsChanged).unwrap();
    assert_eq!(row_height_command(&again, "r"), None);
}

#[test]
fn identical_items_terminate_in_distinct_bands() {
    let mut t = Timeline::new(LayoutConfig::default());
    let count = 200;
    for i in 0..count {
        t.add_item(item(&format!("i{i:03}"), "r", 0, 0).with_extent(0.0, 10.0))
            .unwrap();
    }

    t.handle(&Trigger::ItemsChanged).unwrap();

    let row = t.row(&RowId::from("r")).unwrap();
    let mut tops: Vec<f64> = row.items().iter().map(|i| i.offset().unwrap()).collect();
    tops.sort_by(f64::total_cmp);
    tops.dedup();
    assert_eq!(tops.len(), count);
    assert_eq!(tops.last().copied(), Some(5.0 + 21.0 * (count as f64 - 1.0)));
}

#[test]
fn zero_width_items_share_a_band() {
    let mut t = Timeline::new(LayoutConfig::default());
    t.add_item(item("a", "r", 10, 10)).unwrap();
    t.add_item(item("b", "r", 10, 10)).unwrap();

    t.handle(&Trigger::ItemsChanged).unwrap();

    assert_eq!(offsets(&t, &["a", "b"]), [5.0, 5.0]);
}
