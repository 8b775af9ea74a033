use std::collections::BTreeSet;

use stackline_protocol::{ItemId, RowId, Timestamp};
use tracing::debug;

use crate::timeline::Timeline;

/// Keyboard modifiers held when a pointer gesture starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    /// Shift-drag: rubber-band selection of items.
    Select,
    /// Ctrl-drag: sketch the time range of a new item.
    Create,
}

/// A new item the user sketched by dragging across a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedItem {
    pub row: RowId,
    pub start: Timestamp,
    pub end: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    Selected(Vec<ItemId>),
    Create(ProposedItem),
    /// A create-drag that did not end over a row.
    Nothing,
}

#[derive(Debug, Clone)]
struct Drag {
    kind: DragKind,
    origin_time: Timestamp,
    origin_y: f64,
}

/// Transient pointer state of one timeline view.
///
/// Each view owns its own session and passes it to its input handlers.
#[derive(Debug, Clone, Default)]
pub struct InteractionSession {
    drag: Option<Drag>,
    selection: BTreeSet<ItemId>,
}

impl InteractionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a drag if the modifiers ask for one. Returns the kind started.
    pub fn begin_drag(&mut self, time: Timestamp, y: f64, modifiers: Modifiers) -> Option<DragKind> {
        let kind = if modifiers.shift {
            DragKind::Select
        } else if modifiers.ctrl {
            DragKind::Create
        } else {
            return None;
        };
        debug!(?kind, time, y, "interaction: drag started");
        self.drag = Some(Drag {
            kind,
            origin_time: time,
            origin_y: y,
        });
        Some(kind)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Follow the pointer. A selection drag replaces the selection with every
    /// placed item whose box meets the dragged box.
    pub fn update_drag(&mut self, time: Timestamp, y: f64, timeline: &Timeline) -> &BTreeSet<ItemId> {
        if let Some(drag) = &self.drag
            && drag.kind == DragKind::Select
        {
            self.selection = items_in_box(timeline, (drag.origin_time, time), (drag.origin_y, y));
        }
        &self.selection
    }

    /// Finish the drag. `row` is the row under the pointer, if any.
    pub fn end_drag(
        &mut self,
        time: Timestamp,
        y: f64,
        row: Option<&RowId>,
        timeline: &Timeline,
    ) -> DragOutcome {
        let Some(drag) = self.drag.take() else {
            return DragOutcome::Nothing;
        };
        match drag.kind {
            DragKind::Select => {
                self.selection = items_in_box(timeline, (drag.origin_time, time), (drag.origin_y, y));
                DragOutcome::Selected(self.selection.iter().cloned().collect())
            }
            DragKind::Create => match row {
                Some(row) => DragOutcome::Create(ProposedItem {
                    row: row.clone(),
                    start: drag.origin_time.min(time),
                    end: drag.origin_time.max(time),
                }),
                None => DragOutcome::Nothing,
            },
        }
    }

    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    pub fn selection(&self) -> &BTreeSet<ItemId> {
        &self.selection
    }

    /// Replace the selection, e.g. after a plain click.
    pub fn select(&mut self, items: impl IntoIterator<Item = ItemId>) {
        self.selection = items.into_iter().collect();
    }

    /// Topmost placed item under a timeline-global point, if any.
    pub fn item_at(time: Timestamp, y: f64, timeline: &Timeline) -> Option<ItemId> {
        items_in_box(timeline, (time, time), (y, y)).into_iter().next()
    }

    /// A click without drag modifiers. Alt extends the selection to the hit
    /// item's sub-lane, otherwise the hit item alone is selected. Clicking
    /// empty space clears the selection.
    pub fn click(
        &mut self,
        time: Timestamp,
        y: f64,
        modifiers: Modifiers,
        timeline: &Timeline,
    ) -> &BTreeSet<ItemId> {
        match Self::item_at(time, y, timeline) {
            Some(hit) if modifiers.alt => return self.expand_to_sub_lane(&hit, timeline),
            Some(hit) => self.select([hit]),
            None => self.selection.clear(),
        }
        &self.selection
    }

    /// Alt-click: add every item sharing the clicked item's sub-lane, in any
    /// row. Items without a sub-lane only add themselves.
    pub fn expand_to_sub_lane(&mut self, clicked: &ItemId, timeline: &Timeline) -> &BTreeSet<ItemId> {
        let Some(target) = timeline.item(clicked) else {
            return &self.selection;
        };
        self.selection.insert(clicked.clone());
        if let Some(lane) = &target.sub_lane {
            let matching = timeline
                .items()
                .filter(|item| item.sub_lane.as_ref() == Some(lane))
                .map(|item| item.id.clone());
            self.selection.extend(matching);
        }
        &self.selection
    }
}

/// Items whose `[start, end] x [top, top + height]` box intersects the box
/// spanned by two time values and two timeline-global y values. Edges count.
fn items_in_box(
    timeline: &Timeline,
    (t0, t1): (Timestamp, Timestamp),
    (y0, y1): (f64, f64),
) -> BTreeSet<ItemId> {
    let (t0, t1) = (t0.min(t1), t0.max(t1));
    let (y0, y1) = (y0.min(y1), y0.max(y1));

    let mut hits = BTreeSet::new();
    for (row_id, row_top) in timeline.row_tops() {
        let Some(row) = timeline.row(&row_id) else {
            continue;
        };
        for item in row.items().iter().filter(|item| item.visible) {
            let Some(offset) = item.offset() else {
                continue;
            };
            let top = row_top + offset;
            let bottom = top + item.height;
            let meets_time = item.start <= t1 && item.end >= t0;
            let meets_y = top <= y1 && bottom >= y0;
            if meets_time && meets_y {
                hits.insert(item.id.clone());
            }
        }
    }
    hits
}
