use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use stackline_core::{LayoutConfig, Timeline};
use stackline_protocol::{Extent, ItemId, ItemRecord, RowRecord, TimeWindow, Timestamp};

/// A timeline loaded from disk: configuration, the visible window and the
/// records to lay out.
#[derive(Debug, Clone, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub config: LayoutConfig,
    pub window: TimeWindow,
    #[serde(default)]
    pub rows: Vec<RowRecord>,
    #[serde(default)]
    pub items: Vec<ItemRecord>,
}

impl Scene {
    pub fn load(path: &Path) -> Result<Self> {
        let data =
            std::fs::read(path).with_context(|| format!("reading scene {}", path.display()))?;
        Self::from_slice(&data).with_context(|| format!("parsing scene {}", path.display()))
    }

    pub fn from_slice(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Build a timeline with every item positioned horizontally by `scale`.
    /// Extents already present in the file are replaced.
    pub fn into_timeline(self, scale: &TimeScale) -> Result<Timeline> {
        let mut timeline = Timeline::new(self.config);
        for row in self.rows {
            timeline.add_row(row);
        }
        for mut item in self.items {
            item.extent = scale.extent(item.start, item.end);
            let id = item.id.clone();
            timeline
                .add_item(item)
                .with_context(|| format!("registering item {id}"))?;
        }
        Ok(timeline)
    }
}

/// Linear mapping from a time window onto `width` pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    window: TimeWindow,
    width: f64,
}

impl TimeScale {
    pub fn new(window: TimeWindow, width: f64) -> Self {
        Self { window, width }
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    fn px_per_ms(&self) -> f64 {
        match self.window.duration() {
            0 => 0.0,
            d => self.width / d as f64,
        }
    }

    pub fn x(&self, t: Timestamp) -> f64 {
        (i128::from(t) - i128::from(self.window.start)) as f64 * self.px_per_ms()
    }

    /// Time under pixel `x`. An empty window maps everything to its start.
    pub fn time_at(&self, x: f64) -> Timestamp {
        let per_ms = self.px_per_ms();
        if per_ms <= 0.0 {
            return self.window.start;
        }
        self.window.start.saturating_add((x / per_ms).floor() as i64)
    }

    pub fn extent(&self, start: Timestamp, end: Timestamp) -> Extent {
        let left = self.x(start);
        Extent::new(left, (self.x(end) - left).max(0.0))
    }

    pub fn with_window(self, window: TimeWindow) -> Self {
        Self { window, ..self }
    }

    pub fn with_width(self, width: f64) -> Self {
        Self { width, ..self }
    }
}

/// Re-derive every item's extent from `scale`. Geometry updates never
/// invalidate memoized offsets; the caller follows up with a viewport trigger.
pub fn reposition(timeline: &mut Timeline, scale: &TimeScale) -> Result<()> {
    let spans: Vec<(ItemId, Timestamp, Timestamp)> = timeline
        .items()
        .map(|item| (item.id.clone(), item.start, item.end))
        .collect();
    for (id, start, end) in spans {
        timeline.set_item_geometry(&id, scale.extent(start, end))?;
    }
    Ok(())
}
