use serde::{Deserialize, Serialize};

/// An instant on the time axis, in milliseconds since the Unix epoch.
pub type Timestamp = i64;

/// Horizontal placement of an item in pixels, supplied by the collaborator
/// that maps time to screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Extent {
    pub left: f64,
    pub width: f64,
}

impl Extent {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// A visible range of the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeWindow {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Length of the window in milliseconds (never negative).
    pub fn duration(&self) -> i64 {
        self.end.saturating_sub(self.start).max(0)
    }

    /// Shift the window by `delta` milliseconds. Both ends saturate at the
    /// limits of the time axis.
    pub fn shifted(&self, delta: i64) -> Self {
        Self {
            start: self.start.saturating_add(delta),
            end: self.end.saturating_add(delta),
        }
    }
}
