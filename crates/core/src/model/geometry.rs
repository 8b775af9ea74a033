use stackline_protocol::Extent;

/// Axis-aligned box of an item in row-local pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub width: f64,
    pub top: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(left: f64, width: f64, top: f64, height: f64) -> Self {
        Self {
            left,
            width,
            top,
            height,
        }
    }

    pub fn from_extent(extent: Extent, top: f64, height: f64) -> Self {
        Self::new(extent.left, extent.width, top, height)
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// The same box moved to another vertical offset.
    pub fn at_top(self, top: f64) -> Self {
        Self { top, ..self }
    }

    /// Every coordinate rounded to one decimal place.
    pub fn rounded(&self) -> Self {
        Self::new(
            round_tenth(self.left),
            round_tenth(self.width),
            round_tenth(self.top),
            round_tenth(self.height),
        )
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
