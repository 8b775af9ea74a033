use crate::config::LayoutConfig;
use crate::model::Bounds;

/// Height of a row from the boxes placed in it.
///
/// Empty rows get the label height. A single item never shrinks the row
/// below the label, so short items do not make the row flicker. Otherwise the
/// row reaches the lowest box. The margin is always added below.
pub fn aggregate_height<I>(placed: I, config: &LayoutConfig) -> f64
where
    I: IntoIterator<Item = Bounds>,
{
    let mut count = 0usize;
    let mut lowest = f64::NEG_INFINITY;
    for bounds in placed {
        count += 1;
        lowest = lowest.max(bounds.bottom());
    }

    match count {
        0 => config.min_row_height(),
        1 => lowest.max(config.min_label_height) + config.margin,
        _ => lowest + config.margin,
    }
}

/// Remembers the last height of a row and decides when to report it.
#[derive(Debug, Clone, Default)]
pub struct HeightTracker {
    height: Option<f64>,
    was_non_empty: bool,
}

impl HeightTracker {
    /// Store the height of a finished pass. Returns the height when it must be
    /// reported: always for a non-empty row, and exactly once when a row that
    /// had items becomes empty.
    pub fn settle(&mut self, visible: usize, height: f64) -> Option<f64> {
        self.height = Some(height);
        if visible > 0 {
            self.was_non_empty = true;
            Some(height)
        } else if std::mem::take(&mut self.was_non_empty) {
            Some(height)
        } else {
            None
        }
    }

    pub fn current(&self) -> Option<f64> {
        self.height
    }
}
