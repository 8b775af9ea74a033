use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which engine lays out a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowMode {
    /// Overlapping items are packed into separate bands.
    Stacked,
    /// Each sub-lane occupies one fixed band.
    Unstacked,
}

impl RowMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Stacked => Self::Unstacked,
            Self::Unstacked => Self::Stacked,
        }
    }
}

/// What to do with a generic expand/collapse notification from the host
/// framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamToggle {
    /// The notification is the echo of our own toggle; drop it.
    Suppressed,
    /// Unrelated to our toggle; let the framework handle it.
    Forward,
}

/// Per-row stacked/unstacked state machine.
#[derive(Debug, Clone)]
pub struct ToggleController {
    mode: RowMode,
    suppress_upstream: bool,
}

impl ToggleController {
    /// Start from the row's explicit `collapsed` value, or from the
    /// configured preference when the row does not carry one.
    pub fn new(collapsed: Option<bool>, prefer_stacked: bool) -> Self {
        let stacked = collapsed.map_or(prefer_stacked, |collapsed| !collapsed);
        Self {
            mode: if stacked {
                RowMode::Stacked
            } else {
                RowMode::Unstacked
            },
            suppress_upstream: false,
        }
    }

    pub fn mode(&self) -> RowMode {
        self.mode
    }

    /// Flip the mode on a user click. The same click also reaches the host
    /// framework as an expand/collapse notification, which is swallowed by
    /// the next [`Self::on_upstream_toggle`].
    pub fn toggle(&mut self) -> RowMode {
        self.mode = self.mode.toggled();
        self.suppress_upstream = true;
        debug!(mode = ?self.mode, "toggle: switched row mode");
        self.mode
    }

    pub fn on_upstream_toggle(&mut self) -> UpstreamToggle {
        if std::mem::take(&mut self.suppress_upstream) {
            UpstreamToggle::Suppressed
        } else {
            UpstreamToggle::Forward
        }
    }

    /// Whether switching modes would change anything visible.
    ///
    /// Stacked rows offer the toggle only when stacking actually grew the row
    /// past one item plus twice the margin; unstacked rows whenever they hold
    /// more than one item.
    pub fn affordance_visible(
        &self,
        visible_items: usize,
        row_height: f64,
        first_item_height: Option<f64>,
        margin: f64,
    ) -> bool {
        if visible_items <= 1 {
            return false;
        }
        match self.mode {
            RowMode::Stacked => {
                first_item_height.is_some_and(|h| row_height > h + margin * 2.0)
            }
            RowMode::Unstacked => true,
        }
    }
}
