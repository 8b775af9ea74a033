//! Vertical layout of time-interval items inside timeline rows.
//!
//! Rows are laid out either *stacked* (overlapping items are packed into
//! separate bands by a first-fit search) or *unstacked* (every sub-lane gets
//! one fixed band). Offsets are memoized per item and per row so that panning
//! and zooming leave untouched items where they were.
//!
//! ```text
//!   Trigger ──▶ Timeline ──▶ filter & sort ──▶ stack / unstack ──▶ height ──▶ LayoutCommand[]
//! ```

pub mod config;
pub mod error;
pub mod interaction;
pub mod layout;
pub mod model;
pub mod timeline;

pub use config::LayoutConfig;
pub use error::LayoutError;
pub use interaction::{DragKind, DragOutcome, InteractionSession, Modifiers, ProposedItem};
pub use layout::{RowMode, UpstreamToggle};
pub use model::{Item, ItemChange, Row};
pub use timeline::{EditKind, Timeline};
