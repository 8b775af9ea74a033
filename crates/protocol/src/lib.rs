pub mod commands;
pub mod ids;
pub mod records;
pub mod trigger;
pub mod types;

pub use commands::LayoutCommand;
pub use ids::{ItemId, RowId, SubLaneKey};
pub use records::{ItemRecord, RowRecord};
pub use trigger::Trigger;
pub use types::{Extent, TimeWindow, Timestamp};
