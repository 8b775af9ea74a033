pub mod geometry;
pub mod item;
pub mod row;

pub use geometry::Bounds;
pub use item::{Item, ItemChange};
pub use row::Row;
