use stackline_protocol::{ItemId, RowId, Timestamp};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("unknown row: {0}")]
    UnknownRow(RowId),
    #[error("unknown item: {0}")]
    UnknownItem(ItemId),
    #[error("item {0} is already registered")]
    DuplicateItem(ItemId),
    #[error("item {id} ends before it starts ({start} > {end})")]
    InvalidRange {
        id: ItemId,
        start: Timestamp,
        end: Timestamp,
    },
    #[error("resizing item {id} would leave it without duration")]
    EmptyResize { id: ItemId },
}
