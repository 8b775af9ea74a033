use crate::model::Bounds;

/// Horizontal slack, in pixels, below which two edges count as touching.
pub const EPSILON: f64 = 0.1;

/// Whether two item boxes overlap.
///
/// Coordinates are rounded to one decimal first so that jitter from the
/// time-to-pixel conversion cannot create or hide a collision. Horizontally,
/// boxes that merely touch (within [`EPSILON`]) do not overlap. Vertically,
/// equal tops always overlap and spans that touch do too, so a box placed
/// directly below another must leave at least one pixel of room.
///
/// Both layout engines go through this predicate; there is no second overlap
/// test anywhere in the crate.
pub fn collides(a: &Bounds, b: &Bounds) -> bool {
    let a = a.rounded();
    let b = b.rounded();

    let horizontal = !(a.left + a.width <= b.left + EPSILON || b.left + b.width <= a.left + EPSILON);
    let vertical = a.top == b.top || !(b.bottom() < a.top || a.bottom() < b.top);

    horizontal && vertical
}

/// The first already-placed box that `candidate` collides with.
pub fn first_collision<'a>(candidate: &Bounds, placed: &'a [Bounds]) -> Option<&'a Bounds> {
    placed.iter().find(|other| collides(candidate, other))
}
