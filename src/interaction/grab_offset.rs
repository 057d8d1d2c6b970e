//! Shared cell for the pointer grab offset.
//!
//! A drag payload is built when the grid lays out its tiles, long before any
//! pointer touches them. The grab offset only becomes known at pointer-down,
//! so the payload carries a handle to this cell rather than a number. Writes
//! made at pointer-down are visible through every clone of the handle,
//! including the one inside a payload built earlier.

use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct GrabOffsetHolder(Rc<Cell<f32>>);

impl GrabOffsetHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the distance in pixels from the tile's leading edge to the
    /// contact point.
    pub fn set(&self, offset: f32) {
        self.0.set(offset);
    }

    pub fn get(&self) -> f32 {
        self.0.get()
    }

    /// True when both handles point at the same cell.
    pub fn shares_cell_with(&self, other: &GrabOffsetHolder) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
