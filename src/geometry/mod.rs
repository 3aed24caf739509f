//! Geometry Engine
//!
//! Pure functions for zone placement on the editing stage:
//! - Clamped drag and resize results
//! - Edit stage to thumbnail scaling
//!
//! Nothing in this module holds state. Callers feed the results into
//! `LayoutStore::update_zone`.

mod engine;
mod rect;

pub use engine::{apply_drag, apply_resize, scale_for_thumbnail, Resize};
pub use rect::{Point, Rect, StageSize, MIN_ZONE_SIZE};
