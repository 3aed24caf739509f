//! Rectangles and stage dimensions

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MosaicError, Result};

/// Smallest width or height a zone may have, in stage pixels.
pub const MIN_ZONE_SIZE: f64 = 20.0;

/// Tolerance for bound checks on clamped floating point positions.
const EPSILON: f64 = 1e-6;

/// A position on the stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Axis-aligned rectangle in stage pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner
    pub fn origin(&self) -> Point {
        Point {
            x: self.x,
            y: self.y,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Same size, new top-left corner
    pub fn moved_to(&self, origin: Point) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            ..*self
        }
    }

    /// Check the size could be placed on the stage at all
    pub fn fits_within(&self, stage: StageSize) -> bool {
        self.width <= stage.width() + EPSILON && self.height <= stage.height() + EPSILON
    }

    /// Check the full zone invariant: minimum size and inside the stage
    pub fn is_legal(&self, stage: StageSize) -> bool {
        self.width >= MIN_ZONE_SIZE && self.height >= MIN_ZONE_SIZE && stage.contains(self)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}x{:.1} @ ({:.1}, {:.1})",
            self.width, self.height, self.x, self.y
        )
    }
}

/// Stage dimensions, guaranteed strictly positive.
///
/// A zero or negative stage is a programmer error, so construction fails
/// instead of producing a zero-area clamp range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStage", into = "RawStage")]
pub struct StageSize {
    width: f64,
    height: f64,
}

#[derive(Serialize, Deserialize)]
struct RawStage {
    width: f64,
    height: f64,
}

impl TryFrom<RawStage> for StageSize {
    type Error = MosaicError;

    fn try_from(raw: RawStage) -> Result<Self> {
        StageSize::new(raw.width, raw.height)
    }
}

impl From<StageSize> for RawStage {
    fn from(stage: StageSize) -> Self {
        RawStage {
            width: stage.width,
            height: stage.height,
        }
    }
}

impl StageSize {
    /// The fixed logical editing canvas.
    pub const EDIT: StageSize = StageSize {
        width: 720.0,
        height: 380.0,
    };

    /// Saved-layout thumbnail canvas.
    pub const THUMBNAIL: StageSize = StageSize {
        width: 150.0,
        height: 80.0,
    };

    pub fn new(width: f64, height: f64) -> Result<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return Err(MosaicError::InvalidStage { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Check a rectangle lies fully inside the stage
    pub fn contains(&self, rect: &Rect) -> bool {
        rect.x >= -EPSILON
            && rect.y >= -EPSILON
            && rect.right() <= self.width + EPSILON
            && rect.bottom() <= self.height + EPSILON
    }
}

impl Default for StageSize {
    fn default() -> Self {
        Self::EDIT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_rejects_non_positive() {
        assert!(StageSize::new(0.0, 380.0).is_err());
        assert!(StageSize::new(720.0, -1.0).is_err());
        assert!(StageSize::new(f64::NAN, 380.0).is_err());
        assert!(StageSize::new(720.0, 380.0).is_ok());
    }

    #[test]
    fn test_stage_deserialize_validates() {
        let ok: StageSize = serde_json::from_str(r#"{"width":150,"height":80}"#).unwrap();
        assert_eq!(ok, StageSize::THUMBNAIL);

        let bad = serde_json::from_str::<StageSize>(r#"{"width":0,"height":80}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_rect_legality() {
        let stage = StageSize::EDIT;
        assert!(Rect::new(0.0, 0.0, 300.0, 200.0).is_legal(stage));
        assert!(Rect::new(420.0, 180.0, 300.0, 200.0).is_legal(stage));
        assert!(!Rect::new(421.0, 0.0, 300.0, 200.0).is_legal(stage));
        assert!(!Rect::new(-1.0, 0.0, 300.0, 200.0).is_legal(stage));
        assert!(!Rect::new(0.0, 0.0, 19.0, 200.0).is_legal(stage));
    }

    #[test]
    fn test_fits_within() {
        assert!(Rect::new(0.0, 0.0, 720.0, 380.0).fits_within(StageSize::EDIT));
        assert!(!Rect::new(0.0, 0.0, 721.0, 100.0).fits_within(StageSize::EDIT));
    }
}
