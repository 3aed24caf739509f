//! Drag, resize and thumbnail scaling

use log::debug;

use super::rect::{Point, Rect, StageSize, MIN_ZONE_SIZE};

/// Outcome of a resize request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resize {
    /// The new geometry, position clamped into the stage
    Applied(Rect),
    /// The request broke a size constraint; carries the unchanged prior geometry
    Rejected(Rect),
}

impl Resize {
    /// Resulting geometry, whichever way the request went
    pub fn rect(&self) -> Rect {
        match self {
            Resize::Applied(rect) | Resize::Rejected(rect) => *rect,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Resize::Applied(_))
    }
}

/// Clamp `value` into `[0, max]`, pinning to 0 when the range is empty.
fn clamp_origin(value: f64, max: f64) -> f64 {
    value.min(max).max(0.0)
}

/// Clamp a dragged zone's new top-left corner so the zone stays on stage.
///
/// # Example
/// ```
/// use mosaic::geometry::{apply_drag, Rect, StageSize};
/// let zone = Rect::new(0.0, 0.0, 300.0, 200.0);
/// let p = apply_drag(&zone, 600.0, -40.0, StageSize::EDIT);
/// assert_eq!((p.x, p.y), (420.0, 0.0));
/// ```
pub fn apply_drag(zone: &Rect, proposed_x: f64, proposed_y: f64, stage: StageSize) -> Point {
    Point {
        x: clamp_origin(proposed_x, stage.width() - zone.width),
        y: clamp_origin(proposed_y, stage.height() - zone.height),
    }
}

/// Resolve a resize gesture into legal geometry.
///
/// Sizes below [`MIN_ZONE_SIZE`] or larger than the stage are rejected and
/// the prior rectangle comes back untouched. Otherwise the size is taken as
/// requested and the position is clamped into the stage.
pub fn apply_resize(
    prior: &Rect,
    raw_width: f64,
    raw_height: f64,
    proposed_x: f64,
    proposed_y: f64,
    stage: StageSize,
) -> Resize {
    // Negated comparison so NaN is rejected as well
    if !(raw_width >= MIN_ZONE_SIZE && raw_height >= MIN_ZONE_SIZE) {
        debug!(
            "[GEOMETRY] Resize to {:.1}x{:.1} below minimum, keeping {}",
            raw_width, raw_height, prior
        );
        return Resize::Rejected(*prior);
    }

    let candidate = Rect::new(proposed_x, proposed_y, raw_width, raw_height);
    if !candidate.fits_within(stage) {
        debug!(
            "[GEOMETRY] Resize to {:.1}x{:.1} exceeds stage {:.0}x{:.0}, keeping {}",
            raw_width,
            raw_height,
            stage.width(),
            stage.height(),
            prior
        );
        return Resize::Rejected(*prior);
    }

    let origin = apply_drag(&candidate, proposed_x, proposed_y, stage);
    Resize::Applied(candidate.moved_to(origin))
}

/// Scale a zone from edit-stage coordinates to thumbnail coordinates.
///
/// Display only; stored geometry is never touched.
pub fn scale_for_thumbnail(zone: &Rect, edit: StageSize, thumb: StageSize) -> Rect {
    let sx = thumb.width() / edit.width();
    let sy = thumb.height() / edit.height();
    Rect::new(
        zone.x * sx,
        zone.y * sy,
        zone.width * sx,
        zone.height * sy,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use test_case::test_case;

    fn stage() -> StageSize {
        StageSize::EDIT
    }

    #[test]
    fn test_drag_inside_is_unchanged() {
        let zone = Rect::new(0.0, 0.0, 300.0, 200.0);
        let p = apply_drag(&zone, 100.0, 50.0, stage());
        assert_eq!(p, Point { x: 100.0, y: 50.0 });
    }

    #[test_case(-15.0, -3.0 => (0.0, 0.0) ; "past top left")]
    #[test_case(1000.0, 1000.0 => (420.0, 180.0) ; "past bottom right")]
    #[test_case(500.0, -40.0 => (420.0, 0.0) ; "past top right")]
    #[test_case(-1.0, 150.0 => (0.0, 150.0) ; "past left edge only")]
    fn test_drag_clamps_every_edge(px: f64, py: f64) -> (f64, f64) {
        let zone = Rect::new(0.0, 0.0, 300.0, 200.0);
        let p = apply_drag(&zone, px, py, stage());
        (p.x, p.y)
    }

    #[test]
    fn test_drag_results_stay_in_bounds() {
        let zone = Rect::new(0.0, 0.0, 123.5, 77.25);
        for &(px, py) in &[(-500.0, 10.0), (700.0, 300.0), (300.3, -0.1), (596.5, 302.75)] {
            let moved = zone.moved_to(apply_drag(&zone, px, py, stage()));
            assert!(stage().contains(&moved), "{} escaped the stage", moved);
        }
    }

    #[test]
    fn test_resize_below_minimum_rejected() {
        let prior = Rect::new(10.0, 10.0, 100.0, 100.0);
        let result = apply_resize(&prior, 19.9, 100.0, 10.0, 10.0, stage());
        assert_eq!(result, Resize::Rejected(prior));

        let result = apply_resize(&prior, 100.0, 5.0, 10.0, 10.0, stage());
        assert_eq!(result.rect(), prior);
        assert!(!result.is_applied());
    }

    #[test]
    fn test_resize_exactly_minimum_applied() {
        let prior = Rect::new(10.0, 10.0, 100.0, 100.0);
        let result = apply_resize(&prior, MIN_ZONE_SIZE, MIN_ZONE_SIZE, 10.0, 10.0, stage());
        assert_eq!(result, Resize::Applied(Rect::new(10.0, 10.0, 20.0, 20.0)));
    }

    #[test]
    fn test_resize_nan_rejected() {
        let prior = Rect::new(0.0, 0.0, 50.0, 50.0);
        assert!(!apply_resize(&prior, f64::NAN, 50.0, 0.0, 0.0, stage()).is_applied());
    }

    #[test]
    fn test_resize_larger_than_stage_rejected() {
        let prior = Rect::new(0.0, 0.0, 50.0, 50.0);
        let result = apply_resize(&prior, 800.0, 100.0, 0.0, 0.0, stage());
        assert_eq!(result, Resize::Rejected(prior));
    }

    #[test]
    fn test_resize_clamps_position() {
        let prior = Rect::new(400.0, 100.0, 100.0, 100.0);
        let result = apply_resize(&prior, 400.0, 250.0, 400.0, 200.0, stage());
        assert_eq!(result, Resize::Applied(Rect::new(320.0, 130.0, 400.0, 250.0)));
        assert!(result.rect().is_legal(stage()));
    }

    #[test]
    fn test_thumbnail_scaling() {
        let zone = Rect::new(360.0, 190.0, 360.0, 190.0);
        let thumb = scale_for_thumbnail(&zone, StageSize::EDIT, StageSize::THUMBNAIL);
        assert_relative_eq!(thumb.x, 75.0);
        assert_relative_eq!(thumb.y, 40.0);
        assert_relative_eq!(thumb.width, 75.0);
        assert_relative_eq!(thumb.height, 40.0);
        // Source untouched
        assert_eq!(zone, Rect::new(360.0, 190.0, 360.0, 190.0));
    }
}
