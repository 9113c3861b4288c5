//! Rendering surface contract.
//!
//! The core never touches pixels. Everything it draws, captures or restores
//! goes through a [`RenderSurface`], so the same history and replay logic runs
//! against a software raster, an HTML canvas, or the in-memory
//! [`RecordingSurface`].

use crate::shape::ShapeKind;
use crate::stroke::StrokeStyle;
use kurbo::Point;

/// A 2D raster that can draw stroke primitives and snapshot itself.
pub trait RenderSurface {
    /// Full-frame capture. Must be an independent copy: later drawing on the
    /// surface may not alter a snapshot already handed out.
    type Snapshot: Clone;

    /// Capture the entire current raster.
    fn capture_snapshot(&self) -> Self::Snapshot;

    /// Replace the entire raster with a previous capture.
    fn restore_snapshot(&mut self, snapshot: &Self::Snapshot);

    /// Blank the raster.
    fn clear_surface(&mut self);

    /// Draw one line segment of a freehand stroke.
    fn render_segment(&mut self, from: Point, to: Point, style: &StrokeStyle);

    /// Draw a complete shape outline.
    fn render_shape(&mut self, kind: ShapeKind, anchor: Point, drag_end: Point, style: &StrokeStyle);
}

/// A primitive drawn onto a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Segment {
        from: Point,
        to: Point,
        style: StrokeStyle,
    },
    Shape {
        kind: ShapeKind,
        anchor: Point,
        drag_end: Point,
        style: StrokeStyle,
    },
}

/// In-memory surface whose "raster" is the list of primitives drawn since
/// the last clear or restore.
///
/// Useful for tests and headless consumers that only need to know what
/// would be drawn.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    visible: Vec<DrawOp>,
    segments_drawn: usize,
    shapes_drawn: usize,
    clears: usize,
    restores: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Primitives currently making up the raster.
    pub fn visible(&self) -> &[DrawOp] {
        &self.visible
    }

    /// Total segments drawn over the surface's lifetime.
    pub fn segments_drawn(&self) -> usize {
        self.segments_drawn
    }

    /// Total shapes drawn over the surface's lifetime.
    pub fn shapes_drawn(&self) -> usize {
        self.shapes_drawn
    }

    pub fn clears(&self) -> usize {
        self.clears
    }

    pub fn restores(&self) -> usize {
        self.restores
    }

    /// Reset the lifetime counters, keeping the raster.
    pub fn reset_counters(&mut self) {
        self.segments_drawn = 0;
        self.shapes_drawn = 0;
        self.clears = 0;
        self.restores = 0;
    }
}

impl RenderSurface for RecordingSurface {
    type Snapshot = Vec<DrawOp>;

    fn capture_snapshot(&self) -> Self::Snapshot {
        self.visible.clone()
    }

    fn restore_snapshot(&mut self, snapshot: &Self::Snapshot) {
        self.visible = snapshot.clone();
        self.restores += 1;
    }

    fn clear_surface(&mut self) {
        self.visible.clear();
        self.clears += 1;
    }

    fn render_segment(&mut self, from: Point, to: Point, style: &StrokeStyle) {
        self.visible.push(DrawOp::Segment {
            from,
            to,
            style: style.clone(),
        });
        self.segments_drawn += 1;
    }

    fn render_shape(&mut self, kind: ShapeKind, anchor: Point, drag_end: Point, style: &StrokeStyle) {
        self.visible.push(DrawOp::Shape {
            kind,
            anchor,
            drag_end,
            style: style.clone(),
        });
        self.shapes_drawn += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_is_independent() {
        let mut surface = RecordingSurface::new();
        let style = StrokeStyle::default();
        surface.render_segment(Point::ZERO, Point::new(1.0, 1.0), &style);

        let snapshot = surface.capture_snapshot();
        surface.render_shape(ShapeKind::Circle, Point::ZERO, Point::new(3.0, 4.0), &style);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(surface.visible().len(), 2);

        surface.restore_snapshot(&snapshot);
        assert_eq!(surface.visible().len(), 1);
        assert_eq!(surface.restores(), 1);
    }

    #[test]
    fn test_clear() {
        let mut surface = RecordingSurface::new();
        surface.render_segment(Point::ZERO, Point::new(1.0, 0.0), &StrokeStyle::default());
        surface.clear_surface();
        assert!(surface.visible().is_empty());
        assert_eq!(surface.segments_drawn(), 1);
        assert_eq!(surface.clears(), 1);
    }
}
