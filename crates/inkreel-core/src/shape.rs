//! Shape geometry derived from a drag gesture.

use kurbo::{BezPath, Circle, Point, Rect, Shape as _};
use serde::{Deserialize, Serialize};

/// Tolerance used when converting curved outlines to paths.
pub const PATH_TOLERANCE: f64 = 0.1;

/// Shapes drawn from an anchor point and a drag end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Axis-aligned rectangle spanned by anchor and drag end.
    Rectangle,
    /// Circle centred on the anchor, passing through the drag end.
    Circle,
    /// Isosceles triangle with its apex on the anchor's row and its base on the drag end's row.
    Triangle,
}

impl ShapeKind {
    /// Outline of the shape as a closed path.
    pub fn outline(self, anchor: Point, drag_end: Point) -> BezPath {
        match self {
            ShapeKind::Rectangle => Rect::from_points(anchor, drag_end).to_path(PATH_TOLERANCE),
            ShapeKind::Circle => Circle::new(anchor, anchor.distance(drag_end)).to_path(PATH_TOLERANCE),
            ShapeKind::Triangle => {
                let [a, b, c] = triangle_vertices(anchor, drag_end);
                let mut path = BezPath::new();
                path.move_to(a);
                path.line_to(b);
                path.line_to(c);
                path.close_path();
                path
            }
        }
    }
}

/// Base-left, apex, base-right.
fn triangle_vertices(anchor: Point, drag_end: Point) -> [Point; 3] {
    let width = drag_end.x - anchor.x;
    [
        Point::new(anchor.x, drag_end.y),
        Point::new(anchor.x + width / 2.0, anchor.y),
        Point::new(drag_end.x, drag_end.y),
    ]
}
