//! Stroke records and drawing styles.

use crate::shape::ShapeKind;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Thinnest stroke the style accepts.
pub const MIN_STROKE_WIDTH: f64 = 1.0;

/// Available drawing tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Brush,
    Eraser,
    Rectangle,
    Circle,
    Triangle,
}

impl Tool {
    /// All tools, in toolbar order.
    pub const ALL: [Tool; 5] = [
        Tool::Brush,
        Tool::Eraser,
        Tool::Rectangle,
        Tool::Circle,
        Tool::Triangle,
    ];

    /// Whether this tool produces a single shape from anchor and drag end.
    pub fn is_shape(self) -> bool {
        self.shape_kind().is_some()
    }

    /// The shape drawn by this tool, if any.
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            Tool::Rectangle => Some(ShapeKind::Rectangle),
            Tool::Circle => Some(ShapeKind::Circle),
            Tool::Triangle => Some(ShapeKind::Triangle),
            Tool::Brush | Tool::Eraser => None,
        }
    }

    /// Look a tool up by its [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Tool> {
        Tool::ALL.into_iter().find(|tool| tool.name() == name)
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Tool::Brush => "brush",
            Tool::Eraser => "eraser",
            Tool::Rectangle => "rectangle",
            Tool::Circle => "circle",
            Tool::Triangle => "triangle",
        }
    }
}

/// Style attributes applied to a stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    /// CSS hex color (`#rgb`, `#rrggbb` or `#rrggbbaa`).
    pub color: String,
    /// Line width in device pixels.
    pub width: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Tool the stroke was drawn with.
    pub tool: Tool,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            width: 5.0,
            opacity: 1.0,
            tool: Tool::Brush,
        }
    }
}

impl StrokeStyle {
    /// Create a style, clamping width and opacity into range.
    pub fn new(color: impl Into<String>, width: f64, opacity: f64, tool: Tool) -> Self {
        Self {
            color: color.into(),
            width: clamp_width(width),
            opacity: clamp_opacity(opacity),
            tool,
        }
    }

    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.tool = tool;
        self
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = clamp_width(width);
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = clamp_opacity(opacity);
    }
}

fn clamp_width(width: f64) -> f64 {
    if width.is_finite() {
        width.max(MIN_STROKE_WIDTH)
    } else {
        MIN_STROKE_WIDTH
    }
}

fn clamp_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() {
        1.0
    } else {
        opacity.clamp(0.0, 1.0)
    }
}

/// A completed stroke: geometry plus the style it was drawn with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Points in the order they were captured.
    pub points: Vec<Point>,
    #[serde(flatten)]
    pub style: StrokeStyle,
}

impl Stroke {
    pub fn new(points: Vec<Point>, style: StrokeStyle) -> Self {
        Self { points, style }
    }

    pub fn tool(&self) -> Tool {
        self.style.tool
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Anchor and drag end, the only points a shape stroke uses.
    pub fn shape_handles(&self) -> Option<(Point, Point)> {
        let first = *self.points.first()?;
        let last = *self.points.last()?;
        Some((first, last))
    }
}
