//! Software rendering surface backed by a tiny-skia pixmap.
//!
//! Segments and shape outlines are stroked with round caps and joins,
//! anti-aliased. Eraser strokes use destination-out, so they remove
//! coverage instead of painting a colour.

use crate::color::parse_color;
use crate::error::{RenderError, RenderResult};
use inkreel_core::{RenderSurface, ShapeKind, StrokeStyle, Tool};
use kurbo::{BezPath, PathEl, Point};
use peniko::Color;
use std::sync::Arc;
use tiny_skia::{
    BlendMode, FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, PixmapPaint,
    Transform,
};

/// Largest accepted width or height.
pub const MAX_DIMENSION: u32 = 16_384;
/// Largest accepted pixel count (256 MiB of RGBA).
pub const MAX_PIXELS: u64 = 64 * 1024 * 1024;

/// Immutable copy of a raster's (premultiplied) pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterSnapshot(Arc<[u8]>);

impl RasterSnapshot {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// An in-memory raster implementing [`RenderSurface`].
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixmap: Pixmap,
}

impl RasterSurface {
    /// Allocate a fully transparent raster.
    ///
    /// Zero or oversized dimensions are rejected before anything is
    /// allocated.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        let invalid = RenderError::InvalidSize { width, height };
        if width == 0
            || height == 0
            || width > MAX_DIMENSION
            || height > MAX_DIMENSION
            || u64::from(width) * u64::from(height) > MAX_PIXELS
        {
            return Err(invalid);
        }
        let pixmap = Pixmap::new(width, height).ok_or(invalid)?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Raw premultiplied RGBA8 bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Straight-alpha RGBA at `(x, y)`, or `None` outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Encode the raster as PNG, optionally composited over an opaque
    /// background colour.
    pub fn to_png(&self, background: Option<Color>) -> RenderResult<Vec<u8>> {
        let png_data = match background {
            Some(color) => {
                let bg = color.to_rgba8();
                let mut flat = self.pixmap.clone();
                flat.fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, 255));
                flat.draw_pixmap(
                    0,
                    0,
                    self.pixmap.as_ref(),
                    &PixmapPaint::default(),
                    Transform::identity(),
                    None,
                );
                flat.encode_png()?
            }
            None => self.pixmap.encode_png()?,
        };

        log::debug!(
            "Encoded {}x{} PNG ({} bytes)",
            self.width(),
            self.height(),
            png_data.len()
        );
        Ok(png_data)
    }

    fn stroke(&mut self, path: &Path, style: &StrokeStyle) {
        let stroke = tiny_skia::Stroke {
            width: style.width as f32,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..tiny_skia::Stroke::default()
        };
        self.pixmap
            .stroke_path(path, &paint_for(style), &stroke, Transform::identity(), None);
    }
}

fn paint_for(style: &StrokeStyle) -> Paint<'static> {
    let opacity = style.opacity.clamp(0.0, 1.0);
    let mut paint = Paint::default();
    paint.anti_alias = true;
    if style.tool == Tool::Eraser {
        paint.set_color_rgba8(0, 0, 0, to_alpha(255, opacity));
        paint.blend_mode = BlendMode::DestinationOut;
    } else {
        let c = parse_color(&style.color).to_rgba8();
        paint.set_color_rgba8(c.r, c.g, c.b, to_alpha(c.a, opacity));
    }
    paint
}

fn to_alpha(alpha: u8, opacity: f64) -> u8 {
    (f64::from(alpha) * opacity).round().clamp(0.0, 255.0) as u8
}

fn to_skia_path(path: &BezPath) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

impl RenderSurface for RasterSurface {
    type Snapshot = RasterSnapshot;

    fn capture_snapshot(&self) -> RasterSnapshot {
        RasterSnapshot(Arc::from(self.pixmap.data()))
    }

    fn restore_snapshot(&mut self, snapshot: &RasterSnapshot) {
        let data = self.pixmap.data_mut();
        if snapshot.0.len() != data.len() {
            log::warn!(
                "Ignoring snapshot of {} bytes for a {}-byte surface",
                snapshot.0.len(),
                data.len()
            );
            return;
        }
        data.copy_from_slice(&snapshot.0);
    }

    fn clear_surface(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    fn render_segment(&mut self, from: Point, to: Point, style: &StrokeStyle) {
        // A zero-length segment is a dot, the way a round cap draws it.
        if from.distance(to) < f64::EPSILON {
            let radius = (style.width / 2.0) as f32;
            if let Some(dot) = PathBuilder::from_circle(from.x as f32, from.y as f32, radius) {
                self.pixmap.fill_path(
                    &dot,
                    &paint_for(style),
                    FillRule::Winding,
                    Transform::identity(),
                    None,
                );
            }
            return;
        }

        let mut pb = PathBuilder::new();
        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);
        if let Some(path) = pb.finish() {
            self.stroke(&path, style);
        }
    }

    fn render_shape(&mut self, kind: ShapeKind, anchor: Point, drag_end: Point, style: &StrokeStyle) {
        match to_skia_path(&kind.outline(anchor, drag_end)) {
            Some(path) => self.stroke(&path, style),
            None => log::debug!("Skipping degenerate {:?} outline", kind),
        }
    }
}
