//! WebAssembly entry point and HTML canvas surface.

use crate::config::AppConfig;
use inkreel_core::{
    DrawingState, EntryId, RenderSurface, ReplayStatus, Session, ShapeKind, StrokeStyle, Tool,
};
use kurbo::{PathEl, Point};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};
use web_time::Instant;

/// [`RenderSurface`] backed by a 2D canvas context.
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    width: u32,
    height: u32,
}

impl CanvasSurface {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            ctx,
            width: canvas.width(),
            height: canvas.height(),
        })
    }

    fn apply_style(&self, style: &StrokeStyle) {
        let composite = if style.tool == Tool::Eraser {
            "destination-out"
        } else {
            "source-over"
        };
        if let Err(e) = self.ctx.set_global_composite_operation(composite) {
            log::warn!("Failed to set composite operation: {:?}", e);
        }
        self.ctx.set_stroke_style_str(&style.color);
        self.ctx.set_line_width(style.width);
        self.ctx.set_global_alpha(style.opacity);
        self.ctx.set_line_cap("round");
        self.ctx.set_line_join("round");
    }

    fn reset_style(&self) {
        self.ctx.set_global_alpha(1.0);
        if let Err(e) = self.ctx.set_global_composite_operation("source-over") {
            log::warn!("Failed to reset composite operation: {:?}", e);
        }
    }
}

impl RenderSurface for CanvasSurface {
    /// `None` when the canvas could not be read back.
    type Snapshot = Option<ImageData>;

    fn capture_snapshot(&self) -> Self::Snapshot {
        match self
            .ctx
            .get_image_data(0.0, 0.0, f64::from(self.width), f64::from(self.height))
        {
            Ok(data) => Some(data),
            Err(e) => {
                log::error!("Failed to capture canvas: {:?}", e);
                None
            }
        }
    }

    fn restore_snapshot(&mut self, snapshot: &Self::Snapshot) {
        let Some(data) = snapshot else {
            return;
        };
        if let Err(e) = self.ctx.put_image_data(data, 0.0, 0.0) {
            log::error!("Failed to restore canvas: {:?}", e);
        }
    }

    fn clear_surface(&mut self) {
        self.ctx
            .clear_rect(0.0, 0.0, f64::from(self.width), f64::from(self.height));
    }

    fn render_segment(&mut self, from: Point, to: Point, style: &StrokeStyle) {
        self.apply_style(style);
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
        self.reset_style();
    }

    fn render_shape(&mut self, kind: ShapeKind, anchor: Point, drag_end: Point, style: &StrokeStyle) {
        self.apply_style(style);
        self.ctx.begin_path();
        for el in kind.outline(anchor, drag_end).elements() {
            match *el {
                PathEl::MoveTo(p) => self.ctx.move_to(p.x, p.y),
                PathEl::LineTo(p) => self.ctx.line_to(p.x, p.y),
                PathEl::QuadTo(c, p) => self.ctx.quadratic_curve_to(c.x, c.y, p.x, p.y),
                PathEl::CurveTo(c1, c2, p) => {
                    self.ctx.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y)
                }
                PathEl::ClosePath => self.ctx.close_path(),
            }
        }
        self.ctx.stroke();
        self.reset_style();
    }
}

/// Drawing session bound to a `<canvas>` element, exported to JavaScript.
#[wasm_bindgen]
pub struct WebDrawing {
    state: DrawingState<CanvasSurface>,
    width: u32,
    height: u32,
}

#[wasm_bindgen]
impl WebDrawing {
    /// Attach to the canvas with the given element id.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<WebDrawing, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element #{canvas_id}")))?
            .dyn_into::<HtmlCanvasElement>()?;

        let surface = CanvasSurface::new(&canvas)?;
        let (width, height) = (surface.width, surface.height);
        let config = AppConfig::default();
        log::info!("Attached to canvas #{} ({}x{})", canvas_id, width, height);
        Ok(Self {
            state: DrawingState::with_config(surface, config.drawing_config()),
            width,
            height,
        })
    }

    pub fn start_stroke(&mut self, x: f64, y: f64) {
        self.state.start_stroke(Point::new(x, y));
    }

    pub fn add_to_stroke(&mut self, x: f64, y: f64) {
        self.state.add_to_stroke(Point::new(x, y));
    }

    /// Returns whether a stroke was recorded.
    pub fn end_stroke(&mut self) -> bool {
        self.state.end_stroke().is_some()
    }

    pub fn set_tool(&mut self, name: &str) -> Result<(), JsValue> {
        let tool =
            Tool::from_name(name).ok_or_else(|| JsValue::from_str(&format!("unknown tool {name}")))?;
        self.state.set_tool(tool);
        Ok(())
    }

    pub fn set_color(&mut self, color: &str) {
        self.state.set_color(color);
    }

    pub fn set_width(&mut self, width: f64) {
        self.state.set_width(width);
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.state.set_opacity(opacity);
    }

    pub fn undo(&mut self) -> bool {
        self.state.undo().is_some()
    }

    pub fn redo(&mut self) -> bool {
        self.state.redo().is_some()
    }

    pub fn jump_to_state(&mut self, id: u32) -> bool {
        self.state.jump_to_state(EntryId(u64::from(id))).is_some()
    }

    pub fn clear(&mut self) {
        self.state.clear();
    }

    pub fn can_undo(&self) -> bool {
        self.state.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state.can_redo()
    }

    /// History list as JSON (`{entries, can_undo, can_redo}`).
    pub fn history_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state.history()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Call `callback(historyJson)` after every history change.
    pub fn on_history_change(&mut self, callback: js_sys::Function) {
        self.state.subscribe(move |view| {
            let json = match serde_json::to_string(view) {
                Ok(json) => json,
                Err(e) => {
                    log::error!("Failed to serialize history: {}", e);
                    return;
                }
            };
            if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                log::error!("History callback failed: {:?}", e);
            }
        });
    }

    /// Recorded strokes as a session document.
    pub fn session_json(&self) -> Result<String, JsValue> {
        Session::from_state(&self.state, self.width, self.height)
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Recorded strokes as a bare JSON array.
    pub fn strokes_json(&self) -> Result<String, JsValue> {
        self.state
            .stroke_log()
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Start replaying. `false` when there is nothing to replay.
    pub fn replay(&mut self) -> Result<bool, JsValue> {
        self.state
            .replay_strokes()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn cancel_replay(&mut self) {
        self.state.cancel_replay();
    }

    pub fn is_replaying(&self) -> bool {
        self.state.is_replaying()
    }

    /// Advance the replay. Call from `requestAnimationFrame`; returns whether
    /// more frames are needed.
    pub fn tick(&mut self) -> bool {
        matches!(
            self.state.poll_replay(Instant::now()),
            ReplayStatus::Waiting { .. }
        )
    }
}

/// Initialize logging for the WASM build.
#[wasm_bindgen(start)]
pub fn run_wasm() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::error_1(&JsValue::from_str(&e.to_string()));
    }

    log::info!("Starting InkReel (WASM)");
}
