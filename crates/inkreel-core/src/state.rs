//! Drawing state coordinator.
//!
//! [`DrawingState`] wires stroke capture, the stroke log, the snapshot
//! timeline and the replay engine to one [`RenderSurface`]. It is the only
//! type a UI layer needs to talk to.

use crate::capture::StrokeCapture;
use crate::error::DrawingResult;
use crate::history::{EntryId, EntrySummary, HistoryEntry, Timeline};
use crate::replay::{ReplayConfig, ReplayEngine, ReplayFlag, ReplayStatus, ReplayTick};
use crate::stroke::{Stroke, StrokeStyle, Tool};
use crate::stroke_log::StrokeLog;
use crate::surface::RenderSurface;
use kurbo::Point;
use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Coordinator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingConfig {
    pub replay: ReplayConfig,
    /// Maximum snapshots kept in the timeline. `None` keeps everything.
    pub history_limit: Option<usize>,
}

/// What a presentation layer needs to draw a history list and undo/redo buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryView {
    pub entries: Vec<EntrySummary>,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl HistoryView {
    pub fn current(&self) -> Option<EntryId> {
        self.entries.iter().find(|e| e.is_current).map(|e| e.id)
    }
}

type Observer = Box<dyn FnMut(&HistoryView)>;

/// Drawing history, stroke log and replay bound to a rendering surface.
pub struct DrawingState<S: RenderSurface> {
    surface: S,
    timeline: Timeline<S::Snapshot>,
    log: StrokeLog,
    capture: StrokeCapture,
    replay: ReplayEngine,
    style: StrokeStyle,
    /// Raster under a shape being dragged, restored before each preview.
    preview_base: Option<S::Snapshot>,
    observers: Vec<Observer>,
}

impl<S: RenderSurface> DrawingState<S> {
    /// Create a coordinator with default configuration.
    pub fn new(surface: S) -> Self {
        Self::with_config(surface, DrawingConfig::default())
    }

    /// Create a coordinator. The timeline is seeded with the surface's
    /// current (normally blank) raster as entry 1.
    pub fn with_config(surface: S, config: DrawingConfig) -> Self {
        let timeline = match config.history_limit {
            Some(limit) => Timeline::with_limit(limit),
            None => Timeline::new(),
        };
        let mut state = Self {
            surface,
            timeline,
            log: StrokeLog::new(),
            capture: StrokeCapture::new(),
            replay: ReplayEngine::new(config.replay),
            style: StrokeStyle::default(),
            preview_base: None,
            observers: Vec::new(),
        };
        state.save_state();
        state
    }

    // --- style -----------------------------------------------------------

    /// Style applied to the next completed stroke.
    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: StrokeStyle) {
        self.style = style;
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.style.tool = tool;
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.style.color = color.into();
    }

    pub fn set_width(&mut self, width: f64) {
        self.style.set_width(width);
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.style.set_opacity(opacity);
    }

    // --- gestures --------------------------------------------------------

    /// Pointer down. No snapshot is taken until the stroke ends.
    pub fn start_stroke(&mut self, point: Point) {
        self.capture.begin(point);
        self.preview_base = self
            .style
            .tool
            .is_shape()
            .then(|| self.surface.capture_snapshot());
    }

    /// Pointer move. Draws live feedback for the gesture.
    pub fn add_to_stroke(&mut self, point: Point) {
        let Some(previous) = self.capture.last_point() else {
            return;
        };
        self.capture.extend(point);

        match self.style.tool.shape_kind() {
            Some(kind) => {
                if let Some(base) = &self.preview_base {
                    self.surface.restore_snapshot(base);
                }
                if let Some(anchor) = self.capture.anchor() {
                    self.surface.render_shape(kind, anchor, point, &self.style);
                }
            }
            None => self.surface.render_segment(previous, point, &self.style),
        }
    }

    /// Pointer up. Records the stroke and snapshots the canvas.
    ///
    /// Returns the new history entry, or `None` for a gesture that never
    /// moved (or when no gesture was in progress).
    pub fn end_stroke(&mut self) -> Option<EntryId> {
        self.preview_base = None;
        let stroke = self.capture.finish(&self.style)?;
        log::debug!(
            "Stroke recorded: {} with {} points",
            stroke.tool().name(),
            stroke.len()
        );
        self.log.push(stroke);
        Some(self.save_state())
    }

    /// Abandon the gesture in progress, restoring any shape preview.
    pub fn cancel_stroke(&mut self) {
        if let Some(base) = self.preview_base.take() {
            self.surface.restore_snapshot(&base);
        }
        self.capture.cancel();
    }

    pub fn is_drawing(&self) -> bool {
        self.capture.is_capturing()
    }

    // --- history ---------------------------------------------------------

    fn save_state(&mut self) -> EntryId {
        let snapshot = self.surface.capture_snapshot();
        let id = self.timeline.append(snapshot).id();
        self.notify();
        id
    }

    /// Step back one state. `None` at the first state.
    pub fn undo(&mut self) -> Option<EntryId> {
        let id = self.timeline.undo().map(HistoryEntry::id);
        self.restore(id, "Undo")
    }

    /// Step forward one state. `None` at the latest state.
    pub fn redo(&mut self) -> Option<EntryId> {
        let id = self.timeline.redo().map(HistoryEntry::id);
        self.restore(id, "Redo")
    }

    /// Jump to any state still in the timeline. `None` for unknown ids.
    pub fn jump_to_state(&mut self, id: EntryId) -> Option<EntryId> {
        let id = self.timeline.jump_to(id).map(HistoryEntry::id);
        self.restore(id, "Jump")
    }

    fn restore(&mut self, id: Option<EntryId>, action: &str) -> Option<EntryId> {
        let entry = self.timeline.get(id?)?;
        self.surface.restore_snapshot(entry.snapshot());
        log::debug!("{} -> state {}", action, entry.id());
        self.notify();
        id
    }

    /// Reset canvas, history and stroke log to a single blank state.
    ///
    /// A running replay is cancelled and an unfinished gesture dropped.
    pub fn clear(&mut self) {
        self.replay.cancel();
        self.capture.cancel();
        self.preview_base = None;
        self.surface.clear_surface();
        self.timeline.clear();
        self.log.clear();
        log::info!("Canvas cleared");
        self.save_state();
    }

    pub fn can_undo(&self) -> bool {
        self.timeline.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.timeline.can_redo()
    }

    pub fn current_entry(&self) -> Option<EntryId> {
        self.timeline.current_id()
    }

    pub fn timeline(&self) -> &Timeline<S::Snapshot> {
        &self.timeline
    }

    /// Tagged history list plus undo/redo availability.
    pub fn history(&self) -> HistoryView {
        HistoryView {
            entries: self.timeline.entries(),
            can_undo: self.timeline.can_undo(),
            can_redo: self.timeline.can_redo(),
        }
    }

    /// Register a callback run after every change to the history.
    pub fn subscribe(&mut self, observer: impl FnMut(&HistoryView) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let view = self.history();
        for observer in &mut self.observers {
            observer(&view);
        }
    }

    // --- strokes & replay ------------------------------------------------

    /// Every completed stroke, in drawing order.
    pub fn strokes(&self) -> &[Stroke] {
        self.log.strokes()
    }

    pub fn stroke_log(&self) -> &StrokeLog {
        &self.log
    }

    /// Start replaying the stroke log from a blank surface.
    ///
    /// `Ok(false)` when the log is empty; [`DrawingError::ReplayBusy`] when a
    /// replay is already running. Drive it with [`poll_replay`](Self::poll_replay)
    /// or [`step_replay`](Self::step_replay).
    ///
    /// [`DrawingError::ReplayBusy`]: crate::error::DrawingError::ReplayBusy
    pub fn replay_strokes(&mut self) -> DrawingResult<bool> {
        self.replay.start(self.log.strokes(), &mut self.surface)
    }

    /// Run the replay steps due at `now`.
    pub fn poll_replay(&mut self, now: Instant) -> ReplayStatus {
        self.replay.poll(now, &mut self.surface)
    }

    /// Run exactly one replay step, ignoring its delay.
    pub fn step_replay(&mut self) -> ReplayTick {
        self.replay.step(&mut self.surface)
    }

    pub fn cancel_replay(&mut self) {
        self.replay.cancel();
    }

    pub fn is_replaying(&self) -> bool {
        self.replay.is_replaying()
    }

    /// Handle that can cancel the replay without borrowing the coordinator.
    pub fn replay_flag(&self) -> ReplayFlag {
        self.replay.flag()
    }

    pub fn replay(&self) -> &ReplayEngine {
        &self.replay
    }

    // --- surface ---------------------------------------------------------

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Direct access to the surface. Drawing here bypasses the history.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}

impl<S: RenderSurface + Default> Default for DrawingState<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}
