//! Time-paced replay of the stroke log.
//!
//! Replay is an explicit state machine (`Idle -> Running -> Completed |
//! Cancelled`). Each [`ReplayEngine::step`] performs one render action and
//! reports how long to wait before the next one; [`ReplayEngine::poll`] runs
//! the steps whose deadline has passed. The host owns the clock, so other
//! drawing operations may run between steps.
//!
//! Cancellation is cooperative: [`ReplayFlag::cancel`] clears a shared flag
//! that the next step observes. A pending delay is never cut short.

use crate::error::{DrawingError, DrawingResult};
use crate::stroke::Stroke;
use crate::surface::RenderSurface;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

// Use web-time on WASM, std::time otherwise
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Default pause between segments of a freehand stroke.
pub const DEFAULT_SEGMENT_DELAY_MS: u64 = 10;
/// Default pause after each stroke.
pub const DEFAULT_STROKE_DELAY_MS: u64 = 100;

/// Replay pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Pause between consecutive segments of a brush or eraser stroke.
    pub segment_delay_ms: u64,
    /// Pause after a stroke before the next one starts.
    pub stroke_delay_ms: u64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            segment_delay_ms: DEFAULT_SEGMENT_DELAY_MS,
            stroke_delay_ms: DEFAULT_STROKE_DELAY_MS,
        }
    }
}

impl ReplayConfig {
    /// No pauses at all; a single poll renders the whole log.
    pub fn instant() -> Self {
        Self {
            segment_delay_ms: 0,
            stroke_delay_ms: 0,
        }
    }

    pub fn segment_delay(&self) -> Duration {
        Duration::from_millis(self.segment_delay_ms)
    }

    pub fn stroke_delay(&self) -> Duration {
        Duration::from_millis(self.stroke_delay_ms)
    }
}

/// Shared "replaying" flag. Clones observe and control the same replay.
#[derive(Debug, Clone, Default)]
pub struct ReplayFlag(Arc<AtomicBool>);

impl ReplayFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Ask the running replay to stop at its next step.
    pub fn cancel(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Lifecycle of the replay state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplayState {
    /// Never started.
    #[default]
    Idle,
    /// Steps remain.
    Running,
    /// Every stroke was rendered.
    Completed,
    /// Stopped early by a cancel.
    Cancelled,
}

/// Result of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayTick {
    /// Something was drawn; wait this long before the next step.
    Wait(Duration),
    /// The log is exhausted.
    Finished,
    /// The flag was cleared; nothing more will be drawn.
    Cancelled,
    /// No replay is running.
    Idle,
}

/// Result of polling the engine against a clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayStatus {
    Idle,
    /// Running; the next step is due at `until`.
    Waiting { until: Instant },
    Completed,
    Cancelled,
}

/// Replays strokes in recorded order onto a [`RenderSurface`].
#[derive(Debug, Default)]
pub struct ReplayEngine {
    config: ReplayConfig,
    flag: ReplayFlag,
    state: ReplayState,
    /// Copy of the log taken at start; replay never reads the live log.
    strokes: Vec<Stroke>,
    stroke_index: usize,
    /// Index of the end point of the next segment to draw.
    point_index: usize,
    next_due: Option<Instant>,
}

impl ReplayEngine {
    pub fn new(config: ReplayConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ReplayConfig) {
        self.config = config;
    }

    pub fn state(&self) -> ReplayState {
        self.state
    }

    /// Whether a replay is in progress and has not been cancelled.
    pub fn is_replaying(&self) -> bool {
        self.flag.is_set()
    }

    /// A handle that can cancel the replay from elsewhere.
    pub fn flag(&self) -> ReplayFlag {
        self.flag.clone()
    }

    /// Strokes finished so far and total strokes in this replay.
    pub fn progress(&self) -> (usize, usize) {
        (self.stroke_index.min(self.strokes.len()), self.strokes.len())
    }

    /// Begin replaying `strokes`.
    ///
    /// Returns `Ok(false)` without touching anything when there is nothing to
    /// replay, and [`DrawingError::ReplayBusy`] when a replay is already
    /// running. Otherwise the surface is cleared and the engine starts.
    pub fn start<S: RenderSurface>(&mut self, strokes: &[Stroke], surface: &mut S) -> DrawingResult<bool> {
        if self.is_replaying() {
            log::warn!("Replay requested while another replay is running");
            return Err(DrawingError::ReplayBusy);
        }
        if strokes.is_empty() {
            log::debug!("Replay: stroke log is empty, nothing to do");
            return Ok(false);
        }

        self.strokes = strokes.to_vec();
        self.stroke_index = 0;
        self.point_index = 1;
        self.next_due = None;
        self.state = ReplayState::Running;
        self.flag.set();
        surface.clear_surface();

        log::info!("Replay started: {} stroke(s)", self.strokes.len());
        Ok(true)
    }

    /// Request cancellation. Takes effect at the next step.
    pub fn cancel(&self) {
        if self.is_replaying() {
            log::info!("Replay cancel requested");
        }
        self.flag.cancel();
    }

    /// Perform one render action.
    pub fn step<S: RenderSurface>(&mut self, surface: &mut S) -> ReplayTick {
        if self.state != ReplayState::Running {
            return ReplayTick::Idle;
        }
        if !self.flag.is_set() {
            self.finish(ReplayState::Cancelled);
            return ReplayTick::Cancelled;
        }
        let Some(stroke) = self.strokes.get(self.stroke_index) else {
            self.finish(ReplayState::Completed);
            return ReplayTick::Finished;
        };

        if self.point_index == 1 {
            log::debug!(
                "Replay: stroke {}/{} ({}, {} points)",
                self.stroke_index + 1,
                self.strokes.len(),
                stroke.tool().name(),
                stroke.len()
            );
        }

        if let Some(kind) = stroke.tool().shape_kind() {
            if let Some((anchor, drag_end)) = stroke.shape_handles() {
                surface.render_shape(kind, anchor, drag_end, &stroke.style);
            }
            self.stroke_index += 1;
            self.point_index = 1;
            return ReplayTick::Wait(self.config.stroke_delay());
        }

        let len = stroke.points.len();
        if self.point_index < len {
            let from = stroke.points[self.point_index - 1];
            let to = stroke.points[self.point_index];
            surface.render_segment(from, to, &stroke.style);
            self.point_index += 1;
            if self.point_index < len {
                return ReplayTick::Wait(self.config.segment_delay());
            }
        }

        self.stroke_index += 1;
        self.point_index = 1;
        ReplayTick::Wait(self.config.stroke_delay())
    }

    /// Run every step that is due at `now`.
    ///
    /// The first poll after [`start`](Self::start) steps immediately; each
    /// later step is due one returned delay after the previous one's due time.
    pub fn poll<S: RenderSurface>(&mut self, now: Instant, surface: &mut S) -> ReplayStatus {
        loop {
            match self.state {
                ReplayState::Running => {}
                ReplayState::Idle => return ReplayStatus::Idle,
                ReplayState::Completed => return ReplayStatus::Completed,
                ReplayState::Cancelled => return ReplayStatus::Cancelled,
            }

            let due = *self.next_due.get_or_insert(now);
            if due > now {
                return ReplayStatus::Waiting { until: due };
            }

            match self.step(surface) {
                ReplayTick::Wait(delay) => self.next_due = Some(due + delay),
                ReplayTick::Finished => return ReplayStatus::Completed,
                ReplayTick::Cancelled => return ReplayStatus::Cancelled,
                ReplayTick::Idle => return ReplayStatus::Idle,
            }
        }
    }

    fn finish(&mut self, state: ReplayState) {
        match state {
            ReplayState::Completed => log::info!("Replay completed"),
            _ => log::info!(
                "Replay cancelled after {}/{} stroke(s)",
                self.stroke_index,
                self.strokes.len()
            ),
        }
        self.state = state;
        self.flag.cancel();
        self.next_due = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::{StrokeStyle, Tool};
    use crate::surface::{DrawOp, RecordingSurface};
    use kurbo::Point;

    fn brush(n: usize) -> Stroke {
        let points = (0..n).map(|i| Point::new(i as f64 * 10.0, 0.0)).collect();
        Stroke::new(points, StrokeStyle::default())
    }

    fn shape(tool: Tool) -> Stroke {
        Stroke::new(
            vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0), Point::new(20.0, 10.0)],
            StrokeStyle::default().with_tool(tool),
        )
    }

    fn run_to_end(engine: &mut ReplayEngine, surface: &mut RecordingSurface) -> Vec<ReplayTick> {
        let mut ticks = Vec::new();
        loop {
            let tick = engine.step(surface);
            ticks.push(tick);
            if !matches!(tick, ReplayTick::Wait(_)) {
                return ticks;
            }
        }
    }

    #[test]
    fn test_brush_stroke_renders_one_segment_per_step() {
        let mut engine = ReplayEngine::new(ReplayConfig::default());
        let mut surface = RecordingSurface::new();
        let strokes = vec![brush(5)];

        assert_eq!(engine.start(&strokes, &mut surface), Ok(true));
        assert!(engine.is_replaying());
        assert_eq!(surface.clears(), 1);

        let ticks = run_to_end(&mut engine, &mut surface);
        assert_eq!(surface.segments_drawn(), 4);
        assert_eq!(
            ticks,
            vec![
                ReplayTick::Wait(Duration::from_millis(10)),
                ReplayTick::Wait(Duration::from_millis(10)),
                ReplayTick::Wait(Duration::from_millis(10)),
                ReplayTick::Wait(Duration::from_millis(100)),
                ReplayTick::Finished,
            ]
        );
        match &surface.visible()[3] {
            DrawOp::Segment { from, to, .. } => {
                assert_eq!(*from, Point::new(30.0, 0.0));
                assert_eq!(*to, Point::new(40.0, 0.0));
            }
            op => panic!("unexpected op {op:?}"),
        }
        assert!(!engine.is_replaying());
        assert_eq!(engine.state(), ReplayState::Completed);
    }

    #[test]
    fn test_shape_renders_once_from_handles() {
        let mut engine = ReplayEngine::new(ReplayConfig::default());
        let mut surface = RecordingSurface::new();
        engine.start(&[shape(Tool::Triangle)], &mut surface).unwrap();

        let ticks = run_to_end(&mut engine, &mut surface);
        assert_eq!(ticks.len(), 2);
        assert_eq!(surface.shapes_drawn(), 1);
        assert_eq!(surface.segments_drawn(), 0);
        assert_eq!(
            surface.visible()[0],
            DrawOp::Shape {
                kind: crate::shape::ShapeKind::Triangle,
                anchor: Point::new(0.0, 0.0),
                drag_end: Point::new(20.0, 10.0),
                style: StrokeStyle::default().with_tool(Tool::Triangle),
            }
        );
    }

    #[test]
    fn test_empty_log_is_noop() {
        let mut engine = ReplayEngine::new(ReplayConfig::default());
        let mut surface = RecordingSurface::new();
        assert_eq!(engine.start(&[], &mut surface), Ok(false));
        assert!(!engine.is_replaying());
        assert_eq!(engine.state(), ReplayState::Idle);
        assert_eq!(surface.clears(), 0);
        assert_eq!(engine.step(&mut surface), ReplayTick::Idle);
    }

    #[test]
    fn test_start_while_running_is_busy() {
        let mut engine = ReplayEngine::new(ReplayConfig::default());
        let mut surface = RecordingSurface::new();
        engine.start(&[brush(3)], &mut surface).unwrap();
        assert_eq!(engine.start(&[brush(3)], &mut surface), Err(DrawingError::ReplayBusy));
        assert_eq!(surface.clears(), 1);
    }

    #[test]
    fn test_cancel_stops_at_next_step() {
        let mut engine = ReplayEngine::new(ReplayConfig::default());
        let mut surface = RecordingSurface::new();
        engine.start(&[brush(10), brush(10)], &mut surface).unwrap();

        engine.step(&mut surface);
        engine.step(&mut surface);
        engine.flag().cancel();
        assert!(!engine.is_replaying());

        assert_eq!(engine.step(&mut surface), ReplayTick::Cancelled);
        assert_eq!(engine.step(&mut surface), ReplayTick::Idle);
        assert_eq!(surface.segments_drawn(), 2);
        assert_eq!(engine.state(), ReplayState::Cancelled);
    }

    #[test]
    fn test_cancel_during_pause_after_shape() {
        let mut engine = ReplayEngine::new(ReplayConfig::default());
        let mut surface = RecordingSurface::new();
        engine.start(&[shape(Tool::Circle), brush(3)], &mut surface).unwrap();

        assert_eq!(
            engine.step(&mut surface),
            ReplayTick::Wait(Duration::from_millis(DEFAULT_STROKE_DELAY_MS))
        );
        engine.cancel();

        assert_eq!(engine.step(&mut surface), ReplayTick::Cancelled);
        assert_eq!(surface.shapes_drawn(), 1);
        assert_eq!(surface.segments_drawn(), 0);
        assert_eq!(engine.progress(), (1, 2));
    }

    #[test]
    fn test_cancel_while_waiting_does_not_preempt() {
        let mut engine = ReplayEngine::new(ReplayConfig::default());
        let mut surface = RecordingSurface::new();
        engine.start(&[brush(3), brush(3)], &mut surface).unwrap();

        let t0 = Instant::now();
        let due = t0 + Duration::from_millis(DEFAULT_SEGMENT_DELAY_MS);
        assert_eq!(engine.poll(t0, &mut surface), ReplayStatus::Waiting { until: due });
        engine.cancel();
        assert!(!engine.is_replaying());

        // The pending delay still runs out before cancellation is observed.
        assert_eq!(
            engine.poll(t0 + Duration::from_millis(5), &mut surface),
            ReplayStatus::Waiting { until: due }
        );
        assert_eq!(engine.poll(due, &mut surface), ReplayStatus::Cancelled);
        assert_eq!(surface.segments_drawn(), 1);
        assert_eq!(engine.state(), ReplayState::Cancelled);
        assert_eq!(engine.poll(due + Duration::from_secs(1), &mut surface), ReplayStatus::Cancelled);
        assert_eq!(surface.segments_drawn(), 1);
    }

    #[test]
    fn test_restart_after_cancel() {
        let mut engine = ReplayEngine::new(ReplayConfig::default());
        let mut surface = RecordingSurface::new();
        engine.start(&[brush(4)], &mut surface).unwrap();
        engine.step(&mut surface);
        engine.cancel();

        assert_eq!(engine.start(&[brush(4)], &mut surface), Ok(true));
        run_to_end(&mut engine, &mut surface);
        assert_eq!(surface.visible().len(), 3);
    }

    #[test]
    fn test_single_point_stroke_draws_nothing() {
        let mut engine = ReplayEngine::new(ReplayConfig::default());
        let mut surface = RecordingSurface::new();
        engine.start(&[brush(1), brush(2)], &mut surface).unwrap();
        run_to_end(&mut engine, &mut surface);
        assert_eq!(surface.segments_drawn(), 1);
    }

    #[test]
    fn test_poll_respects_deadlines() {
        let mut engine = ReplayEngine::new(ReplayConfig::default());
        let mut surface = RecordingSurface::new();
        engine.start(&[brush(3), shape(Tool::Rectangle)], &mut surface).unwrap();

        let t0 = Instant::now();
        // First segment is drawn immediately.
        assert_eq!(
            engine.poll(t0, &mut surface),
            ReplayStatus::Waiting { until: t0 + Duration::from_millis(10) }
        );
        assert_eq!(surface.segments_drawn(), 1);

        // Not yet due.
        engine.poll(t0 + Duration::from_millis(5), &mut surface);
        assert_eq!(surface.segments_drawn(), 1);

        // Second (last) segment, then the inter-stroke pause.
        assert_eq!(
            engine.poll(t0 + Duration::from_millis(10), &mut surface),
            ReplayStatus::Waiting { until: t0 + Duration::from_millis(110) }
        );
        assert_eq!(surface.segments_drawn(), 2);
        assert_eq!(surface.shapes_drawn(), 0);

        assert_eq!(engine.poll(t0 + Duration::from_secs(1), &mut surface), ReplayStatus::Completed);
        assert_eq!(surface.shapes_drawn(), 1);
        assert!(!engine.is_replaying());
    }

    #[test]
    fn test_instant_config_finishes_in_one_poll() {
        let mut engine = ReplayEngine::new(ReplayConfig::instant());
        let mut surface = RecordingSurface::new();
        engine.start(&[brush(6), shape(Tool::Circle), brush(2)], &mut surface).unwrap();
        assert_eq!(engine.poll(Instant::now(), &mut surface), ReplayStatus::Completed);
        assert_eq!(surface.segments_drawn(), 6);
        assert_eq!(surface.shapes_drawn(), 1);
        assert_eq!(engine.progress(), (3, 3));
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config: ReplayConfig = serde_json::from_str(r#"{"stroke_delay_ms": 250}"#).unwrap();
        assert_eq!(config.segment_delay(), Duration::from_millis(10));
        assert_eq!(config.stroke_delay(), Duration::from_millis(250));
    }
}
