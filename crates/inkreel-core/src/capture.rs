//! In-progress stroke capture.

use crate::stroke::{Stroke, StrokeStyle};
use kurbo::Point;

/// State of a pointer gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CaptureState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Pointer is down; points accumulate.
    Capturing {
        /// Seed point followed by every move.
        points: Vec<Point>,
    },
}

/// Tracks the point sequence of the stroke being drawn.
#[derive(Debug, Clone, Default)]
pub struct StrokeCapture {
    state: CaptureState,
}

impl StrokeCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a gesture at `point`. An unfinished gesture is discarded.
    pub fn begin(&mut self, point: Point) {
        if self.is_capturing() {
            log::debug!("Capture: restarting, previous gesture discarded");
        }
        self.state = CaptureState::Capturing {
            points: vec![point],
        };
    }

    /// Append a move. Returns false when no gesture is in progress.
    pub fn extend(&mut self, point: Point) -> bool {
        match &mut self.state {
            CaptureState::Capturing { points } => {
                points.push(point);
                true
            }
            CaptureState::Idle => false,
        }
    }

    /// End the gesture and reify it as a stroke.
    ///
    /// A gesture that never moved past its seed point yields nothing.
    pub fn finish(&mut self, style: &StrokeStyle) -> Option<Stroke> {
        match std::mem::take(&mut self.state) {
            CaptureState::Capturing { points } if points.len() > 1 => {
                Some(Stroke::new(points, style.clone()))
            }
            CaptureState::Capturing { .. } => {
                log::debug!("Capture: gesture without movement, no stroke");
                None
            }
            CaptureState::Idle => None,
        }
    }

    /// Abandon the gesture.
    pub fn cancel(&mut self) {
        self.state = CaptureState::Idle;
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.state, CaptureState::Capturing { .. })
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    /// Points captured so far (empty when idle).
    pub fn points(&self) -> &[Point] {
        match &self.state {
            CaptureState::Capturing { points } => points,
            CaptureState::Idle => &[],
        }
    }

    /// Seed point of the current gesture.
    pub fn anchor(&self) -> Option<Point> {
        self.points().first().copied()
    }

    /// Most recent point of the current gesture.
    pub fn last_point(&self) -> Option<Point> {
        self.points().last().copied()
    }
}
