//! InkReel Core Library
//!
//! Drawing history and replay engine: a branch-truncating snapshot timeline
//! for undo/redo/jump, an append-only stroke log, stroke capture, and a
//! time-paced replay of recorded strokes. Pixels are left to a
//! [`RenderSurface`] implementation.

pub mod capture;
pub mod error;
pub mod history;
pub mod replay;
pub mod session;
pub mod shape;
pub mod state;
pub mod stroke;
pub mod stroke_log;
pub mod surface;

pub use capture::{CaptureState, StrokeCapture};
pub use error::{DrawingError, DrawingResult};
pub use history::{EntryId, EntrySummary, HistoryEntry, Timeline};
pub use replay::{ReplayConfig, ReplayEngine, ReplayFlag, ReplayState, ReplayStatus, ReplayTick};
pub use session::{Session, SessionError};
pub use shape::ShapeKind;
pub use state::{DrawingConfig, DrawingState, HistoryView};
pub use stroke::{Stroke, StrokeStyle, Tool};
pub use stroke_log::StrokeLog;
pub use surface::{DrawOp, RecordingSurface, RenderSurface};

pub use kurbo::Point;
