//! Portable stroke export.
//!
//! A session is the stroke log plus the canvas size it was drawn on, in a
//! versioned JSON document that export tools (frame renderers, video
//! encoders) can consume without the rest of the drawing state.

use crate::state::DrawingState;
use crate::stroke_log::StrokeLog;
use crate::surface::RenderSurface;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current session format version.
pub const SESSION_VERSION: u32 = 1;

/// Session (de)serialization errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Unsupported session version {found} (expected {SESSION_VERSION})")]
    UnsupportedVersion { found: u32 },
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Recorded strokes with the canvas dimensions they belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub version: u32,
    pub width: u32,
    pub height: u32,
    pub strokes: StrokeLog,
}

impl Session {
    pub fn new(width: u32, height: u32, strokes: impl Into<StrokeLog>) -> Self {
        Self {
            version: SESSION_VERSION,
            width,
            height,
            strokes: strokes.into(),
        }
    }

    /// Capture the stroke log of a drawing.
    pub fn from_state<S: RenderSurface>(state: &DrawingState<S>, width: u32, height: u32) -> Self {
        Self::new(width, height, state.stroke_log().clone())
    }

    pub fn to_json(&self) -> SessionResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> SessionResult<Self> {
        let session: Session = serde_json::from_str(json)?;
        if session.version != SESSION_VERSION {
            return Err(SessionError::UnsupportedVersion {
                found: session.version,
            });
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::Tool;
    use crate::surface::RecordingSurface;
    use kurbo::Point;

    #[test]
    fn test_from_state() {
        let mut state = DrawingState::new(RecordingSurface::new());
        state.set_tool(Tool::Circle);
        state.set_color("#ff0000");
        state.start_stroke(Point::new(10.0, 10.0));
        state.add_to_stroke(Point::new(20.0, 10.0));
        state.end_stroke();

        let session = Session::from_state(&state, 640, 480);
        assert_eq!(session.version, SESSION_VERSION);
        assert_eq!(session.strokes.len(), 1);
        assert_eq!(session.strokes.strokes()[0].style.color, "#ff0000");

        let loaded = Session::from_json(&session.to_json().unwrap()).unwrap();
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_rejects_unknown_version() {
        let json = r#"{"version": 7, "width": 1, "height": 1, "strokes": []}"#;
        assert!(matches!(
            Session::from_json(json),
            Err(SessionError::UnsupportedVersion { found: 7 })
        ));
    }

    #[test]
    fn test_rejects_bad_tool() {
        let json = r##"{"version": 1, "width": 1, "height": 1, "strokes": [
            {"points": [], "color": "#000", "width": 1.0, "opacity": 1.0, "tool": "spray"}
        ]}"##;
        assert!(matches!(Session::from_json(json), Err(SessionError::Serialization(_))));
    }
}
