//! Application configuration.

use crate::error::{AppError, AppResult};
use inkreel_core::{DrawingConfig, ReplayConfig, Session};
use inkreel_render::color::try_parse_color;
use peniko::Color;

/// Canvas and export settings shared by the CLI and the browser shell.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Canvas width used when a session does not carry one.
    pub width: u32,
    /// Canvas height used when a session does not carry one.
    pub height: u32,
    /// Opaque background composited under exported images. `None` keeps
    /// transparency.
    pub background: Option<Color>,
    pub replay: ReplayConfig,
    /// Snapshots kept for undo. `None` keeps every state.
    pub history_limit: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
            background: Some(Color::WHITE),
            replay: ReplayConfig::default(),
            history_limit: None,
        }
    }
}

impl AppConfig {
    pub fn drawing_config(&self) -> DrawingConfig {
        DrawingConfig {
            replay: self.replay,
            history_limit: self.history_limit,
        }
    }

    /// Canvas size for `session`, falling back to the configured size for
    /// any zero dimension.
    pub fn canvas_size(&self, session: &Session) -> (u32, u32) {
        let width = if session.width > 0 { session.width } else { self.width };
        let height = if session.height > 0 { session.height } else { self.height };
        (width, height)
    }
}

/// Parse a background argument: a CSS colour, or `none`/`transparent`.
pub fn parse_background(value: &str) -> AppResult<Option<Color>> {
    match value.trim() {
        "none" | "transparent" => Ok(None),
        other => try_parse_color(other)
            .map(Some)
            .ok_or_else(|| AppError::InvalidColor(other.to_string())),
    }
}
