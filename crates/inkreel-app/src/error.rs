//! Application error type.

use inkreel_core::{DrawingError, SessionError};
use inkreel_render::RenderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Replay error: {0}")]
    Replay(#[from] DrawingError),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
}

pub type AppResult<T> = Result<T, AppError>;
