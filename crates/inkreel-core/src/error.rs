//! Error types for drawing operations.

use thiserror::Error;

/// Conditions worth reporting to the caller.
///
/// Ordinary boundaries (undo at the first state, an unknown jump target, an
/// empty stroke log) are not errors; those operations return `None`/`false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawingError {
    #[error("Replay already in progress")]
    ReplayBusy,
}

/// Result type for drawing operations.
pub type DrawingResult<T> = Result<T, DrawingError>;
