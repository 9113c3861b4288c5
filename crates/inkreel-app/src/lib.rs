//! InkReel Application
//!
//! Shells around the drawing core: a command-line tool that renders and
//! replays recorded sessions onto a software raster, and a WebAssembly
//! binding that drives an HTML canvas.

pub mod config;
pub mod error;

#[cfg(not(target_arch = "wasm32"))]
pub mod headless;

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
pub mod cli;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{CanvasSurface, WebDrawing, run_wasm};
