//! InkReel Render Library
//!
//! Software implementation of [`inkreel_core::RenderSurface`] backed by a
//! tiny-skia pixmap, with PNG export.

pub mod color;
pub mod error;
pub mod raster;

pub use color::parse_color;
pub use error::{RenderError, RenderResult};
pub use raster::{MAX_DIMENSION, MAX_PIXELS, RasterSnapshot, RasterSurface};

pub use peniko::Color;
