//! Versemark Render Library
//!
//! CPU raster backend for annotation surfaces. Each document view keeps an
//! offscreen raster of its full content height, the visible surface it is
//! blitted to, and an overlay for the stroke being drawn.

mod error;
mod export;
mod pipeline;
mod raster;
mod surface;

pub use error::{RenderError, RenderResult};
pub use export::encode_png;
pub use pipeline::{DocumentView, RasterPipeline};
pub use raster::{FLATTEN_TOLERANCE, draw_path, draw_segment, draw_stroke};
pub use surface::Surface;
