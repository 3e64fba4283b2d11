//! Software rasterizer used by the raster backend.
//!
//! # Algorithms
//!
//! - **Liang–Barsky**: segments are clipped before they are walked
//! - **Bresenham's Line**: integer line drawing, solid or dotted
//!
//! # References
//!
//! - Bresenham, J. E. (1965). "Algorithm for computer control of a digital plotter."
//! - Liang, Y.-D., Barsky, B. A. (1984). "A new concept and method for line clipping."

mod framebuffer;
mod primitives;

pub use framebuffer::Framebuffer;
pub use primitives::{bresenham, clip_segment, draw_line, fill_rect, PixelRect};
