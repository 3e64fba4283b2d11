//! # rtplot
//!
//! Engine for real-time plotting of many curves in a grid of plots.
//!
//! Producer threads stream `(x, y)` samples into numbered curves of numbered
//! plots; a refresh draws every plot through a toolkit-agnostic
//! [`DrawingSurface`](surface::DrawingSurface). Curves are bounded FIFO
//! buffers, axes can follow the data, and refreshes can run periodically from
//! a background thread.
//!
//! ## Quick Start
//!
//! ```
//! use rtplot::prelude::*;
//!
//! let grid = PlotGrid::new(HeadlessBackend::new());
//! grid.set_grid_size(2, 2)?;
//! grid.set_plot_name(0, "sine")?;
//! grid.auto_x_range(0)?;
//! for i in 0..100 {
//!     let x = i as f32 * 0.1;
//!     grid.add_point(0, 0, x, x.sin())?;
//! }
//! grid.refresh();
//! # Ok::<(), rtplot::Error>(())
//! ```
//!
//! ## Backends
//!
//! A GUI toolkit integrates by implementing [`grid::Backend`]. The crate ships
//! [`backend::HeadlessBackend`], which records draw calls. With the `raster`
//! feature it also ships `RasterBackend`, which renders every plot into a
//! framebuffer for inspection in tests.
//!
//! ## Feature Flags
//!
//! - `config`: load [`config::GridConfig`] from YAML
//! - `raster`: software raster backend and grid snapshots

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]

// ============================================================================
// Core Modules
// ============================================================================

/// Named colors and palettes.
pub mod color;

/// Points, sizes and rectangles in window coordinates.
pub mod geometry;

/// Plot and grid configuration.
pub mod config;

/// Running averages of operation durations.
pub mod timer;

// ============================================================================
// Plotting Modules
// ============================================================================

/// Curve buffers and range tracking.
pub mod data;

/// The surface contract every backend implements.
pub mod surface;

/// Per-plot state and the draw pass.
pub mod engine;

/// A plot widget.
pub mod plot;

/// Grids of plots and auto-refresh.
pub mod grid;

// ============================================================================
// Rendering Modules
// ============================================================================

/// Software rasterization.
#[cfg(feature = "raster")]
#[cfg_attr(docsrs, doc(cfg(feature = "raster")))]
pub mod render;

/// Built-in backends.
pub mod backend;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for rtplot operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```
/// use rtplot::prelude::*;
/// ```
pub mod prelude {
    pub use batuta_common::display::WithDimensions;
    pub use crate::backend::{HeadlessBackend, RecordingSurface};
    #[cfg(feature = "raster")]
    pub use crate::backend::{RasterBackend, RasterSurface};
    pub use crate::color::{Color, Rgba, DEFAULT_PALETTE};
    pub use crate::config::{GridConfig, Margins, PlotConfig};
    pub use crate::data::CurveId;
    pub use crate::engine::PlotEngine;
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{Point, Rect, Size};
    pub use crate::grid::{Backend, Layout, PlotGrid, RefreshLock, Window};
    pub use crate::plot::Plot;
    #[cfg(feature = "raster")]
    pub use crate::render::Framebuffer;
    pub use crate::surface::{DrawingSurface, LineStyle, MouseEvent};
}
