//! Error types for rtplot operations.

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in rtplot operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Minimum or maximum requested from a range tracker holding no values.
    #[error("Range is empty")]
    EmptyRange,

    /// Grid with fewer than two rows or columns.
    #[error("Invalid grid size: {rows}x{cols} (rows and cols must both be greater than 1)")]
    InvalidGridSize {
        /// Requested rows.
        rows: usize,
        /// Requested columns.
        cols: usize,
    },

    /// Plot index outside the current grid.
    #[error("Plot index {index} out of range (grid holds {count} plots)")]
    PlotIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of cells in the grid.
        count: usize,
    },

    /// Axis subdivision count must be strictly positive.
    #[error("Invalid subdivision count: {0}")]
    InvalidSubdivisions(usize),

    /// A color palette needs at least one color.
    #[error("Color palette is empty")]
    EmptyPalette,

    /// Invalid dimensions for a framebuffer or surface.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}
