//! Row-major placement of plots in equally sized cells.

use crate::geometry::{Point, Size};
use crate::grid::Layout;
use crate::plot::Plot;
use crate::surface::DrawingSurface;

/// Puts plot `i` at row `i / cols`, column `i % cols`, every cell `cell` large.
#[derive(Debug, Clone)]
pub struct GridLayout {
    cell: Size,
    rows: usize,
    cols: usize,
    updates: usize,
}

impl GridLayout {
    /// Layout with cells of the given size.
    #[must_use]
    pub fn new(cell: Size) -> Self {
        Self {
            cell,
            rows: 1,
            cols: 1,
            updates: 0,
        }
    }

    /// Top-left corner of cell `index` in a grid `cols` wide.
    #[must_use]
    pub fn cell_position(&self, index: usize, cols: usize) -> Point {
        let cols = cols.max(1);
        Point::new(
            (index % cols) as f32 * self.cell.width,
            (index / cols) as f32 * self.cell.height,
        )
    }

    /// Grid shape of the last placement.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of placements so far.
    #[must_use]
    pub fn updates(&self) -> usize {
        self.updates
    }
}

impl<S: DrawingSurface> Layout<S> for GridLayout {
    fn set_plots(&mut self, plots: &[Option<&Plot<S>>], rows: usize, cols: usize) {
        self.rows = rows;
        self.cols = cols;
        self.updates += 1;
        for (index, plot) in plots.iter().enumerate() {
            if let Some(plot) = plot {
                plot.set_position(self.cell_position(index, cols));
                plot.set_size(self.cell);
            }
        }
    }
}
