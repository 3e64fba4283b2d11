//! A window holding a rows × cols grid of lazily created plots.
//!
//! [`PlotGrid`] is the application-facing API. Every per-plot call takes the
//! plot index, creates the plot on first use and forwards to its
//! [`PlotEngine`]. The GUI toolkit plugs in through [`Backend`], which
//! creates the [`Window`], the [`Layout`] and one [`DrawingSurface`] per plot.
//!
//! # Locking
//!
//! Refreshes are serialized by a [`RefreshLock`]. Locks are always taken in
//! the order refresh lock, grid state, then layout / window / plot surface.
//!
//! # Example
//!
//! ```
//! use rtplot::backend::HeadlessBackend;
//! use rtplot::grid::PlotGrid;
//!
//! let grid = PlotGrid::new(HeadlessBackend::new());
//! grid.set_grid_size(2, 2).unwrap();
//! grid.set_plot_name(0, "position").unwrap();
//! grid.add_point(0, 7, 1.0, 2.0).unwrap();
//! grid.refresh();
//! assert!(grid.plot_exists(0));
//! assert!(!grid.plot_exists(3));
//! ```

pub mod layout;
pub mod refresh;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard, RwLock};
use tracing::{debug, trace};

use crate::color::Color;
use crate::config::{GridConfig, PlotConfig};
use crate::data::CurveId;
use crate::engine::PlotEngine;
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::plot::Plot;
use crate::surface::{DrawingSurface, MouseEvent};

pub use layout::GridLayout;
pub use refresh::AutoRefresh;

/// The window all plots of a grid live in.
pub trait Window: Send + 'static {
    /// Make the window visible.
    fn show(&mut self);

    /// Hide the window.
    fn hide(&mut self);

    /// Smallest size the window may be resized to.
    fn set_minimum_size(&mut self, width: u32, height: u32);

    /// Schedule a repaint of the window.
    fn redraw(&mut self);

    /// Process pending window events; `false` once the window was closed.
    fn process_events(&mut self) -> bool {
        true
    }
}

/// Arranges plot widgets inside the window.
pub trait Layout<S>: Send + 'static {
    /// Place `plots` (row-major, `None` for cells not created yet).
    ///
    /// Called again every time a plot is created or the grid is resized.
    fn set_plots(&mut self, plots: &[Option<&Plot<S>>], rows: usize, cols: usize);
}

/// Factory for everything toolkit specific.
pub trait Backend: Send + 'static {
    /// Per-plot drawing surface.
    type Surface: DrawingSurface + Send + 'static;
    /// Top-level window.
    type Window: Window;
    /// Widget layout.
    type Layout: Layout<Self::Surface>;

    /// Create the window.
    fn create_window(&mut self, config: &GridConfig) -> Self::Window;

    /// Create the layout.
    fn create_layout(&mut self, config: &GridConfig) -> Self::Layout;

    /// Create the surface of plot `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot create the widget.
    fn make_surface(&mut self, index: usize, config: &GridConfig) -> Result<Self::Surface>;
}

/// Pixel size of a `rows × cols` grid of plots.
pub(crate) fn window_size(config: &GridConfig, rows: usize, cols: usize) -> (u32, u32) {
    let span = |cells: usize, cell: u32| {
        u32::try_from(cells)
            .unwrap_or(u32::MAX)
            .saturating_mul(cell)
    };
    (span(cols, config.plot_width), span(rows, config.plot_height))
}

/// Lock serializing refresh passes, shareable between grids.
#[derive(Debug, Clone, Default)]
pub struct RefreshLock(Arc<Mutex<()>>);

impl RefreshLock {
    /// A new, unshared lock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold the lock; no refresh of a grid sharing it runs meanwhile.
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.0.lock()
    }
}

struct GridState<S> {
    rows: usize,
    cols: usize,
    plots: Vec<Option<Plot<S>>>,
    template: PlotConfig,
}

impl<S> GridState<S> {
    fn count(&self) -> usize {
        self.rows * self.cols
    }
}

struct Shared<B: Backend> {
    config: GridConfig,
    state: RwLock<GridState<B::Surface>>,
    backend: Mutex<B>,
    layout: Mutex<B::Layout>,
    window: Mutex<B::Window>,
    refresh_lock: RefreshLock,
}

impl<B: Backend> Shared<B> {
    fn refresh(&self) {
        let _guard = self.refresh_lock.lock();
        let drawn = {
            let state = self.state.read();
            let mut drawn = 0;
            for plot in state.plots.iter().flatten() {
                plot.refresh();
                drawn += 1;
            }
            drawn
        };
        self.window.lock().redraw();
        trace!(plots = drawn, "refresh");
    }

    fn update_layout(&self) {
        {
            let state = self.state.read();
            let plots: Vec<Option<&Plot<B::Surface>>> =
                state.plots.iter().map(Option::as_ref).collect();
            self.layout.lock().set_plots(&plots, state.rows, state.cols);
        }
        self.refresh();
    }

    fn check_plot(&self, index: usize) -> Result<()> {
        {
            let state = self.state.read();
            let count = state.count();
            if index >= count {
                return Err(Error::PlotIndexOutOfRange { index, count });
            }
            if state.plots[index].is_some() {
                return Ok(());
            }
        }

        let created = {
            let mut state = self.state.write();
            let count = state.count();
            match state.plots.get(index) {
                None => return Err(Error::PlotIndexOutOfRange { index, count }),
                Some(Some(_)) => false,
                Some(None) => {
                    let surface = self.backend.lock().make_surface(index, &self.config)?;
                    let engine = PlotEngine::with_config(state.template.clone());
                    state.plots[index] = Some(Plot::new(engine, surface));
                    debug!(index, "plot created");
                    true
                }
            }
        };
        if created {
            self.update_layout();
        }
        Ok(())
    }

    fn with_plot<R>(&self, index: usize, f: impl FnOnce(&Plot<B::Surface>) -> R) -> Result<R> {
        self.check_plot(index)?;
        let state = self.state.read();
        match state.plots.get(index) {
            Some(Some(plot)) => Ok(f(plot)),
            _ => Err(Error::PlotIndexOutOfRange {
                index,
                count: state.count(),
            }),
        }
    }
}

/// A grid of real-time plots in one window.
///
/// All methods take `&self`; share the grid through an `Arc` to feed it from
/// producer threads. Dropping the grid stops auto-refresh.
pub struct PlotGrid<B: Backend> {
    shared: Arc<Shared<B>>,
    auto_refresh: Mutex<AutoRefresh>,
}

impl<B: Backend> std::fmt::Debug for PlotGrid<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (rows, cols) = self.grid_size();
        f.debug_struct("PlotGrid")
            .field("rows", &rows)
            .field("cols", &cols)
            .field("auto_refresh", &*self.auto_refresh.lock())
            .finish_non_exhaustive()
    }
}

impl<B: Backend> PlotGrid<B> {
    /// A 1×1 grid with the default configuration. The window is shown.
    pub fn new(backend: B) -> Self {
        Self::build(backend, GridConfig::default(), RefreshLock::new())
    }

    /// A 1×1 grid with `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid.
    pub fn with_config(backend: B, config: GridConfig) -> Result<Self> {
        Self::with_refresh_lock(backend, config, RefreshLock::new())
    }

    /// A grid whose refreshes are serialized with every grid sharing `lock`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid.
    pub fn with_refresh_lock(backend: B, config: GridConfig, lock: RefreshLock) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(backend, config, lock))
    }

    fn build(mut backend: B, config: GridConfig, refresh_lock: RefreshLock) -> Self {
        let mut window = backend.create_window(&config);
        let layout = backend.create_layout(&config);
        window.show();

        let state = GridState {
            rows: 1,
            cols: 1,
            plots: vec![None],
            template: config.plot.clone(),
        };
        let period = Duration::from_millis(config.auto_refresh_ms);
        let grid = Self {
            shared: Arc::new(Shared {
                config,
                state: RwLock::new(state),
                backend: Mutex::new(backend),
                layout: Mutex::new(layout),
                window: Mutex::new(window),
                refresh_lock,
            }),
            auto_refresh: Mutex::new(AutoRefresh::new()),
        };
        if !period.is_zero() {
            grid.enable_auto_refresh(period);
        }
        grid
    }

    /// The configuration the grid was built with.
    pub fn config(&self) -> &GridConfig {
        &self.shared.config
    }

    /// Handle to the lock serializing this grid's refreshes.
    pub fn refresh_lock(&self) -> RefreshLock {
        self.shared.refresh_lock.clone()
    }

    /// Resize the grid. Both `rows` and `cols` must be greater than 1.
    ///
    /// Existing plots keep their index; plots beyond the new size are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGridSize`] otherwise.
    pub fn set_grid_size(&self, rows: usize, cols: usize) -> Result<()> {
        if rows <= 1 || cols <= 1 {
            return Err(Error::InvalidGridSize { rows, cols });
        }
        {
            let mut state = self.shared.state.write();
            state.rows = rows;
            state.cols = cols;
            state.plots.resize_with(rows * cols, || None);
        }
        let (width, height) = window_size(&self.shared.config, rows, cols);
        self.shared.window.lock().set_minimum_size(width, height);
        debug!(rows, cols, "grid resized");
        self.shared.update_layout();
        Ok(())
    }

    /// `(rows, cols)`.
    pub fn grid_size(&self) -> (usize, usize) {
        let state = self.shared.state.read();
        (state.rows, state.cols)
    }

    /// True if plot `index` has been created.
    pub fn plot_exists(&self, index: usize) -> bool {
        matches!(self.shared.state.read().plots.get(index), Some(Some(_)))
    }

    /// Create plot `index` if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlotIndexOutOfRange`] if `index >= rows * cols`, or
    /// the backend's error if the surface cannot be created.
    pub fn check_plot(&self, index: usize) -> Result<()> {
        self.shared.check_plot(index)
    }

    /// Run `f` on plot `index`, creating it if needed.
    ///
    /// `f` runs under the grid's state lock and must not call back into the grid.
    ///
    /// # Errors
    ///
    /// Same as [`check_plot`](Self::check_plot).
    pub fn with_plot<R>(&self, index: usize, f: impl FnOnce(&Plot<B::Surface>) -> R) -> Result<R> {
        self.shared.with_plot(index, f)
    }

    /// Run `f` on every cell, in index order. Nothing is created.
    pub fn with_plots<R>(&self, f: impl FnOnce(&[Option<Plot<B::Surface>>]) -> R) -> R {
        f(&self.shared.state.read().plots)
    }

    /// Run `f` on the window.
    pub fn with_window<R>(&self, f: impl FnOnce(&mut B::Window) -> R) -> R {
        f(&mut self.shared.window.lock())
    }

    /// Run `f` on the layout.
    pub fn with_layout<R>(&self, f: impl FnOnce(&mut B::Layout) -> R) -> R {
        f(&mut self.shared.layout.lock())
    }

    fn engine<R>(&self, index: usize, f: impl FnOnce(&PlotEngine) -> R) -> Result<R> {
        self.with_plot(index, |plot| f(plot.engine()))
    }

    /// [`engine`](Self::engine) followed by a refresh.
    fn update<R>(&self, index: usize, f: impl FnOnce(&PlotEngine) -> R) -> Result<R> {
        let out = self.engine(index, f)?;
        self.refresh();
        Ok(out)
    }

    /// Redraw every plot now.
    pub fn refresh(&self) {
        self.shared.refresh();
    }

    /// Process window events; `false` once the window was closed.
    pub fn check(&self) -> bool {
        self.shared.window.lock().process_events()
    }

    /// Append a point to `curve` of plot `plot`. Does not refresh.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlotIndexOutOfRange`] for an index outside the grid.
    pub fn add_point(&self, plot: usize, curve: CurveId, x: f32, y: f32) -> Result<()> {
        self.engine(plot, |engine| engine.add_point(curve, x, y))
    }

    /// Drop the oldest point of `curve`. Does not refresh.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlotIndexOutOfRange`] for an index outside the grid.
    pub fn remove_first_point(&self, plot: usize, curve: CurveId) -> Result<()> {
        self.engine(plot, |engine| engine.remove_first_point(curve))
    }

    /// X axis title of `plot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlotIndexOutOfRange`] for an index outside the grid.
    pub fn set_x_label(&self, plot: usize, label: impl Into<String>) -> Result<()> {
        self.update(plot, |engine| engine.set_x_label(label))
    }

    /// Y axis title of `plot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlotIndexOutOfRange`] for an index outside the grid.
    pub fn set_y_label(&self, plot: usize, label: impl Into<String>) -> Result<()> {
        self.update(plot, |engine| engine.set_y_label(label))
    }

    /// Label of `curve` in the label panel of `plot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlotIndexOutOfRange`] for an index outside the grid.
    pub fn set_curve_label(
        &self,
        plot: usize,
        curve: CurveId,
        label: impl Into<String>,
    ) -> Result<()> {
        self.update(plot, |engine| engine.set_curve_label(curve, label))
    }

    /// Title of `plot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlotIndexOutOfRange`] for an index outside the grid.
    pub fn set_plot_name(&self, plot: usize, name: impl Into<String>) -> Result<()> {
        self.update(plot, |engine| engine.set_plot_name(name))
    }

    /// Fixed x range of `plot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlotIndexOutOfRange`] for an index outside the grid.
    pub fn set_x_range(&self, plot: usize, min: f32, max: f32) -> Result<()> {
        self.update(plot, |engine| engine.set_x_range(min, max))
    }

    /// Fixed y range of `plot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlotIndexOutOfRange`] for an index outside the grid.
    pub fn set_y_range(&self, plot: usize, min: f32, max: f32) -> Result<()> {
        self.update(plot, |engine| engine.set_y_range(min, max))
    }

    /// Let the x axis of `plot` follow its data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlotIndexOutOfRange`] for an index outside the grid.
    pub fn auto_x_range(&self, plot: usize) -> Result<()> {
        self.update(plot, PlotEngine::set_auto_x_range)
    }

    /// Let the y axis of `plot` follow its data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlotIndexOutOfRange`] for an index outside the grid.
    pub fn auto_y_range(&self, plot: usize) -> Result<()> {
        self.update(plot, PlotEngine::set_auto_y_range)
    }

    /// Capacity of every existing curve of `plot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlotIndexOutOfRange`] for an index outside the grid.
    pub fn set_max_points(&self, plot: usize, count: usize) -> Result<()> {
        self.update(plot, |engine| engine.set_max_points(count))
    }

    /// Capacity of one curve of `plot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlotIndexOutOfRange`] for an index outside the grid.
    pub fn set_curve_max_points(&self, plot: usize, curve: CurveId, count: usize) -> Result<()> {
        self.update(plot, |engine| engine.set_curve_max_points(curve, count))
    }

    /// Major subdivisions per axis of `plot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlotIndexOutOfRange`] or [`Error::InvalidSubdivisions`].
    pub fn set_subdivisions(&self, plot: usize, count: usize) -> Result<()> {
        self.update(plot, |engine| engine.set_subdivisions(count))?
    }

    /// Palette of every existing plot and of plots created later.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyPalette`] if `palette` is empty.
    pub fn set_color_palette(&self, palette: Vec<Color>) -> Result<()> {
        if palette.is_empty() {
            return Err(Error::EmptyPalette);
        }
        {
            let mut state = self.shared.state.write();
            for plot in state.plots.iter().flatten() {
                plot.engine().set_color_palette(palette.clone())?;
            }
            state.template.palette = palette;
        }
        self.refresh();
        Ok(())
    }

    /// Palette of one plot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlotIndexOutOfRange`] or [`Error::EmptyPalette`].
    pub fn set_plot_color_palette(&self, plot: usize, palette: Vec<Color>) -> Result<()> {
        self.update(plot, |e| e.set_color_palette(palette))?
    }

    /// Palette of `plot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlotIndexOutOfRange`] for an index outside the grid.
    pub fn color_palette(&self, plot: usize) -> Result<Vec<Color>> {
        self.engine(plot, PlotEngine::color_palette)
    }

    /// Show the label panel of `plot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlotIndexOutOfRange`] for an index outside the grid.
    pub fn show_labels(&self, plot: usize) -> Result<()> {
        self.update(plot, PlotEngine::show_labels)
    }

    /// Hide the label panel of `plot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlotIndexOutOfRange`] for an index outside the grid.
    pub fn hide_labels(&self, plot: usize) -> Result<()> {
        self.update(plot, PlotEngine::hide_labels)
    }

    /// Flip the label panel of `plot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlotIndexOutOfRange`] for an index outside the grid.
    pub fn toggle_labels(&self, plot: usize) -> Result<()> {
        self.update(plot, PlotEngine::toggle_labels)
    }

    /// Forward a mouse event to `plot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlotIndexOutOfRange`] for an index outside the grid.
    pub fn handle_mouse_event(
        &self,
        plot: usize,
        event: MouseEvent,
        position: Point,
    ) -> Result<()> {
        self.with_plot(plot, |p| p.handle_mouse_event(event, position))
    }

    /// Mean frame duration of `plot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlotIndexOutOfRange`] for an index outside the grid.
    pub fn average_redraw_duration(&self, plot: usize) -> Result<Duration> {
        self.engine(plot, PlotEngine::average_redraw_duration)
    }

    /// Mean `draw_line_segment` duration of `plot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlotIndexOutOfRange`] for an index outside the grid.
    pub fn average_draw_line_duration(&self, plot: usize) -> Result<Duration> {
        self.engine(plot, PlotEngine::average_draw_line_duration)
    }

    /// Mean `end_line` duration of `plot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlotIndexOutOfRange`] for an index outside the grid.
    pub fn average_end_line_duration(&self, plot: usize) -> Result<Duration> {
        self.engine(plot, PlotEngine::average_end_line_duration)
    }

    /// Refresh every `period` from a background thread. A zero period disables.
    ///
    /// Calling again while running only changes the period.
    pub fn enable_auto_refresh(&self, period: Duration) {
        let shared = Arc::clone(&self.shared);
        let refresh = move || shared.refresh();
        self.auto_refresh.lock().enable(period, refresh);
    }

    /// Stop auto-refresh; returns once the background thread has exited.
    pub fn disable_auto_refresh(&self) {
        self.auto_refresh.lock().disable();
    }

    /// True while the auto-refresh thread runs.
    pub fn is_auto_refreshing(&self) -> bool {
        self.auto_refresh.lock().is_running()
    }

    /// Stop auto-refresh. The window stays visible.
    pub fn quit(&self) {
        self.disable_auto_refresh();
        debug!("quit: auto-refresh stopped, window left as is");
    }
}

impl<B: Backend> Drop for PlotGrid<B> {
    fn drop(&mut self) {
        self.quit();
    }
}
