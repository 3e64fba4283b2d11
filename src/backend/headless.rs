//! Backends without a window system.
//!
//! [`HeadlessBackend`] records every plot's calls and reports window activity
//! through shared [`WindowStats`].

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::backend::recording::RecordingSurface;
use crate::config::GridConfig;
use crate::error::Result;
use crate::geometry::{Point, Rect, Size};
use crate::grid::{Backend, GridLayout, Window};

/// Observable state of a headless window.
#[derive(Debug, Default)]
pub struct WindowStats {
    shown: AtomicBool,
    redraws: AtomicUsize,
    min_width: AtomicU32,
    min_height: AtomicU32,
    close_requested: AtomicBool,
}

impl WindowStats {
    /// True while the window is shown.
    pub fn is_shown(&self) -> bool {
        self.shown.load(Ordering::Acquire)
    }

    /// Number of redraw requests.
    pub fn redraws(&self) -> usize {
        self.redraws.load(Ordering::Acquire)
    }

    /// Last requested minimum size.
    pub fn minimum_size(&self) -> (u32, u32) {
        (self.min_width.load(Ordering::Acquire), self.min_height.load(Ordering::Acquire))
    }

    /// Simulate the user closing the window.
    pub fn request_close(&self) {
        self.close_requested.store(true, Ordering::Release);
    }
}

/// A window that only counts what is asked of it.
#[derive(Debug, Clone)]
pub struct HeadlessWindow {
    stats: Arc<WindowStats>,
}

impl HeadlessWindow {
    /// Window reporting into `stats`.
    pub fn new(stats: Arc<WindowStats>) -> Self {
        Self { stats }
    }
}

impl Window for HeadlessWindow {
    fn show(&mut self) {
        self.stats.shown.store(true, Ordering::Release);
    }

    fn hide(&mut self) {
        self.stats.shown.store(false, Ordering::Release);
    }

    fn set_minimum_size(&mut self, width: u32, height: u32) {
        self.stats.min_width.store(width, Ordering::Release);
        self.stats.min_height.store(height, Ordering::Release);
    }

    fn redraw(&mut self) {
        self.stats.redraws.fetch_add(1, Ordering::AcqRel);
    }

    fn process_events(&mut self) -> bool {
        !self.stats.close_requested.load(Ordering::Acquire)
    }
}

pub(crate) fn cell_size(config: &GridConfig) -> Size {
    Size::new(config.plot_width as f32, config.plot_height as f32)
}

/// Backend whose plots draw into [`RecordingSurface`]s.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    stats: Arc<WindowStats>,
}

impl HeadlessBackend {
    /// New backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stats of the window this backend creates.
    #[must_use]
    pub fn stats(&self) -> Arc<WindowStats> {
        Arc::clone(&self.stats)
    }
}

impl Backend for HeadlessBackend {
    type Surface = RecordingSurface;
    type Window = HeadlessWindow;
    type Layout = GridLayout;

    fn create_window(&mut self, _config: &GridConfig) -> HeadlessWindow {
        HeadlessWindow::new(self.stats())
    }

    fn create_layout(&mut self, config: &GridConfig) -> GridLayout {
        GridLayout::new(cell_size(config))
    }

    fn make_surface(&mut self, index: usize, config: &GridConfig) -> Result<RecordingSurface> {
        debug!(index, "recording surface");
        let cell = cell_size(config);
        let geometry = Rect::from_origin_size(Point::ORIGIN, cell);
        Ok(RecordingSurface::with_geometry(geometry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::DrawingSurface;

    #[test]
    fn test_headless_window_stats() {
        let stats = Arc::new(WindowStats::default());
        let mut window = HeadlessWindow::new(Arc::clone(&stats));
        window.show();
        window.set_minimum_size(10, 20);
        window.redraw();
        window.redraw();
        assert!(stats.is_shown());
        assert_eq!(stats.minimum_size(), (10, 20));
        assert_eq!(stats.redraws(), 2);
        window.hide();
        assert!(!stats.is_shown());
    }

    #[test]
    fn test_surface_sized_from_config() {
        let config = GridConfig::default();
        let surface = HeadlessBackend::new().make_surface(0, &config).unwrap();
        assert_eq!(surface.geometry().size(), Size::new(655.0, 450.0));
    }
}
