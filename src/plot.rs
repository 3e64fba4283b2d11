//! One plot widget: an engine paired with the surface it draws on.

use parking_lot::{Mutex, MutexGuard};

use crate::engine::PlotEngine;
use crate::geometry::{Point, Size};
use crate::surface::{DrawingSurface, MouseEvent};

/// Side of the square label toggle button.
pub const TOGGLE_BUTTON_SIZE: f32 = 20.0;

/// Where and how a backend should draw the label toggle button.
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleButton {
    /// `"+"` while the label panel is hidden, `"-"` while it is shown.
    pub text: &'static str,
    /// Top-left corner in window coordinates.
    pub position: Point,
    /// Button size.
    pub size: Size,
}

/// A plot widget.
///
/// The engine is shared freely across threads; the surface is only touched
/// by refreshes and geometry changes, under its own lock.
#[derive(Debug)]
pub struct Plot<S> {
    engine: PlotEngine,
    surface: Mutex<S>,
}

impl<S: DrawingSurface> Plot<S> {
    /// Pair an engine with a surface.
    pub fn new(engine: PlotEngine, surface: S) -> Self {
        Self {
            engine,
            surface: Mutex::new(surface),
        }
    }

    /// The data and drawing engine.
    pub fn engine(&self) -> &PlotEngine {
        &self.engine
    }

    /// Redraw the widget.
    pub fn refresh(&self) {
        let mut surface = self.surface.lock();
        surface.begin_frame();
        self.engine.draw_plot(&mut *surface);
        surface.end_frame();
    }

    /// Resize the widget.
    pub fn set_size(&self, size: Size) {
        self.surface.lock().set_size(size);
    }

    /// Move the widget.
    pub fn set_position(&self, position: Point) {
        self.surface.lock().set_position(position);
    }

    /// Forward a mouse event from the backend.
    pub fn handle_mouse_event(&self, event: MouseEvent, position: Point) {
        self.engine.handle_mouse_event(event, position);
    }

    /// Text and geometry of the label toggle button.
    pub fn toggle_button(&self) -> ToggleButton {
        let geometry = self.surface.lock().geometry();
        let margin = self.engine.margins().right;
        let visible = self.engine.labels_visible();
        ToggleButton {
            text: if visible { "-" } else { "+" },
            position: Point::new(geometry.right() - margin + 10.0, geometry.y + 10.0),
            size: Size::new(TOGGLE_BUTTON_SIZE, TOGGLE_BUTTON_SIZE),
        }
    }

    /// The toggle button was clicked.
    pub fn on_toggle_button(&self) {
        self.engine.toggle_labels();
    }

    /// Lock the surface, e.g. to read back what was drawn.
    pub fn surface(&self) -> MutexGuard<'_, S> {
        self.surface.lock()
    }

    /// Run `f` on the locked surface.
    pub fn with_surface<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.surface.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::{DrawCommand, RecordingSurface};

    fn plot() -> Plot<RecordingSurface> {
        Plot::new(PlotEngine::new(), RecordingSurface::new(655.0, 450.0))
    }

    #[test]
    fn test_refresh_brackets_frame() {
        let plot = plot();
        plot.refresh();
        let surface = plot.surface();
        let commands = surface.commands();
        assert_eq!(commands.first(), Some(&DrawCommand::BeginFrame));
        assert_eq!(commands.last(), Some(&DrawCommand::EndFrame));
        assert!(surface.is_balanced());
    }

    #[test]
    fn test_toggle_button() {
        let plot = plot();
        plot.set_position(Point::new(655.0, 0.0));

        let button = plot.toggle_button();
        assert_eq!(button.text, "+");
        let right = 655.0 + 655.0;
        assert_eq!(button.position, Point::new(right - 40.0 + 10.0, 10.0));
        assert_eq!(button.size, Size::new(20.0, 20.0));

        plot.on_toggle_button();
        assert_eq!(plot.toggle_button().text, "-");
        assert!(plot.engine().labels_visible());
    }

    #[test]
    fn test_geometry_forwarded() {
        let plot = plot();
        plot.set_size(Size::new(300.0, 200.0));
        plot.with_surface(|s| {
            assert_eq!(s.width(), 300.0);
            assert_eq!(s.height(), 200.0);
        });
    }
}
