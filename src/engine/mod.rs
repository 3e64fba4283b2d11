//! Per-plot engine: curve storage, axis ranges and the draw sequence.
//!
//! A [`PlotEngine`] is shared between a producer (adding points from any
//! thread) and a renderer (calling [`PlotEngine::draw_plot`]). The curve map
//! sits behind a read-write lock: creating a new curve id takes the write
//! lock, everything else only reads the map and then locks the one curve it
//! touches.
//!
//! # Example
//!
//! ```
//! use rtplot::backend::RecordingSurface;
//! use rtplot::engine::PlotEngine;
//!
//! let engine = PlotEngine::new();
//! engine.set_auto_y_range();
//! for i in 0..10 {
//!     engine.add_point(0, i as f32, (i as f32).sin());
//! }
//!
//! let mut surface = RecordingSurface::new(655.0, 450.0);
//! engine.draw_plot(&mut surface);
//! assert!(engine.average_redraw_duration() > std::time::Duration::ZERO);
//! ```

pub mod draw;
pub mod transform;

use std::collections::BTreeMap;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::color::Color;
use crate::config::{Margins, PlotConfig};
use crate::data::{CurveBuffer, CurveData, CurveId};
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::surface::{DrawingSurface, MouseEvent};
use crate::timer::RunningAverage;

pub use transform::Transform;

use draw::Frame;

#[derive(Debug)]
struct EngineState {
    config: PlotConfig,
    x_label: String,
    y_label: String,
    plot_name: String,
    auto_x: bool,
    auto_y: bool,
    auto_x_range: Option<(f32, f32)>,
    auto_y_range: Option<(f32, f32)>,
    labels_visible: bool,
    label_width: f32,
    hovering: bool,
    cursor: Point,
    transform: Option<Transform>,
    redraw: RunningAverage,
    draw_line: RunningAverage,
    end_line: RunningAverage,
}

impl EngineState {
    fn new(config: PlotConfig) -> Self {
        Self {
            config,
            x_label: String::new(),
            y_label: String::new(),
            plot_name: String::new(),
            auto_x: false,
            auto_y: false,
            auto_x_range: None,
            auto_y_range: None,
            labels_visible: false,
            label_width: 0.0,
            hovering: false,
            cursor: Point::ORIGIN,
            transform: None,
            redraw: RunningAverage::new(),
            draw_line: RunningAverage::new(),
            end_line: RunningAverage::new(),
        }
    }

    /// Auto range while auto mode is on and data has been seen, else manual.
    fn x_range(&self) -> (f32, f32) {
        match (self.auto_x, self.auto_x_range) {
            (true, Some(range)) => range,
            _ => self.config.x_range,
        }
    }

    fn y_range(&self) -> (f32, f32) {
        match (self.auto_y, self.auto_y_range) {
            (true, Some(range)) => range,
            _ => self.config.y_range,
        }
    }

    fn frame(&self) -> Frame {
        Frame {
            config: self.config.clone(),
            x_label: self.x_label.clone(),
            y_label: self.y_label.clone(),
            plot_name: self.plot_name.clone(),
            x_range: self.x_range(),
            y_range: self.y_range(),
            labels_visible: self.labels_visible,
            cursor: self.hovering.then_some(self.cursor),
        }
    }
}

/// Overall `(min, max)` across curves, skipping empty ones.
fn union_extent(
    curves: &BTreeMap<CurveId, CurveBuffer>,
    extent: impl Fn(&CurveBuffer) -> Option<(f32, f32)>,
) -> Option<(f32, f32)> {
    curves
        .values()
        .filter_map(extent)
        .reduce(|a, b| (a.0.min(b.0), a.1.max(b.1)))
}

/// Data, ranges and drawing logic of one plot widget.
#[derive(Debug)]
pub struct PlotEngine {
    curves: RwLock<BTreeMap<CurveId, CurveBuffer>>,
    state: Mutex<EngineState>,
}

impl Default for PlotEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PlotEngine {
    /// Engine with the default [`PlotConfig`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(PlotConfig::default())
    }

    /// Engine with the given settings.
    #[must_use]
    pub fn with_config(config: PlotConfig) -> Self {
        Self {
            curves: RwLock::new(BTreeMap::new()),
            state: Mutex::new(EngineState::new(config)),
        }
    }

    /// Run `f` on the buffer of `curve`, creating it first if needed.
    fn with_curve<R>(&self, curve: CurveId, f: impl FnOnce(&CurveBuffer) -> R) -> R {
        {
            let curves = self.curves.read();
            if let Some(buffer) = curves.get(&curve) {
                return f(buffer);
            }
        }
        let mut curves = self.curves.write();
        f(curves.entry(curve).or_default())
    }

    /// Recompute the auto ranges from the buffered data.
    ///
    /// The state lock is held across the scan, so concurrent updates publish
    /// in the order they computed.
    fn update_auto_ranges(&self) {
        let mut state = self.state.lock();
        if !state.auto_x && !state.auto_y {
            return;
        }

        let curves = self.curves.read();
        if state.auto_x {
            if let Some(x) = union_extent(&curves, CurveBuffer::x_extent) {
                state.auto_x_range = Some(x);
            }
        }
        if state.auto_y {
            if let Some(y) = union_extent(&curves, CurveBuffer::y_extent) {
                state.auto_y_range = Some(y);
            }
        }
    }

    /// Append a point to `curve`, creating the curve on first use.
    ///
    /// Non-finite coordinates are logged and dropped.
    pub fn add_point(&self, curve: CurveId, x: f32, y: f32) {
        let point = Point::new(x, y);
        if !point.is_finite() {
            warn!(curve, x, y, "ignoring non-finite point");
            return;
        }
        self.with_curve(curve, |buffer| buffer.add_point(point));
        self.update_auto_ranges();
    }

    /// Drop the oldest point of `curve`.
    ///
    /// A missing or empty curve is logged and left alone.
    pub fn remove_first_point(&self, curve: CurveId) {
        let removed = {
            let curves = self.curves.read();
            let Some(buffer) = curves.get(&curve) else {
                warn!(curve, "curve doesn't exist, can't remove a point from it");
                return;
            };
            buffer.remove_first_point()
        };
        if removed.is_none() {
            debug!(curve, "curve is empty, nothing to remove");
            return;
        }
        self.update_auto_ranges();
    }

    /// Fix the x range and leave auto mode.
    pub fn set_x_range(&self, min: f32, max: f32) {
        let mut state = self.state.lock();
        state.config.x_range = (min, max);
        state.auto_x = false;
    }

    /// Fix the y range and leave auto mode.
    pub fn set_y_range(&self, min: f32, max: f32) {
        let mut state = self.state.lock();
        state.config.y_range = (min, max);
        state.auto_y = false;
    }

    /// Follow the extent of the buffered x values.
    pub fn set_auto_x_range(&self) {
        self.state.lock().auto_x = true;
        self.update_auto_ranges();
    }

    /// Follow the extent of the buffered y values.
    pub fn set_auto_y_range(&self) {
        self.state.lock().auto_y = true;
        self.update_auto_ranges();
    }

    /// True while the x axis follows the data.
    #[must_use]
    pub fn is_auto_x_range(&self) -> bool {
        self.state.lock().auto_x
    }

    /// True while the y axis follows the data.
    #[must_use]
    pub fn is_auto_y_range(&self) -> bool {
        self.state.lock().auto_y
    }

    /// Last computed auto x range; `None` until a point was seen in auto mode.
    #[must_use]
    pub fn auto_x_range(&self) -> Option<(f32, f32)> {
        self.state.lock().auto_x_range
    }

    /// Last computed auto y range; `None` until a point was seen in auto mode.
    #[must_use]
    pub fn auto_y_range(&self) -> Option<(f32, f32)> {
        self.state.lock().auto_y_range
    }

    /// X range the next frame will use.
    #[must_use]
    pub fn x_range(&self) -> (f32, f32) {
        self.state.lock().x_range()
    }

    /// Y range the next frame will use.
    #[must_use]
    pub fn y_range(&self) -> (f32, f32) {
        self.state.lock().y_range()
    }

    /// X axis title.
    pub fn set_x_label(&self, label: impl Into<String>) {
        self.state.lock().x_label = label.into();
    }

    /// Y axis title.
    pub fn set_y_label(&self, label: impl Into<String>) {
        self.state.lock().y_label = label.into();
    }

    /// Title drawn above the plot.
    pub fn set_plot_name(&self, name: impl Into<String>) {
        self.state.lock().plot_name = name.into();
    }

    /// Current x axis title.
    #[must_use]
    pub fn x_label(&self) -> String {
        self.state.lock().x_label.clone()
    }

    /// Current y axis title.
    #[must_use]
    pub fn y_label(&self) -> String {
        self.state.lock().y_label.clone()
    }

    /// Current plot title.
    #[must_use]
    pub fn plot_name(&self) -> String {
        self.state.lock().plot_name.clone()
    }

    /// Label shown for `curve` in the label panel. Creates the curve.
    pub fn set_curve_label(&self, curve: CurveId, label: impl Into<String>) {
        let label = label.into();
        self.with_curve(curve, |buffer| buffer.set_label(label));
    }

    /// Capacity of every existing curve.
    pub fn set_max_points(&self, count: usize) {
        for buffer in self.curves.read().values() {
            buffer.set_max_points(count);
        }
    }

    /// Capacity of one curve. Creates the curve.
    pub fn set_curve_max_points(&self, curve: CurveId, count: usize) {
        self.with_curve(curve, |buffer| buffer.set_max_points(count));
    }

    /// Number of major subdivisions per axis.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSubdivisions`] if `subdivisions` is zero.
    pub fn set_subdivisions(&self, subdivisions: usize) -> Result<()> {
        if subdivisions == 0 {
            return Err(Error::InvalidSubdivisions(subdivisions));
        }
        self.state.lock().config.subdivisions = subdivisions;
        Ok(())
    }

    /// Current number of major subdivisions.
    #[must_use]
    pub fn subdivisions(&self) -> usize {
        self.state.lock().config.subdivisions
    }

    /// Colors cycled over the drawn curves.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyPalette`] if `palette` is empty.
    pub fn set_color_palette(&self, palette: Vec<Color>) -> Result<()> {
        if palette.is_empty() {
            return Err(Error::EmptyPalette);
        }
        self.state.lock().config.palette = palette;
        Ok(())
    }

    /// Current palette.
    #[must_use]
    pub fn color_palette(&self) -> Vec<Color> {
        self.state.lock().config.palette.clone()
    }

    /// Margins around the plotting area.
    #[must_use]
    pub fn margins(&self) -> Margins {
        self.state.lock().config.margins
    }

    /// Show the label panel from the next frame on.
    pub fn show_labels(&self) {
        self.state.lock().labels_visible = true;
    }

    /// Hide the label panel from the next frame on.
    pub fn hide_labels(&self) {
        let mut state = self.state.lock();
        state.labels_visible = false;
        state.label_width = 0.0;
    }

    /// Flip label panel visibility.
    pub fn toggle_labels(&self) {
        let mut state = self.state.lock();
        state.labels_visible = !state.labels_visible;
        if !state.labels_visible {
            state.label_width = 0.0;
        }
    }

    /// True if the label panel is shown.
    #[must_use]
    pub fn labels_visible(&self) -> bool {
        self.state.lock().labels_visible
    }

    /// Width of the label panel in the last frame.
    #[must_use]
    pub fn label_panel_width(&self) -> f32 {
        self.state.lock().label_width
    }

    /// Track the cursor for the coordinate readout.
    pub fn handle_mouse_event(&self, event: MouseEvent, position: Point) {
        let mut state = self.state.lock();
        match event {
            MouseEvent::Enter => state.hovering = true,
            MouseEvent::Leave => state.hovering = false,
            MouseEvent::Move => state.cursor = position,
            MouseEvent::Unknown => {}
        }
    }

    /// Data coordinates under the cursor, mapped with the last drawn frame.
    ///
    /// `None` while the cursor is outside the widget or before the first frame.
    #[must_use]
    pub fn cursor_position(&self) -> Option<Point> {
        let state = self.state.lock();
        if !state.hovering {
            return None;
        }
        state.transform.map(|t| t.to_data(state.cursor))
    }

    /// Transform used by the last frame.
    #[must_use]
    pub fn last_transform(&self) -> Option<Transform> {
        self.state.lock().transform
    }

    /// Mean duration of a whole frame.
    #[must_use]
    pub fn average_redraw_duration(&self) -> Duration {
        self.state.lock().redraw.average()
    }

    /// Mean duration of one `draw_line_segment` call.
    #[must_use]
    pub fn average_draw_line_duration(&self) -> Duration {
        self.state.lock().draw_line.average()
    }

    /// Mean duration of one `end_line` call.
    #[must_use]
    pub fn average_end_line_duration(&self) -> Duration {
        self.state.lock().end_line.average()
    }

    /// Ids of every curve, ascending.
    #[must_use]
    pub fn curve_ids(&self) -> Vec<CurveId> {
        self.curves.read().keys().copied().collect()
    }

    /// Number of curves.
    #[must_use]
    pub fn curve_count(&self) -> usize {
        self.curves.read().len()
    }

    /// Run `f` on the locked data of `curve`, `None` if it does not exist.
    pub fn with_curve_data<R>(
        &self,
        curve: CurveId,
        f: impl FnOnce(&CurveData) -> R,
    ) -> Option<R> {
        let curves = self.curves.read();
        let buffer = curves.get(&curve)?;
        let data = buffer.read();
        Some(f(&data))
    }

    /// Copy of the points of `curve`, oldest first.
    #[must_use]
    pub fn curve_points(&self, curve: CurveId) -> Option<Vec<Point>> {
        self.with_curve_data(curve, |data| data.points().iter().copied().collect())
    }

    /// Draw one frame on `surface` and record its timings.
    pub fn draw_plot<S: DrawingSurface + ?Sized>(&self, surface: &mut S) {
        let frame = self.state.lock().frame();
        let stats = {
            let curves = self.curves.read();
            draw::draw_plot(&curves, &frame, surface)
        };

        let mut state = self.state.lock();
        state.transform = stats.transform;
        state.label_width = if state.labels_visible {
            stats.label_width
        } else {
            0.0
        };
        state.redraw.record(stats.redraw);
        state.draw_line.merge(&stats.draw_line);
        state.end_line.merge(&stats.end_line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::{DrawCommand, RecordingSurface};

    #[test]
    fn test_add_point_creates_curve() {
        let engine = PlotEngine::new();
        engine.add_point(7, 1.0, 2.0);

        assert_eq!(engine.curve_ids(), vec![7]);
        assert_eq!(engine.curve_points(7), Some(vec![Point::new(1.0, 2.0)]));
        let (xs, ys) = engine
            .with_curve_data(7, |d| {
                let xs: Vec<_> = d.x_values().iter().collect();
                let ys: Vec<_> = d.y_values().iter().collect();
                (xs, ys)
            })
            .expect("curve exists");
        assert_eq!(xs, vec![1.0]);
        assert_eq!(ys, vec![2.0]);
    }

    #[test]
    fn test_non_finite_point_dropped() {
        let engine = PlotEngine::new();
        engine.add_point(0, f32::NAN, 1.0);
        engine.add_point(0, 1.0, f32::INFINITY);
        assert_eq!(engine.curve_count(), 0);
    }

    #[test]
    fn test_remove_from_missing_curve_is_noop() {
        let engine = PlotEngine::new();
        engine.remove_first_point(3);
        assert_eq!(engine.curve_count(), 0);

        engine.set_curve_label(3, "empty");
        engine.remove_first_point(3);
        assert_eq!(engine.curve_points(3), Some(Vec::new()));
    }

    #[test]
    fn test_auto_range_spans_all_curves() {
        let engine = PlotEngine::new();
        engine.set_auto_x_range();
        engine.set_auto_y_range();
        assert_eq!(engine.auto_x_range(), None);
        assert_eq!(engine.x_range(), (0.0, 10.0));

        engine.add_point(0, 1.0, -4.0);
        engine.add_point(1, 5.0, 2.0);
        engine.add_point(2, -3.0, 8.0);

        assert_eq!(engine.x_range(), (-3.0, 5.0));
        assert_eq!(engine.y_range(), (-4.0, 8.0));
    }

    #[test]
    fn test_auto_range_follows_eviction() {
        let engine = PlotEngine::new();
        engine.set_auto_y_range();
        engine.set_curve_max_points(0, 2);
        engine.add_point(0, 0.0, 100.0);
        engine.add_point(0, 1.0, 1.0);
        engine.add_point(0, 2.0, 2.0);
        assert_eq!(engine.y_range(), (1.0, 2.0));

        engine.remove_first_point(0);
        assert_eq!(engine.y_range(), (2.0, 2.0));
    }

    #[test]
    fn test_auto_range_kept_when_data_drains() {
        let engine = PlotEngine::new();
        engine.set_auto_x_range();
        engine.add_point(0, 4.0, 0.0);
        engine.remove_first_point(0);
        assert_eq!(engine.auto_x_range(), Some((4.0, 4.0)));
    }

    #[test]
    fn test_concurrent_producers_leave_final_extent() {
        use std::sync::Arc;
        use std::thread;

        let engine = Arc::new(PlotEngine::new());
        engine.set_auto_x_range();
        engine.set_auto_y_range();
        let producers: Vec<_> = (0..4)
            .map(|t| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    for i in 0..1_000 {
                        let x = (t * 1_000 + i) as f32;
                        engine.add_point(t, x, -x);
                    }
                })
            })
            .collect();
        for p in producers {
            p.join().unwrap();
        }

        assert_eq!(engine.auto_x_range(), Some((0.0, 3_999.0)));
        assert_eq!(engine.auto_y_range(), Some((-3_999.0, 0.0)));
    }

    #[test]
    fn test_enabling_auto_range_uses_existing_data() {
        let engine = PlotEngine::new();
        engine.add_point(0, 2.0, 3.0);
        engine.add_point(0, 6.0, 9.0);
        assert_eq!(engine.auto_x_range(), None);

        engine.set_auto_x_range();
        assert_eq!(engine.x_range(), (2.0, 6.0));
    }

    #[test]
    fn test_manual_range_leaves_auto_mode() {
        let engine = PlotEngine::new();
        engine.set_auto_x_range();
        engine.add_point(0, 50.0, 0.0);
        engine.set_x_range(-1.0, 1.0);
        assert!(!engine.is_auto_x_range());
        assert_eq!(engine.x_range(), (-1.0, 1.0));
    }

    #[test]
    fn test_uniform_max_points() {
        let engine = PlotEngine::new();
        for i in 0..5 {
            engine.add_point(0, i as f32, 0.0);
            engine.add_point(1, i as f32, 0.0);
        }
        engine.set_max_points(3);
        engine.add_point(0, 5.0, 0.0);
        engine.add_point(1, 5.0, 0.0);
        assert_eq!(engine.curve_points(0).map(|p| p.len()), Some(3));
        assert_eq!(engine.curve_points(1).map(|p| p.len()), Some(3));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let engine = PlotEngine::new();
        let subdivisions = engine.set_subdivisions(0);
        assert!(matches!(subdivisions, Err(Error::InvalidSubdivisions(0))));
        let palette = engine.set_color_palette(Vec::new());
        assert!(matches!(palette, Err(Error::EmptyPalette)));
        assert_eq!(engine.subdivisions(), 6);
        assert_eq!(engine.color_palette().len(), 12);
    }

    #[test]
    fn test_toggle_labels() {
        let engine = PlotEngine::new();
        assert!(!engine.labels_visible());
        engine.toggle_labels();
        assert!(engine.labels_visible());
        engine.toggle_labels();
        assert!(!engine.labels_visible());
    }

    #[test]
    fn test_label_panel_width_measured_on_draw() {
        let engine = PlotEngine::new();
        engine.set_curve_label(0, "abcd");
        engine.set_curve_label(1, "ab");
        engine.show_labels();

        let mut surface = RecordingSurface::new(655.0, 450.0);
        engine.draw_plot(&mut surface);
        // 4 characters at the recording surface's fixed advance, plus padding.
        let expected = 4.0 * RecordingSurface::CHAR_WIDTH + 40.0;
        assert_eq!(engine.label_panel_width(), expected);

        engine.hide_labels();
        assert_eq!(engine.label_panel_width(), 0.0);
    }

    #[test]
    fn test_cursor_readout() {
        let engine = PlotEngine::new();
        let mut surface = RecordingSurface::new(655.0, 450.0);
        engine.draw_plot(&mut surface);
        assert_eq!(engine.cursor_position(), None);

        engine.handle_mouse_event(MouseEvent::Enter, Point::ORIGIN);
        // Plot area spans x 90..615 and y 30..390 for a 655x450 widget.
        engine.handle_mouse_event(MouseEvent::Move, Point::new(90.0, 390.0));
        let p = engine.cursor_position().expect("hovering after a frame");
        approx::assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-4);
        approx::assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-4);

        surface.clear();
        engine.draw_plot(&mut surface);
        assert!(surface.commands().iter().any(|c| matches!(
            c,
            DrawCommand::Text { text, .. } if text == "0.000000, 0.000000"
        )));

        engine.handle_mouse_event(MouseEvent::Leave, Point::ORIGIN);
        assert_eq!(engine.cursor_position(), None);
    }

    #[test]
    fn test_timers_recorded() {
        let engine = PlotEngine::new();
        assert_eq!(engine.average_redraw_duration(), Duration::ZERO);
        engine.add_point(0, 0.0, 0.0);
        engine.add_point(0, 1.0, 1.0);

        let mut surface = RecordingSurface::new(655.0, 450.0);
        engine.draw_plot(&mut surface);
        assert!(engine.average_redraw_duration() > Duration::ZERO);
        let x_range = engine.last_transform().map(|t| t.x_range());
        assert_eq!(x_range, Some((0.0, 10.0)));
    }

    #[test]
    fn test_concurrent_new_curves_while_drawing() {
        use std::sync::Arc;
        use std::thread;

        let engine = Arc::new(PlotEngine::new());
        let producers: Vec<_> = (0..4)
            .map(|t| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    for i in 0..500 {
                        engine.add_point(t * 1000 + i % 50, i as f32, t as f32);
                    }
                })
            })
            .collect();

        let mut surface = RecordingSurface::new(655.0, 450.0);
        for _ in 0..20 {
            surface.clear();
            engine.draw_plot(&mut surface);
            assert_eq!(surface.clip_depth(), 0);
        }
        for p in producers {
            p.join().unwrap();
        }
        assert_eq!(engine.curve_count(), 200);
    }
}
