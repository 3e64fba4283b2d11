//! The draw sequence: one frame of a plot as calls on a [`DrawingSurface`].
//!
//! Order of a frame: label panel (if visible), axis titles, axis lines,
//! ticks with their gridlines and values, clipped curves, cursor readout.
//! Every stroke is bracketed by `start_line` / `end_line` and timed.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::color::Color;
use crate::config::PlotConfig;
use crate::data::{CurveBuffer, CurveId};
use crate::engine::transform::{widen_degenerate, Transform};
use crate::geometry::{Point, Rect, Size};
use crate::surface::{DrawingSurface, LineStyle};
use crate::timer::RunningAverage;

/// Ticks per subdivision; every last one is a major tick.
pub const TICKS_PER_SUBDIVISION: usize = 4;

const MINOR_TICK: f32 = 3.0;
const MAJOR_TICK: f32 = 6.0;

/// Everything a frame needs from the engine state, copied out of its lock.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub(crate) config: PlotConfig,
    pub(crate) x_label: String,
    pub(crate) y_label: String,
    pub(crate) plot_name: String,
    pub(crate) x_range: (f32, f32),
    pub(crate) y_range: (f32, f32),
    pub(crate) labels_visible: bool,
    pub(crate) cursor: Option<Point>,
}

/// What a frame produced, merged back into the engine afterwards.
#[derive(Debug, Default)]
pub(crate) struct FrameStats {
    pub(crate) transform: Option<Transform>,
    pub(crate) label_width: f32,
    pub(crate) redraw: Duration,
    pub(crate) draw_line: RunningAverage,
    pub(crate) end_line: RunningAverage,
}

/// Palette entry for the `index`-th drawn curve.
pub(crate) fn palette_color(palette: &[Color], index: usize) -> Color {
    if palette.is_empty() {
        Color::Black
    } else {
        palette[index % palette.len()]
    }
}

/// Plot rectangle inside the widget, after margins and the label panel.
pub(crate) fn plot_rect(widget: Rect, config: &PlotConfig, label_width: f32) -> Rect {
    let m = &config.margins;
    Rect::new(
        widget.x + m.left,
        widget.y + m.top,
        widget.width - m.left - m.right - label_width,
        widget.height - m.top - m.bottom,
    )
}

/// Surface wrapper that times strokes.
struct Painter<'a, S: ?Sized> {
    surface: &'a mut S,
    draw_line: RunningAverage,
    end_line: RunningAverage,
}

impl<'a, S: DrawingSurface + ?Sized> Painter<'a, S> {
    fn new(surface: &'a mut S) -> Self {
        Self {
            surface,
            draw_line: RunningAverage::new(),
            end_line: RunningAverage::new(),
        }
    }

    fn segment(&mut self, start: Point, end: Point) {
        let t = Instant::now();
        self.surface.draw_line_segment(start, end);
        self.draw_line.record_since(t);
    }

    fn end(&mut self) {
        let t = Instant::now();
        self.surface.end_line();
        self.end_line.record_since(t);
    }

    /// A single-segment line batch.
    fn stroke(&mut self, start: Point, end: Point) {
        self.surface.start_line();
        self.segment(start, end);
        self.end();
    }

    /// Dotted gray gridline, color and style restored afterwards.
    fn gridline(&mut self, start: Point, end: Point) {
        self.surface.save_color();
        self.surface.set_color(Color::Gray);
        self.surface.set_line_style(LineStyle::Dotted);
        self.stroke(start, end);
        self.surface.restore_color();
        self.surface.set_line_style(LineStyle::Solid);
    }
}

/// Widest curve label plus padding, 0 when every label is empty.
fn label_panel_width<S: DrawingSurface + ?Sized>(
    curves: &BTreeMap<CurveId, CurveBuffer>,
    config: &PlotConfig,
    surface: &mut S,
) -> f32 {
    let widest = curves
        .values()
        .map(|curve| surface.measure_text(&curve.label()).width)
        .fold(0.0_f32, f32::max);
    if widest > 0.0 {
        widest + config.label_padding
    } else {
        0.0
    }
}

fn draw_labels<S: DrawingSurface + ?Sized>(
    painter: &mut Painter<'_, S>,
    curves: &BTreeMap<CurveId, CurveBuffer>,
    frame: &Frame,
    widget: Rect,
    plot: Rect,
    label_width: f32,
) {
    let config = &frame.config;
    let row = config.label_row_height;
    let x = plot.right() + 10.0;

    let panel = Size::new(label_width, widget.height);
    painter.surface.push_clip(Point::new(x, widget.y), panel);
    painter.surface.save_color();

    // Swatches use the color the curve gets when drawn.
    let mut color_index = 0;
    for (entry, curve) in curves.values().enumerate() {
        let (label, len) = {
            let data = curve.read();
            (data.label().to_owned(), data.len())
        };
        let y = plot.y + entry as f32 * row;

        painter.surface.set_color(Color::Black);
        let text_at = Point::new(x + config.swatch_length + 10.0, y + row / 2.0);
        painter.surface.draw_text(&label, text_at, 0);

        let color = palette_color(&config.palette, color_index);
        painter.surface.set_color(color);
        painter.stroke(
            Point::new(x, y + row / 4.0),
            Point::new(x + config.swatch_length, y + row / 4.0),
        );

        if len > 1 {
            color_index += 1;
        }
    }

    painter.surface.restore_color();
    painter.surface.pop_clip();
}

fn draw_x_tick_value<S: DrawingSurface + ?Sized>(surface: &mut S, value: f32, at: Point) {
    let text = format!("{value:.2}");
    let size = surface.measure_text(&text);
    let position = Point::new(at.x - size.width / 2.0, at.y + size.height);
    surface.draw_text(&text, position, 0);
}

fn draw_y_tick_value<S: DrawingSurface + ?Sized>(surface: &mut S, value: f32, at: Point) {
    let text = format!("{value:.2}");
    let size = surface.measure_text(&text);
    let position = Point::new(at.x - size.width - 5.0, at.y + size.height / 2.0 - 2.0);
    surface.draw_text(&text, position, 0);
}

/// Axes, titles and ticks. Tick values follow `x_range` and `y_range`, the
/// ranges the curves are mapped with.
fn draw_axes<S: DrawingSurface + ?Sized>(
    painter: &mut Painter<'_, S>,
    frame: &Frame,
    widget: Rect,
    plot: Rect,
    x_range: (f32, f32),
    y_range: (f32, f32),
) {
    let surface = &mut *painter.surface;
    surface.set_color(Color::Black);

    let size = surface.measure_text(&frame.y_label);
    let x = widget.x + 10.0 + size.height / 2.0;
    let y = plot.y + (plot.height + size.width) / 2.0;
    surface.draw_text(&frame.y_label, Point::new(x, y), 90);

    let size = surface.measure_text(&frame.x_label);
    let x = plot.x + (plot.width - size.width) / 2.0;
    surface.draw_text(&frame.x_label, Point::new(x, plot.bottom() + 40.0), 0);

    let size = surface.measure_text(&frame.plot_name);
    let x = plot.x + (plot.width - size.width) / 2.0;
    let y = plot.y - size.height / 2.0;
    surface.draw_text(&frame.plot_name, Point::new(x, y), 0);

    let origin = Point::new(plot.x, plot.bottom());
    painter.stroke(plot.origin(), origin);
    painter.stroke(origin, Point::new(plot.right(), plot.bottom()));

    let ticks = TICKS_PER_SUBDIVISION * frame.config.subdivisions.max(1);
    let x_step = plot.width / ticks as f32;
    let y_step = plot.height / ticks as f32;
    let x_value_step = (x_range.1 - x_range.0) / ticks as f32;
    let y_value_step = (y_range.1 - y_range.0) / ticks as f32;

    for i in 1..=ticks {
        let major = i % TICKS_PER_SUBDIVISION == 0;
        let length = if major { MAJOR_TICK } else { MINOR_TICK };

        let x = plot.x + i as f32 * x_step;
        let base = Point::new(x, plot.bottom());
        if major {
            painter.gridline(Point::new(x, base.y - MAJOR_TICK), Point::new(x, plot.y));
            draw_x_tick_value(painter.surface, i as f32 * x_value_step + x_range.0, base);
        }
        painter.stroke(base, Point::new(x, base.y - length));

        let y = plot.bottom() - i as f32 * y_step;
        let base = Point::new(plot.x, y);
        if major {
            let end = Point::new(plot.right(), y);
            painter.gridline(Point::new(base.x + MAJOR_TICK, y), end);
            draw_y_tick_value(painter.surface, i as f32 * y_value_step + y_range.0, base);
        }
        painter.stroke(base, Point::new(base.x + length, y));
    }
}

fn draw_curves<S: DrawingSurface + ?Sized>(
    painter: &mut Painter<'_, S>,
    curves: &BTreeMap<CurveId, CurveBuffer>,
    palette: &[Color],
    transform: &Transform,
) {
    let mut color_index = 0;
    for curve in curves.values() {
        // Held for the whole curve so a producer cannot tear the polyline.
        let data = curve.read();
        if data.len() < 2 {
            continue;
        }
        let color = palette_color(palette, color_index);
        painter.surface.set_color(color);
        color_index += 1;

        painter.surface.start_line();
        let mut points = data.points().iter().map(|&p| transform.to_pixel(p));
        if let Some(mut prev) = points.next() {
            for curr in points {
                painter.segment(prev, curr);
                prev = curr;
            }
        }
        painter.end();
    }
}

/// Draw one frame of a plot.
pub(crate) fn draw_plot<S: DrawingSurface + ?Sized>(
    curves: &BTreeMap<CurveId, CurveBuffer>,
    frame: &Frame,
    surface: &mut S,
) -> FrameStats {
    let start = Instant::now();
    surface.save_color();

    let widget = surface.geometry();
    let label_width = if frame.labels_visible {
        label_panel_width(curves, &frame.config, surface)
    } else {
        0.0
    };
    let plot = plot_rect(widget, &frame.config, label_width);

    let mut painter = Painter::new(surface);

    if frame.labels_visible {
        draw_labels(&mut painter, curves, frame, widget, plot, label_width);
    }

    let transform = Transform::new(plot, frame.x_range, frame.y_range);
    let (x_range, y_range) = transform.as_ref().map_or_else(
        || (widen_degenerate(frame.x_range), widen_degenerate(frame.y_range)),
        |t| (t.x_range(), t.y_range()),
    );
    draw_axes(&mut painter, frame, widget, plot, x_range, y_range);

    painter.surface.push_clip(plot.origin(), plot.size());
    if let Some(transform) = &transform {
        draw_curves(&mut painter, curves, &frame.config.palette, transform);
    }
    painter.surface.pop_clip();

    if let (Some(cursor), Some(transform)) = (frame.cursor, &transform) {
        let p = transform.to_data(cursor);
        painter.surface.set_color(Color::Black);
        painter.surface.draw_text(
            &format!("{:.6}, {:.6}", p.x, p.y),
            Point::new(widget.x + 10.0, widget.bottom() - 10.0),
            0,
        );
    }

    let Painter {
        surface,
        draw_line,
        end_line,
    } = painter;
    surface.restore_color();

    FrameStats {
        transform,
        label_width,
        redraw: start.elapsed(),
        draw_line,
        end_line,
    }
}
