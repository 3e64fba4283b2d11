//! Software [`DrawingSurface`] drawing into a [`Framebuffer`].
//!
//! Text is drawn as one solid block per visible character, which is enough
//! to see where labels land. [`RasterBackend`] gives every plot of a grid a
//! raster surface, and [`PlotGrid::snapshot`] composes them into one image of
//! the whole window.

use std::sync::Arc;

use batuta_common::display::WithDimensions;
use tracing::debug;

use crate::backend::headless::{cell_size, HeadlessWindow, WindowStats};
use crate::color::{Color, Rgba};
use crate::config::GridConfig;
use crate::error::Result;
use crate::geometry::{Point, Rect, Size};
use crate::grid::{window_size, Backend, GridLayout, PlotGrid};
use crate::render::{draw_line, fill_rect, Framebuffer, PixelRect};
use crate::surface::{DrawingSurface, LineStyle};

/// Horizontal advance of one character.
pub const GLYPH_ADVANCE: f32 = 7.0;
/// Width of the block drawn for one character.
pub const GLYPH_WIDTH: f32 = 5.0;
/// Height of the block drawn for one character, above the baseline.
pub const GLYPH_HEIGHT: f32 = 7.0;
/// Height reported by `measure_text`.
pub const LINE_HEIGHT: f32 = 12.0;

/// Raster backend for one plot widget.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    geometry: Rect,
    fb: Framebuffer,
    clips: Vec<PixelRect>,
    color: Color,
    color_stack: Vec<Color>,
    style: LineStyle,
    background: Rgba,
}

fn pixel_dims(size: Size) -> (u32, u32) {
    (size.width.round().max(1.0) as u32, size.height.round().max(1.0) as u32)
}

impl RasterSurface {
    /// Surface of `width × height` pixels at the window origin, white background.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let mut fb = Framebuffer::new(width, height)?;
        fb.clear(Rgba::WHITE);
        Ok(Self {
            geometry: Rect::new(0.0, 0.0, width as f32, height as f32),
            fb,
            clips: Vec::new(),
            color: Color::Black,
            color_stack: Vec::new(),
            style: LineStyle::Solid,
            background: Rgba::WHITE,
        })
    }

    /// Background used by [`DrawingSurface::begin_frame`].
    pub fn set_background(&mut self, background: Rgba) {
        self.background = background;
        self.fb.clear(background);
    }

    /// Current background.
    #[must_use]
    pub fn background(&self) -> Rgba {
        self.background
    }

    /// Pixels of the last frame.
    #[must_use]
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    fn clip(&self) -> PixelRect {
        let full = PixelRect::full(self.fb.width(), self.fb.height());
        self.clips.iter().fold(full, |acc, c| acc.intersect(c))
    }

    /// Window position to buffer pixel space.
    fn local(&self, p: Point) -> (f32, f32) {
        (p.x - self.geometry.x, p.y - self.geometry.y)
    }

    fn local_rect(&self, origin: Point, size: Size) -> PixelRect {
        PixelRect::from_rect(Rect::new(
            origin.x - self.geometry.x,
            origin.y - self.geometry.y,
            size.width,
            size.height,
        ))
    }

    fn resize_buffer(&mut self) {
        let (width, height) = pixel_dims(self.geometry.size());
        if (width, height) == (self.fb.width(), self.fb.height()) {
            return;
        }
        if let Ok(mut fb) = Framebuffer::new(width, height) {
            fb.clear(self.background);
            self.fb = fb;
        }
    }
}

impl WithDimensions for RasterSurface {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.set_size(Size::new(width as f32, height as f32));
    }
}

impl DrawingSurface for RasterSurface {
    fn width(&self) -> f32 {
        self.geometry.width
    }

    fn height(&self) -> f32 {
        self.geometry.height
    }

    fn x_position(&self) -> f32 {
        self.geometry.x
    }

    fn y_position(&self) -> f32 {
        self.geometry.y
    }

    fn set_size(&mut self, size: Size) {
        self.geometry.width = size.width;
        self.geometry.height = size.height;
        self.resize_buffer();
    }

    fn set_position(&mut self, position: Point) {
        self.geometry.x = position.x;
        self.geometry.y = position.y;
    }

    fn push_clip(&mut self, origin: Point, size: Size) {
        let rect = self.local_rect(origin, size);
        self.clips.push(rect);
    }

    fn pop_clip(&mut self) {
        self.clips.pop();
    }

    fn start_line(&mut self) {}

    fn draw_line_segment(&mut self, start: Point, end: Point) {
        let (start, end) = (self.local(start), self.local(end));
        let clip = self.clip();
        let dotted = self.style == LineStyle::Dotted;
        let color = self.color.to_rgba();
        draw_line(&mut self.fb, start, end, color, &clip, dotted);
    }

    fn end_line(&mut self) {}

    fn set_line_style(&mut self, style: LineStyle) {
        self.style = style;
    }

    fn draw_text(&mut self, text: &str, position: Point, angle: i32) {
        let clip = self.clip();
        let color = self.color.to_rgba();
        let (sin, cos) = (angle as f32).to_radians().sin_cos();
        let origin = Point::new(position.x - self.geometry.x, position.y - self.geometry.y);
        // Local frame: u along the text, v down from the baseline.
        let rotate = |u: f32, v: f32| {
            Point::new(origin.x + u * cos + v * sin, origin.y - u * sin + v * cos)
        };

        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let u0 = i as f32 * GLYPH_ADVANCE;
            let corners = [
                rotate(u0, -GLYPH_HEIGHT),
                rotate(u0 + GLYPH_WIDTH, -GLYPH_HEIGHT),
                rotate(u0, 0.0),
                rotate(u0 + GLYPH_WIDTH, 0.0),
            ];
            let empty = (
                Point::new(f32::INFINITY, f32::INFINITY),
                Point::new(f32::NEG_INFINITY, f32::NEG_INFINITY),
            );
            let (min, max) = corners.iter().fold(empty, |(min, max), p| {
                (
                    Point::new(min.x.min(p.x), min.y.min(p.y)),
                    Point::new(max.x.max(p.x), max.y.max(p.y)),
                )
            });
            let glyph = PixelRect {
                x0: min.x.round() as i32,
                y0: min.y.round() as i32,
                x1: max.x.round() as i32,
                y1: max.y.round() as i32,
            };
            fill_rect(&mut self.fb, &glyph, color, &clip);
        }
    }

    fn measure_text(&mut self, text: &str) -> Size {
        Size::new(text.chars().count() as f32 * GLYPH_ADVANCE, LINE_HEIGHT)
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn save_color(&mut self) {
        self.color_stack.push(self.color);
    }

    fn restore_color(&mut self) {
        if let Some(color) = self.color_stack.pop() {
            self.color = color;
        }
    }

    fn begin_frame(&mut self) {
        self.clips.clear();
        self.fb.clear(self.background);
    }
}

/// Paste every surface at its window position onto one `width × height` image.
///
/// # Errors
///
/// Returns an error if either dimension is zero.
pub fn compose<'a>(
    surfaces: impl IntoIterator<Item = &'a RasterSurface>,
    width: u32,
    height: u32,
    background: Rgba,
) -> Result<Framebuffer> {
    let mut out = Framebuffer::new(width, height)?;
    out.clear(background);
    for surface in surfaces {
        out.blit(
            surface.framebuffer(),
            surface.geometry.x.round() as i32,
            surface.geometry.y.round() as i32,
        );
    }
    Ok(out)
}

/// Backend whose plots render into [`RasterSurface`]s.
#[derive(Debug)]
pub struct RasterBackend {
    stats: Arc<WindowStats>,
    background: Rgba,
}

impl Default for RasterBackend {
    fn default() -> Self {
        Self {
            stats: Arc::default(),
            background: Rgba::WHITE,
        }
    }
}

impl RasterBackend {
    /// New backend with a white background.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Background of every plot and of the composed image.
    #[must_use]
    pub fn with_background(mut self, background: Rgba) -> Self {
        self.background = background;
        self
    }

    /// Stats of the window this backend creates.
    #[must_use]
    pub fn stats(&self) -> Arc<WindowStats> {
        Arc::clone(&self.stats)
    }
}

impl Backend for RasterBackend {
    type Surface = RasterSurface;
    type Window = HeadlessWindow;
    type Layout = GridLayout;

    fn create_window(&mut self, _config: &GridConfig) -> HeadlessWindow {
        HeadlessWindow::new(self.stats())
    }

    fn create_layout(&mut self, config: &GridConfig) -> GridLayout {
        GridLayout::new(cell_size(config))
    }

    fn make_surface(&mut self, index: usize, config: &GridConfig) -> Result<RasterSurface> {
        let (width, height) = (config.plot_width, config.plot_height);
        debug!(index, width, height, "raster surface");
        let mut surface = RasterSurface::new(width, height)?;
        surface.set_background(self.background);
        Ok(surface)
    }
}

impl PlotGrid<RasterBackend> {
    /// The whole grid as one image, each plot at its cell.
    ///
    /// Cells whose plot was never created stay background colored.
    ///
    /// # Errors
    ///
    /// Returns an error if the image would be empty.
    pub fn snapshot(&self) -> Result<Framebuffer> {
        let (rows, cols) = self.grid_size();
        let (width, height) = window_size(self.config(), rows, cols);
        self.with_plots(|plots| {
            let surfaces: Vec<_> = plots.iter().flatten().map(|plot| plot.surface()).collect();
            let background = surfaces.first().map_or(Rgba::WHITE, |s| s.background());
            compose(surfaces.iter().map(|s| &**s), width, height, background)
        })
    }
}
