//! The drawing contract a GUI backend implements for each plot widget.
//!
//! The plot engine never touches pixels. Every frame is expressed as an
//! ordered sequence of calls on a [`DrawingSurface`]: geometry queries, a
//! clip stack, bracketed line batches, text, and a color stack.

use crate::color::Color;
use crate::geometry::{Point, Rect, Size};

/// Stroke pattern for subsequent line segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    /// Continuous stroke.
    #[default]
    Solid,
    /// Dotted stroke, used for grid lines.
    Dotted,
}

/// Mouse events forwarded by the backend to a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEvent {
    /// The cursor entered the widget.
    Enter,
    /// The cursor left the widget.
    Leave,
    /// The cursor moved inside the widget.
    Move,
    /// Anything else; ignored.
    Unknown,
}

/// Primitive drawing operations of one plot widget.
///
/// Coordinates are in the backend's window space: the widget itself spans
/// `x_position()..x_position() + width()` horizontally.
pub trait DrawingSurface {
    /// Current width of the widget in pixels.
    fn width(&self) -> f32;

    /// Current height of the widget in pixels.
    fn height(&self) -> f32;

    /// X position of the widget's top-left corner.
    fn x_position(&self) -> f32;

    /// Y position of the widget's top-left corner.
    fn y_position(&self) -> f32;

    /// Resize the widget.
    fn set_size(&mut self, size: Size);

    /// Move the widget.
    fn set_position(&mut self, position: Point);

    /// Restrict drawing to a rectangle until the matching [`pop_clip`](Self::pop_clip).
    ///
    /// Clips nest: the effective region is the intersection of the stack.
    fn push_clip(&mut self, origin: Point, size: Size);

    /// Restore the clip region active before the last `push_clip`.
    fn pop_clip(&mut self);

    /// Open a line batch. Segments up to [`end_line`](Self::end_line) may be buffered.
    fn start_line(&mut self);

    /// Draw one segment with the current color and line style.
    fn draw_line_segment(&mut self, start: Point, end: Point);

    /// Close the current line batch.
    fn end_line(&mut self);

    /// Stroke pattern for the following segments.
    fn set_line_style(&mut self, style: LineStyle);

    /// Draw text anchored at `position`, rotated counter-clockwise by `angle` degrees.
    fn draw_text(&mut self, text: &str, position: Point, angle: i32);

    /// Pixel size `text` would occupy when drawn unrotated.
    fn measure_text(&mut self, text: &str) -> Size;

    /// Color for the following primitives.
    fn set_color(&mut self, color: Color);

    /// Push the current color.
    fn save_color(&mut self);

    /// Pop the last saved color and make it current.
    fn restore_color(&mut self);

    /// Called before a frame is drawn. Backends that keep pixels clear them here.
    fn begin_frame(&mut self) {}

    /// Called after a frame is drawn.
    fn end_frame(&mut self) {}

    /// Widget rectangle in window space.
    fn geometry(&self) -> Rect {
        Rect::new(
            self.x_position(),
            self.y_position(),
            self.width(),
            self.height(),
        )
    }
}
