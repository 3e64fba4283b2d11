//! A surface that records every call instead of drawing.
//!
//! Text metrics are fixed ([`RecordingSurface::CHAR_WIDTH`] per character,
//! [`RecordingSurface::LINE_HEIGHT`] high), which makes frames reproducible
//! in tests and benchmarks. `begin_frame` empties the log, so the surface
//! holds the calls of the latest frame only.

use batuta_common::display::WithDimensions;

use crate::color::Color;
use crate::geometry::{Point, Rect, Size};
use crate::surface::{DrawingSurface, LineStyle};

/// One recorded surface call.
///
/// Field names match the [`DrawingSurface`] parameters.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum DrawCommand {
    BeginFrame,
    EndFrame,
    PushClip { origin: Point, size: Size },
    PopClip,
    StartLine,
    LineSegment {
        start: Point,
        end: Point,
        color: Color,
        style: LineStyle,
    },
    EndLine,
    SetLineStyle(LineStyle),
    Text {
        text: String,
        position: Point,
        angle: i32,
        color: Color,
    },
    SetColor(Color),
    SaveColor,
    RestoreColor,
}

/// [`DrawingSurface`] that appends a [`DrawCommand`] per call.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    geometry: Rect,
    commands: Vec<DrawCommand>,
    color: Color,
    color_stack: Vec<Color>,
    style: LineStyle,
    clip_depth: usize,
    max_clip_depth: usize,
    open_line: bool,
    balanced: bool,
}

impl RecordingSurface {
    /// Advance of one character.
    pub const CHAR_WIDTH: f32 = 7.0;
    /// Height of one text line.
    pub const LINE_HEIGHT: f32 = 14.0;

    /// Surface of the given size at the origin.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_geometry(Rect::new(0.0, 0.0, width, height))
    }

    /// Surface covering `geometry`.
    #[must_use]
    pub fn with_geometry(geometry: Rect) -> Self {
        Self {
            geometry,
            commands: Vec::new(),
            color: Color::Black,
            color_stack: Vec::new(),
            style: LineStyle::Solid,
            clip_depth: 0,
            max_clip_depth: 0,
            open_line: false,
            balanced: true,
        }
    }

    /// Calls recorded so far.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded calls, leaving the log empty.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Forget the recorded calls and the balance checks.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.max_clip_depth = self.clip_depth;
        self.balanced = true;
    }

    /// Clips pushed and not yet popped.
    #[must_use]
    pub fn clip_depth(&self) -> usize {
        self.clip_depth
    }

    /// Deepest clip nesting seen since the last [`clear`](Self::clear).
    #[must_use]
    pub fn max_clip_depth(&self) -> usize {
        self.max_clip_depth
    }

    /// Colors saved and not yet restored.
    #[must_use]
    pub fn saved_colors(&self) -> usize {
        self.color_stack.len()
    }

    /// False if a pop, restore or line bracket was ever unmatched.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.balanced && self.clip_depth == 0 && self.color_stack.is_empty() && !self.open_line
    }

    /// Recorded line segments.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point, Color)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::LineSegment {
                start,
                end,
                color,
                ..
            } => Some((*start, *end, *color)),
            _ => None,
        })
    }

    /// Recorded texts.
    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl WithDimensions for RecordingSurface {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.set_size(Size::new(width as f32, height as f32));
    }
}

impl DrawingSurface for RecordingSurface {
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
    }

    fn set_position(&mut self, position: Point) {
        self.geometry.x = position.x;
        self.geometry.y = position.y;
    }

    fn push_clip(&mut self, origin: Point, size: Size) {
        self.clip_depth += 1;
        self.max_clip_depth = self.max_clip_depth.max(self.clip_depth);
        self.commands.push(DrawCommand::PushClip { origin, size });
    }

    fn pop_clip(&mut self) {
        match self.clip_depth.checked_sub(1) {
            Some(depth) => self.clip_depth = depth,
            None => self.balanced = false,
        }
        self.commands.push(DrawCommand::PopClip);
    }

    fn start_line(&mut self) {
        if self.open_line {
            self.balanced = false;
        }
        self.open_line = true;
        self.commands.push(DrawCommand::StartLine);
    }

    fn draw_line_segment(&mut self, start: Point, end: Point) {
        if !self.open_line {
            self.balanced = false;
        }
        self.commands.push(DrawCommand::LineSegment {
            start,
            end,
            color: self.color,
            style: self.style,
        });
    }

    fn end_line(&mut self) {
        if !self.open_line {
            self.balanced = false;
        }
        self.open_line = false;
        self.commands.push(DrawCommand::EndLine);
    }

    fn set_line_style(&mut self, style: LineStyle) {
        self.style = style;
        self.commands.push(DrawCommand::SetLineStyle(style));
    }

    fn draw_text(&mut self, text: &str, position: Point, angle: i32) {
        self.commands.push(DrawCommand::Text {
            text: text.to_owned(),
            position,
            angle,
            color: self.color,
        });
    }

    fn measure_text(&mut self, text: &str) -> Size {
        let width = text.chars().count() as f32 * Self::CHAR_WIDTH;
        Size::new(width, Self::LINE_HEIGHT)
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
        self.commands.push(DrawCommand::SetColor(color));
    }

    fn save_color(&mut self) {
        self.color_stack.push(self.color);
        self.commands.push(DrawCommand::SaveColor);
    }

    fn restore_color(&mut self) {
        match self.color_stack.pop() {
            Some(color) => self.color = color,
            None => self.balanced = false,
        }
        self.commands.push(DrawCommand::RestoreColor);
    }

    fn begin_frame(&mut self) {
        self.clear();
        self.commands.push(DrawCommand::BeginFrame);
    }

    fn end_frame(&mut self) {
        self.commands.push(DrawCommand::EndFrame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_text() {
        let mut surface = RecordingSurface::new(100.0, 100.0);
        assert_eq!(surface.measure_text("abc"), Size::new(21.0, 14.0));
        assert_eq!(surface.measure_text("").width, 0.0);
    }

    #[test]
    fn test_color_stack() {
        let mut surface = RecordingSurface::new(100.0, 100.0);
        surface.set_color(Color::Red);
        surface.save_color();
        surface.set_color(Color::Blue);
        surface.restore_color();
        surface.start_line();
        surface.draw_line_segment(Point::ORIGIN, Point::new(1.0, 1.0));
        surface.end_line();

        assert_eq!(surface.segments().next().map(|s| s.2), Some(Color::Red));
        assert!(surface.is_balanced());
    }

    #[test]
    fn test_unbalanced_calls_detected() {
        let mut surface = RecordingSurface::new(100.0, 100.0);
        surface.pop_clip();
        assert!(!surface.is_balanced());

        surface.clear();
        assert!(surface.is_balanced());
        surface.draw_line_segment(Point::ORIGIN, Point::ORIGIN);
        assert!(!surface.is_balanced());
    }

    #[test]
    fn test_geometry() {
        let mut surface = RecordingSurface::new(100.0, 50.0);
        surface.set_position(Point::new(10.0, 20.0));
        surface.set_size(Size::new(30.0, 40.0));
        assert_eq!(surface.geometry(), Rect::new(10.0, 20.0, 30.0, 40.0));

        surface.set_dimensions(655, 450);
        assert_eq!(surface.geometry(), Rect::new(10.0, 20.0, 655.0, 450.0));
    }
}
