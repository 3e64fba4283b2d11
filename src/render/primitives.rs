//! Rasterization of the few primitives the plot backend needs.

use crate::color::Rgba;
use crate::geometry::Rect;
use crate::render::Framebuffer;

/// Half-open integer pixel rectangle `[x0, x1) × [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    /// Left edge (inclusive).
    pub x0: i32,
    /// Top edge (inclusive).
    pub y0: i32,
    /// Right edge (exclusive).
    pub x1: i32,
    /// Bottom edge (exclusive).
    pub y1: i32,
}

impl PixelRect {
    /// Rectangle covering a whole `width × height` buffer.
    #[must_use]
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: width as i32,
            y1: height as i32,
        }
    }

    /// Pixels covered by `rect`, rounding edges outwards.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            x0: rect.x.floor() as i32,
            y0: rect.y.floor() as i32,
            x1: rect.right().ceil() as i32,
            y1: rect.bottom().ceil() as i32,
        }
    }

    /// Overlap of two rectangles, possibly empty.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }

    /// True if no pixel is covered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    /// True if the pixel lies inside.
    #[must_use]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= i64::from(self.x0)
            && x < i64::from(self.x1)
            && y >= i64::from(self.y0)
            && y < i64::from(self.y1)
    }
}

#[derive(Debug, Clone, Copy)]
enum Edge {
    X(f64),
    Y(f64),
}

/// Cut the segment `start..end` down to the pixel centers of `clip`
/// (Liang-Barsky).
///
/// A clipped endpoint is placed exactly on the edge it was cut at. Returns
/// `None` if nothing of the segment is left or an endpoint is not finite.
#[must_use]
pub fn clip_segment(
    start: (f32, f32),
    end: (f32, f32),
    clip: &PixelRect,
) -> Option<((f32, f32), (f32, f32))> {
    if clip.is_empty() {
        return None;
    }
    let (x0, y0) = (f64::from(start.0), f64::from(start.1));
    let (x1, y1) = (f64::from(end.0), f64::from(end.1));
    if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
        return None;
    }

    let (dx, dy) = (x1 - x0, y1 - y0);
    let (left, top) = (f64::from(clip.x0), f64::from(clip.y0));
    let (right, bottom) = (f64::from(clip.x1 - 1), f64::from(clip.y1 - 1));
    let edges = [
        (-dx, x0 - left, Edge::X(left)),
        (dx, right - x0, Edge::X(right)),
        (-dy, y0 - top, Edge::Y(top)),
        (dy, bottom - y0, Edge::Y(bottom)),
    ];

    let mut enter: (f64, Option<Edge>) = (0.0, None);
    let mut exit: (f64, Option<Edge>) = (1.0, None);
    for (p, q, edge) in edges {
        if p == 0.0 {
            // Parallel to this edge and outside it.
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > exit.0 {
                return None;
            }
            if r > enter.0 {
                enter = (r, Some(edge));
            }
        } else {
            if r < enter.0 {
                return None;
            }
            if r < exit.0 {
                exit = (r, Some(edge));
            }
        }
    }

    let point = |(t, edge): (f64, Option<Edge>), unclipped: (f32, f32)| match edge {
        None => unclipped,
        Some(Edge::X(x)) => (x as f32, (y0 + t * dy) as f32),
        Some(Edge::Y(y)) => ((x0 + t * dx) as f32, y as f32),
    };
    Some((point(enter, start), point(exit, end)))
}

/// Visit every pixel of the line from `(x0, y0)` to `(x1, y1)` (Bresenham).
///
/// `plot` receives the pixel and its step index along the line. The walk is
/// as long as the line, so callers clip first.
pub fn bresenham(
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
    mut plot: impl FnMut(i64, i64, usize),
) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;
    let mut step = 0;

    loop {
        plot(x, y, step);
        step += 1;

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Draw a solid or dotted line between two points in buffer pixel space,
/// restricted to `clip`.
///
/// Dotted lines set every other pixel.
pub fn draw_line(
    fb: &mut Framebuffer,
    start: (f32, f32),
    end: (f32, f32),
    color: Rgba,
    clip: &PixelRect,
    dotted: bool,
) {
    let clip = clip.intersect(&PixelRect::full(fb.width(), fb.height()));
    let Some((start, end)) = clip_segment(start, end, &clip) else {
        return;
    };
    let pixel = |p: (f32, f32)| (p.0.round() as i64, p.1.round() as i64);
    let ((x0, y0), (x1, y1)) = (pixel(start), pixel(end));

    bresenham(x0, y0, x1, y1, |x, y, step| {
        if (!dotted || step % 2 == 0) && clip.contains(x, y) {
            fb.set_pixel(x as u32, y as u32, color);
        }
    });
}

/// Fill the part of `rect` that lies inside `clip`.
pub fn fill_rect(fb: &mut Framebuffer, rect: &PixelRect, color: Rgba, clip: &PixelRect) {
    let full = PixelRect::full(fb.width(), fb.height());
    let area = rect.intersect(clip).intersect(&full);
    if area.is_empty() {
        return;
    }
    fb.fill_rect(
        area.x0 as u32,
        area.y0 as u32,
        (area.x1 - area.x0) as u32,
        (area.y1 - area.y0) as u32,
        color,
    );
}
