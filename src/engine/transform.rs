//! Affine mapping between data space and pixel space.
//!
//! One [`Transform`] is built per draw pass from the plot rectangle and the
//! active axis ranges, so mapping a point costs two multiply-adds.

use crate::geometry::{Point, Rect};

/// Make a range usable as a scale domain.
///
/// A zero-width range (all buffered values equal) becomes a unit-wide range
/// centred on the value.
#[must_use]
pub fn widen_degenerate(range: (f32, f32)) -> (f32, f32) {
    let (min, max) = range;
    if (max - min).abs() < f32::EPSILON {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    }
}

/// Cached data-to-pixel map of one plot.
///
/// `x` grows to the right from `x_range.0`; `y` is flipped so that
/// `y_range.1` lands on the top edge of the plot rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    plot: Rect,
    x_range: (f32, f32),
    y_range: (f32, f32),
    scale_x: f32,
    scale_y: f32,
}

impl Transform {
    /// Build the map for `plot` showing `x_range` × `y_range`.
    ///
    /// Returns `None` if the plot rectangle has no area or a range is not
    /// finite. Zero-width ranges are widened by [`widen_degenerate`].
    #[must_use]
    pub fn new(plot: Rect, x_range: (f32, f32), y_range: (f32, f32)) -> Option<Self> {
        if plot.size().is_empty() {
            return None;
        }
        let finite = |r: (f32, f32)| r.0.is_finite() && r.1.is_finite();
        if !finite(x_range) || !finite(y_range) {
            return None;
        }
        let x_range = widen_degenerate(x_range);
        let y_range = widen_degenerate(y_range);

        Some(Self {
            plot,
            x_range,
            y_range,
            scale_x: plot.width / (x_range.1 - x_range.0),
            scale_y: plot.height / (y_range.0 - y_range.1),
        })
    }

    /// Plot rectangle in pixel space.
    #[must_use]
    pub fn plot_rect(&self) -> Rect {
        self.plot
    }

    /// X range the map was built for.
    #[must_use]
    pub fn x_range(&self) -> (f32, f32) {
        self.x_range
    }

    /// Y range the map was built for.
    #[must_use]
    pub fn y_range(&self) -> (f32, f32) {
        self.y_range
    }

    /// Map a data point to pixel space.
    #[must_use]
    pub fn to_pixel(&self, point: Point) -> Point {
        Point::new(
            self.plot.x + self.scale_x * (point.x - self.x_range.0),
            self.plot.y + self.scale_y * (point.y - self.y_range.1),
        )
    }

    /// Map a pixel position back to data space.
    #[must_use]
    pub fn to_data(&self, pixel: Point) -> Point {
        Point::new(
            self.x_range.0 + (pixel.x - self.plot.x) / self.scale_x,
            self.y_range.1 + (pixel.y - self.plot.y) / self.scale_y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit() -> Transform {
        let plot = Rect::new(90.0, 30.0, 500.0, 400.0);
        Transform::new(plot, (0.0, 10.0), (0.0, 10.0)).expect("non-empty plot")
    }

    #[test]
    fn test_corners() {
        let t = unit();
        assert_eq!(t.to_pixel(Point::new(0.0, 0.0)), Point::new(90.0, 430.0));
        assert_eq!(t.to_pixel(Point::new(10.0, 10.0)), Point::new(590.0, 30.0));
    }

    #[test]
    fn test_y_grows_upwards() {
        let t = unit();
        let low = t.to_pixel(Point::new(5.0, 1.0));
        let high = t.to_pixel(Point::new(5.0, 9.0));
        assert!(high.y < low.y);
    }

    #[test]
    fn test_inverse() {
        let t = unit();
        let p = t.to_data(Point::new(340.0, 230.0));
        assert_relative_eq!(p.x, 5.0);
        assert_relative_eq!(p.y, 5.0);
    }

    #[test]
    fn test_empty_plot_has_no_transform() {
        let flat = Rect::new(0.0, 0.0, 0.0, 100.0);
        let inverted = Rect::new(0.0, 0.0, 100.0, -5.0);
        for plot in [flat, inverted] {
            assert!(Transform::new(plot, (0.0, 1.0), (0.0, 1.0)).is_none());
        }
    }

    #[test]
    fn test_non_finite_range_rejected() {
        let plot = Rect::new(0.0, 0.0, 100.0, 100.0);
        let x_range = (f32::INFINITY, f32::NEG_INFINITY);
        assert!(Transform::new(plot, x_range, (0.0, 1.0)).is_none());
    }

    #[test]
    fn test_degenerate_range_widened() {
        assert_eq!(widen_degenerate((3.0, 3.0)), (2.5, 3.5));
        assert_eq!(widen_degenerate((1.0, 2.0)), (1.0, 2.0));

        let t = Transform::new(Rect::new(0.0, 0.0, 100.0, 100.0), (3.0, 3.0), (0.0, 1.0))
            .expect("widened range");
        assert_relative_eq!(t.to_pixel(Point::new(3.0, 0.0)).x, 50.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// Mapping to pixels and back returns the same data point.
        #[test]
        fn prop_roundtrip(
            x0 in -1000.0f32..1000.0,
            xs in 0.1f32..1000.0,
            y0 in -1000.0f32..1000.0,
            ys in 0.1f32..1000.0,
            tx in 0.0f32..1.0,
            ty in 0.0f32..1.0,
            w in 10.0f32..2000.0,
            h in 10.0f32..2000.0,
        ) {
            let t = Transform::new(Rect::new(90.0, 30.0, w, h), (x0, x0 + xs), (y0, y0 + ys))
                .expect("valid transform");
            let p = Point::new(x0 + tx * xs, y0 + ty * ys);
            let back = t.to_data(t.to_pixel(p));
            let tol_x = 1e-3 * (xs + x0.abs() + 1.0);
            let tol_y = 1e-3 * (ys + y0.abs() + 1.0);
            prop_assert!((back.x - p.x).abs() <= tol_x, "x {} vs {}", back.x, p.x);
            prop_assert!((back.y - p.y).abs() <= tol_y, "y {} vs {}", back.y, p.y);
        }
    }
}
