//! Bounded per-curve point buffer.

use std::collections::VecDeque;

use parking_lot::{Mutex, MutexGuard};

use crate::data::range::RangeTracker;
use crate::geometry::Point;

/// Caller-chosen curve identifier. Ids need not be contiguous.
pub type CurveId = i32;

/// Points and range statistics of one curve.
///
/// Only reachable through [`CurveBuffer::read`], so the trackers always
/// mirror the point sequence.
#[derive(Debug, Clone)]
pub struct CurveData {
    points: VecDeque<Point>,
    x_values: RangeTracker,
    y_values: RangeTracker,
    label: String,
    max_points: usize,
}

impl Default for CurveData {
    fn default() -> Self {
        Self {
            points: VecDeque::new(),
            x_values: RangeTracker::new(),
            y_values: RangeTracker::new(),
            label: String::new(),
            max_points: usize::MAX,
        }
    }
}

impl CurveData {
    /// Points from oldest to newest.
    #[must_use]
    pub fn points(&self) -> &VecDeque<Point> {
        &self.points
    }

    /// Number of buffered points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if no point is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Tracker of the buffered x coordinates.
    #[must_use]
    pub fn x_values(&self) -> &RangeTracker {
        &self.x_values
    }

    /// Tracker of the buffered y coordinates.
    #[must_use]
    pub fn y_values(&self) -> &RangeTracker {
        &self.y_values
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Capacity.
    #[must_use]
    pub fn max_points(&self) -> usize {
        self.max_points
    }

    fn pop_front(&mut self) -> Option<Point> {
        let point = self.points.pop_front()?;
        self.x_values.remove(point.x);
        self.y_values.remove(point.y);
        Some(point)
    }
}

/// A sliding window of the most recent points of one curve.
///
/// Every compound mutation (evict then append, or remove) happens under the
/// buffer's own lock, so a reader holding [`read`](Self::read) never sees the
/// range trackers out of step with the points.
#[derive(Debug, Default)]
pub struct CurveBuffer {
    data: Mutex<CurveData>,
}

impl CurveBuffer {
    /// Create an unbounded, unlabeled buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer holding at most `max_points` points.
    #[must_use]
    pub fn with_max_points(max_points: usize) -> Self {
        let buffer = Self::new();
        buffer.set_max_points(max_points);
        buffer
    }

    /// Append a point, evicting the oldest ones first if the buffer is full.
    ///
    /// Returns the number of evicted points.
    pub fn add_point(&self, point: Point) -> usize {
        let mut data = self.data.lock();
        let mut evicted = 0;
        while data.points.len() >= data.max_points && data.pop_front().is_some() {
            evicted += 1;
        }
        data.points.push_back(point);
        data.x_values.insert(point.x);
        data.y_values.insert(point.y);
        evicted
    }

    /// Remove and return the oldest point, `None` if the buffer is empty.
    pub fn remove_first_point(&self) -> Option<Point> {
        self.data.lock().pop_front()
    }

    /// Replace the display label.
    pub fn set_label(&self, label: impl Into<String>) {
        self.data.lock().label = label.into();
    }

    /// Current display label.
    #[must_use]
    pub fn label(&self) -> String {
        self.data.lock().label.clone()
    }

    /// Change the capacity. Values below 1 are raised to 1.
    ///
    /// A smaller capacity takes effect on the next insertion.
    pub fn set_max_points(&self, max_points: usize) {
        self.data.lock().max_points = max_points.max(1);
    }

    /// Current capacity.
    #[must_use]
    pub fn max_points(&self) -> usize {
        self.data.lock().max_points
    }

    /// Number of buffered points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    /// True if no point is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }

    /// `(min, max)` of the buffered x coordinates.
    #[must_use]
    pub fn x_extent(&self) -> Option<(f32, f32)> {
        self.data.lock().x_values.extent()
    }

    /// `(min, max)` of the buffered y coordinates.
    #[must_use]
    pub fn y_extent(&self) -> Option<(f32, f32)> {
        self.data.lock().y_values.extent()
    }

    /// Copy of the buffered points, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Point> {
        self.data.lock().points.iter().copied().collect()
    }

    /// Lock the buffer for reading. Writers block until the guard drops.
    pub fn read(&self) -> MutexGuard<'_, CurveData> {
        self.data.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_point_registers_trackers() {
        let buffer = CurveBuffer::new();
        buffer.add_point(Point::new(1.0, 2.0));

        let data = buffer.read();
        assert_eq!(data.len(), 1);
        assert_eq!(data.x_values().iter().collect::<Vec<_>>(), vec![1.0]);
        assert_eq!(data.y_values().iter().collect::<Vec<_>>(), vec![2.0]);
    }

    #[test]
    fn test_sliding_window_evicts_oldest() {
        let buffer = CurveBuffer::with_max_points(2);
        assert_eq!(buffer.add_point(Point::new(0.0, 0.0)), 0);
        assert_eq!(buffer.add_point(Point::new(1.0, 1.0)), 0);
        assert_eq!(buffer.add_point(Point::new(2.0, 2.0)), 1);

        assert_eq!(
            buffer.snapshot(),
            vec![Point::new(1.0, 1.0), Point::new(2.0, 2.0)]
        );
        let data = buffer.read();
        assert_eq!(data.x_values().iter().collect::<Vec<_>>(), vec![1.0, 2.0]);
        assert_eq!(data.y_values().iter().collect::<Vec<_>>(), vec![1.0, 2.0]);
        assert_eq!(data.x_values().count(0.0), 0);
    }

    #[test]
    fn test_remove_first_point() {
        let buffer = CurveBuffer::new();
        assert!(buffer.remove_first_point().is_none());

        buffer.add_point(Point::new(1.0, 5.0));
        buffer.add_point(Point::new(2.0, 3.0));
        assert_eq!(buffer.remove_first_point(), Some(Point::new(1.0, 5.0)));
        assert_eq!(buffer.y_extent(), Some((3.0, 3.0)));
        assert_eq!(buffer.x_extent(), Some((2.0, 2.0)));
    }

    #[test]
    fn test_shrinking_capacity_applies_on_next_insert() {
        let buffer = CurveBuffer::new();
        for i in 0..5 {
            buffer.add_point(Point::new(i as f32, 0.0));
        }
        buffer.set_max_points(2);
        assert_eq!(buffer.len(), 5);

        assert_eq!(buffer.add_point(Point::new(5.0, 0.0)), 4);
        assert_eq!(
            buffer.snapshot(),
            vec![Point::new(4.0, 0.0), Point::new(5.0, 0.0)]
        );
        assert_eq!(buffer.read().x_values().len(), 2);
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let buffer = CurveBuffer::with_max_points(0);
        assert_eq!(buffer.max_points(), 1);
        buffer.add_point(Point::new(1.0, 1.0));
        buffer.add_point(Point::new(2.0, 2.0));
        assert_eq!(buffer.snapshot(), vec![Point::new(2.0, 2.0)]);
    }

    #[test]
    fn test_label() {
        let buffer = CurveBuffer::new();
        assert_eq!(buffer.label(), "");
        buffer.set_label("current");
        assert_eq!(buffer.label(), "current");
        assert_eq!(buffer.read().label(), "current");
    }

    #[test]
    fn test_concurrent_writer_keeps_trackers_in_sync() {
        use std::sync::Arc;
        use std::thread;

        let buffer = Arc::new(CurveBuffer::with_max_points(64));
        let writer = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                for i in 0..5_000 {
                    buffer.add_point(Point::new(i as f32, -(i as f32)));
                }
            })
        };

        for _ in 0..500 {
            let data = buffer.read();
            assert_eq!(data.x_values().len(), data.len());
            assert_eq!(data.y_values().len(), data.len());
            if let (Some(first), Some(last)) = (data.points().front(), data.points().back()) {
                assert_eq!(data.x_values().min().unwrap(), first.x);
                assert_eq!(data.x_values().max().unwrap(), last.x);
            }
        }
        writer.join().unwrap();
        assert_eq!(buffer.len(), 64);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Add(i16, i16),
        Remove,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (any::<i16>(), any::<i16>()).prop_map(|(x, y)| Op::Add(x, y)),
            1 => Just(Op::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// The buffer is always the most recent suffix of the logical history,
        /// bounded by the capacity, with trackers mirroring it.
        #[test]
        fn prop_buffer_is_bounded_suffix(
            capacity in 1usize..32,
            ops in prop::collection::vec(op(), 0..300)
        ) {
            let buffer = CurveBuffer::with_max_points(capacity);
            let mut model: VecDeque<Point> = VecDeque::new();

            for op in ops {
                match op {
                    Op::Add(x, y) => {
                        let p = Point::new(f32::from(x), f32::from(y));
                        if model.len() == capacity {
                            model.pop_front();
                        }
                        model.push_back(p);
                        buffer.add_point(p);
                    }
                    Op::Remove => {
                        prop_assert_eq!(buffer.remove_first_point(), model.pop_front());
                    }
                }
                prop_assert!(buffer.len() <= capacity);
            }

            let data = buffer.read();
            prop_assert_eq!(data.points(), &model);

            let mut xs: Vec<f32> = model.iter().map(|p| p.x).collect();
            xs.sort_by(f32::total_cmp);
            prop_assert_eq!(data.x_values().iter().collect::<Vec<_>>(), xs);

            let mut ys: Vec<f32> = model.iter().map(|p| p.y).collect();
            ys.sort_by(f32::total_cmp);
            prop_assert_eq!(data.y_values().iter().collect::<Vec<_>>(), ys);
        }
    }
}
