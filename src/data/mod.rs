//! Curve storage: bounded point buffers and their range statistics.

pub mod curve;
pub mod range;

pub use curve::{CurveBuffer, CurveData, CurveId};
pub use range::RangeTracker;
