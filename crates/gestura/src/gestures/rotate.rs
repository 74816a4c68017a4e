//! Rotate: the line through two contacts turns by `rotationThreshold` degrees.

use super::two_contact::{ContactMeasure, TwoContact};
use crate::binder::GestureData;
use crate::options::ResolvedOptions;
use gestura_core::math::{angle_between, wrap_delta_degrees};
use gestura_core::Point;

/// Angle of the line from the first to the second contact.
#[derive(Debug, Clone, Copy)]
pub struct Turn;

impl ContactMeasure for Turn {
    fn measure(a: &Point, b: &Point) -> f32 {
        angle_between(a, b)
    }

    fn reached(baseline: f32, current: f32, options: &ResolvedOptions) -> bool {
        wrap_delta_degrees(current - baseline).abs() >= options.rotation_threshold
    }

    fn data(baseline: f32, previous: f32, current: f32) -> GestureData {
        GestureData::Rotate {
            rotation: wrap_delta_degrees(current - baseline),
            delta: wrap_delta_degrees(current - previous),
        }
    }
}

/// Rotate recognizer.
pub type Rotate = TwoContact<Turn>;
