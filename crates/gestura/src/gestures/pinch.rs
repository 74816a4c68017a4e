//! Pinch: the distance between two contacts changes by `pinchThreshold`.

use super::two_contact::{ContactMeasure, TwoContact};
use crate::binder::GestureData;
use crate::options::ResolvedOptions;
use gestura_core::Point;

/// Distance between the contacts.
#[derive(Debug, Clone, Copy)]
pub struct Spread;

fn scale(baseline: f32, current: f32) -> f32 {
    if baseline > 0.0 {
        current / baseline
    } else {
        1.0
    }
}

impl ContactMeasure for Spread {
    fn measure(a: &Point, b: &Point) -> f32 {
        a.distance(b)
    }

    fn reached(baseline: f32, current: f32, options: &ResolvedOptions) -> bool {
        (current - baseline).abs() >= options.pinch_threshold
    }

    fn data(baseline: f32, previous: f32, current: f32) -> GestureData {
        let now = scale(baseline, current);
        GestureData::Pinch {
            scale: now,
            delta: now - scale(baseline, previous),
        }
    }
}

/// Pinch recognizer.
pub type Pinch = TwoContact<Spread>;
