//! Angle, direction and velocity helpers shared by the gesture state machines.
//!
//! Angles are in degrees and use screen coordinates (y grows downward), so 0 points right,
//! 90 down, 180 left and 270 up.

use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cardinal direction of a swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Toward increasing x
    Right,
    /// Toward increasing y
    Down,
    /// Toward decreasing x
    Left,
    /// Toward decreasing y
    Up,
}

impl Direction {
    /// Bucket an angle into the cardinal whose 90° sector contains it.
    #[must_use]
    pub fn from_angle(degrees: f32) -> Self {
        let a = normalize_degrees(degrees);
        if !(45.0..315.0).contains(&a) {
            Self::Right
        } else if a < 135.0 {
            Self::Down
        } else if a < 225.0 {
            Self::Left
        } else {
            Self::Up
        }
    }

    /// Check if the direction runs along the x axis.
    #[must_use]
    pub const fn is_horizontal(&self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Check if the direction runs along the y axis.
    #[must_use]
    pub const fn is_vertical(&self) -> bool {
        !self.is_horizontal()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Right => "right",
            Self::Down => "down",
            Self::Left => "left",
            Self::Up => "up",
        };
        f.write_str(name)
    }
}

/// Wrap an angle into `[0, 360)`.
#[must_use]
pub fn normalize_degrees(degrees: f32) -> f32 {
    let a = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// Wrap an angle difference into `(-180, 180]`.
#[must_use]
pub fn wrap_delta_degrees(delta: f32) -> f32 {
    let a = normalize_degrees(delta);
    if a > 180.0 {
        a - 360.0
    } else {
        a
    }
}

/// Angle of the vector `from -> to`, in `[0, 360)`.
#[must_use]
pub fn angle_between(from: &Point, to: &Point) -> f32 {
    normalize_degrees((to.y - from.y).atan2(to.x - from.x).to_degrees())
}

/// Distance travelled per millisecond. Zero when no time elapsed.
#[must_use]
pub fn velocity(distance: f32, elapsed_ms: u64) -> f32 {
    if elapsed_ms == 0 {
        0.0
    } else {
        distance / elapsed_ms as f32
    }
}

/// Per-axis velocity of a displacement, in px/ms. Zero when no time elapsed.
#[must_use]
pub fn velocity_vector(step: Point, elapsed_ms: u64) -> Point {
    if elapsed_ms == 0 {
        Point::ORIGIN
    } else {
        step * (1.0 / elapsed_ms as f32)
    }
}

/// Percentage of `extent` covered by `distance`. Zero for an empty extent.
#[must_use]
pub fn percentage(distance: f32, extent: f32) -> f32 {
    if extent <= 0.0 {
        0.0
    } else {
        distance.abs() / extent * 100.0
    }
}

/// Raise a touch high-water mark with the contacts seen in this sample.
#[must_use]
pub fn high_water(previous: usize, observed: usize) -> usize {
    previous.max(observed)
}

/// Check a touch count against an allowed maximum. `allowed == 0` means unlimited.
#[must_use]
pub const fn exceeds_touches(count: usize, allowed: u32) -> bool {
    allowed != 0 && count > allowed as usize
}

/// Check a touch count against an exact requirement. `required == 0` accepts any count.
#[must_use]
pub const fn matches_touches(count: usize, required: u32) -> bool {
    required == 0 || count == required as usize
}

/// Number of whole `interval` steps needed to cover `duration`, rounding up, at least one.
#[must_use]
pub fn step_count(duration_ms: u64, interval_ms: u64) -> u32 {
    let interval = interval_ms.max(1);
    let steps = duration_ms.div_ceil(interval).max(1);
    u32::try_from(steps).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_angle_between_cardinals() {
        let o = Point::ORIGIN;
        assert!((angle_between(&o, &Point::new(10.0, 0.0)) - 0.0).abs() < 1e-4);
        assert!((angle_between(&o, &Point::new(0.0, 10.0)) - 90.0).abs() < 1e-4);
        assert!((angle_between(&o, &Point::new(-10.0, 0.0)) - 180.0).abs() < 1e-4);
        assert!((angle_between(&o, &Point::new(0.0, -10.0)) - 270.0).abs() < 1e-4);
    }

    #[test]
    fn test_direction_buckets() {
        assert_eq!(Direction::from_angle(0.0), Direction::Right);
        assert_eq!(Direction::from_angle(44.9), Direction::Right);
        assert_eq!(Direction::from_angle(45.0), Direction::Down);
        assert_eq!(Direction::from_angle(180.0), Direction::Left);
        assert_eq!(Direction::from_angle(270.0), Direction::Up);
        assert_eq!(Direction::from_angle(315.0), Direction::Right);
        assert_eq!(Direction::from_angle(-90.0), Direction::Up);
    }

    #[test]
    fn test_direction_axes() {
        assert!(Direction::Left.is_horizontal());
        assert!(Direction::Up.is_vertical());
        assert_eq!(Direction::Down.to_string(), "down");
    }

    #[test]
    fn test_wrap_delta() {
        assert_eq!(wrap_delta_degrees(350.0), -10.0);
        assert_eq!(wrap_delta_degrees(-350.0), 10.0);
        assert_eq!(wrap_delta_degrees(180.0), 180.0);
    }

    #[test]
    fn test_velocity_guards_zero_time() {
        assert_eq!(velocity(10.0, 0), 0.0);
        assert_eq!(velocity(10.0, 5), 2.0);
        assert_eq!(velocity_vector(Point::new(10.0, -5.0), 0), Point::ORIGIN);
        assert_eq!(
            velocity_vector(Point::new(10.0, -5.0), 5),
            Point::new(2.0, -1.0)
        );
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(80.0, 100.0), 80.0);
        assert_eq!(percentage(-40.0, 200.0), 20.0);
        assert_eq!(percentage(40.0, 0.0), 0.0);
    }

    #[test]
    fn test_touch_helpers() {
        assert_eq!(high_water(2, 1), 2);
        assert_eq!(high_water(1, 3), 3);
        assert!(exceeds_touches(2, 1));
        assert!(!exceeds_touches(5, 0));
        assert!(matches_touches(2, 2));
        assert!(!matches_touches(1, 2));
        assert!(matches_touches(7, 0));
    }

    #[test]
    fn test_step_count_rounds_up() {
        assert_eq!(step_count(1000, 100), 10);
        assert_eq!(step_count(1000, 300), 4);
        assert_eq!(step_count(10, 100), 1);
        assert_eq!(step_count(0, 100), 1);
        assert_eq!(step_count(5, 0), 5);
    }

    proptest! {
        #[test]
        fn prop_normalize_degrees_in_range(a in -10_000.0f32..10_000.0) {
            let n = normalize_degrees(a);
            prop_assert!((0.0..360.0).contains(&n));
        }

        #[test]
        fn prop_wrap_delta_in_range(a in -10_000.0f32..10_000.0) {
            let d = wrap_delta_degrees(a);
            prop_assert!(d > -180.0 - 1e-3 && d <= 180.0 + 1e-3);
        }

        #[test]
        fn prop_step_count_covers_duration(d in 0u64..100_000, i in 1u64..5_000) {
            let steps = u64::from(step_count(d, i));
            prop_assert!(steps * i >= d);
            prop_assert!(steps >= 1);
        }
    }
}
