//! Built-in gesture recognizers.

mod double_tap;
#[cfg(test)]
mod fixtures;
mod long_tap;
mod pinch;
mod rotate;
mod swipe;
mod tap;
mod two_contact;

pub use double_tap::DoubleTap;
pub use long_tap::LongTap;
pub use pinch::{Pinch, Spread};
pub use rotate::{Rotate, Turn};
pub use swipe::Swipe;
pub use tap::Tap;
pub use two_contact::{ContactMeasure, TwoContact};
