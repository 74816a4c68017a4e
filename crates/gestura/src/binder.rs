//! User-facing callback set and option overrides for one recognizer.
//!
//! # Example
//!
//! ```
//! use gestura::Binder;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let taps = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&taps);
//! let binder = Binder::new()
//!     .touches(2)
//!     .on_end(move |_| counter.set(counter.get() + 1));
//! assert!(binder.has_callbacks());
//! ```

use crate::kind::GestureKind;
use crate::options::GestureOptions;
use crate::recognizer::RecognizerId;
use gestura_core::{Direction, GestureError, Millis, Phase, Point, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Callback invoked for one gesture phase.
pub type GestureCallback = Box<dyn FnMut(&GestureEvent<'_>)>;

/// Measurements of a swipe sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwipeData {
    /// Displacement from the swipe's start point.
    pub delta: Point,
    /// Displacement since the previous sample.
    pub step: Point,
    /// Speed since the previous sample, in px/ms.
    pub velocity: f32,
    /// Angle of the start-to-current vector in `[0, 360)`.
    pub angle: f32,
    /// Cardinal bucket of `angle`.
    pub direction: Direction,
    /// Percentage of the surface width (horizontal) or height (vertical) travelled.
    pub percentage: f32,
    /// True for samples synthesized by the momentum tail.
    pub momentum: bool,
}

/// Gesture-specific payload of an event.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum GestureData {
    /// No extra data.
    #[default]
    None,
    /// Long-tap progress.
    LongTap {
        /// Completion in `[0, 100]`.
        percent: f32,
    },
    /// Double-tap completion.
    DoubleTap {
        /// Milliseconds between the two taps.
        interval: Millis,
    },
    /// Swipe measurements.
    Swipe(SwipeData),
    /// Pinch measurements.
    Pinch {
        /// Current distance over baseline distance.
        scale: f32,
        /// Scale change since the previous sample.
        delta: f32,
    },
    /// Rotate measurements.
    Rotate {
        /// Degrees turned since the baseline, in `(-180, 180]`.
        rotation: f32,
        /// Degrees turned since the previous sample.
        delta: f32,
    },
}

/// Event handed to user callbacks.
#[derive(Debug, Clone, Copy)]
pub struct GestureEvent<'a> {
    /// Kind of the recognizer firing.
    pub kind: &'a GestureKind,
    /// Recognizer firing.
    pub id: RecognizerId,
    /// Phase being signalled.
    pub phase: Phase,
    /// Contacts in the origin target's coordinate space.
    pub points: &'a [Point],
    /// Contacts in page space.
    pub page_points: &'a [Point],
    /// Scheduler time of the event.
    pub timestamp: Millis,
    /// Gesture-specific payload.
    pub data: GestureData,
}

impl GestureEvent<'_> {
    /// Swipe payload, if this is a swipe event.
    #[must_use]
    pub const fn swipe(&self) -> Option<&SwipeData> {
        match &self.data {
            GestureData::Swipe(data) => Some(data),
            _ => None,
        }
    }
}

/// Start/update/end/cancel callbacks.
#[derive(Default)]
pub struct Callbacks {
    /// Gesture recognized.
    pub start: Option<GestureCallback>,
    /// Gesture progressed.
    pub update: Option<GestureCallback>,
    /// Gesture completed.
    pub end: Option<GestureCallback>,
    /// Gesture abandoned after signalling.
    pub cancel: Option<GestureCallback>,
}

impl Callbacks {
    fn slot(&mut self, phase: Phase) -> &mut Option<GestureCallback> {
        match phase {
            Phase::Start => &mut self.start,
            Phase::Update => &mut self.update,
            Phase::End => &mut self.end,
            Phase::Cancel => &mut self.cancel,
        }
    }

    fn count(&self) -> usize {
        [&self.start, &self.update, &self.end, &self.cancel]
            .iter()
            .filter(|c| c.is_some())
            .count()
    }
}

/// Callback set plus option overrides for one attachment.
#[derive(Default)]
pub struct Binder {
    callbacks: Callbacks,
    options: GestureOptions,
}

impl Binder {
    /// Create an empty binder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the start callback.
    #[must_use]
    pub fn on_start(mut self, f: impl FnMut(&GestureEvent<'_>) + 'static) -> Self {
        self.callbacks.start = Some(Box::new(f));
        self
    }

    /// Set the update callback.
    #[must_use]
    pub fn on_update(mut self, f: impl FnMut(&GestureEvent<'_>) + 'static) -> Self {
        self.callbacks.update = Some(Box::new(f));
        self
    }

    /// Set the end callback.
    #[must_use]
    pub fn on_end(mut self, f: impl FnMut(&GestureEvent<'_>) + 'static) -> Self {
        self.callbacks.end = Some(Box::new(f));
        self
    }

    /// Set the cancel callback.
    #[must_use]
    pub fn on_cancel(mut self, f: impl FnMut(&GestureEvent<'_>) + 'static) -> Self {
        self.callbacks.cancel = Some(Box::new(f));
        self
    }

    /// Replace all option overrides.
    #[must_use]
    pub fn options(mut self, options: GestureOptions) -> Self {
        self.options = options;
        self
    }

    /// Layer overrides decoded from a JSON object over the current ones.
    pub fn options_json(mut self, json: &str) -> Result<Self> {
        let decoded = GestureOptions::from_json(json)?;
        self.options = self.options.merged(&decoded);
        Ok(self)
    }

    /// Override the touch count.
    #[must_use]
    pub fn touches(mut self, touches: u32) -> Self {
        self.options.touches = Some(touches);
        self
    }

    /// Override the dispatch precedence.
    #[must_use]
    pub fn precedence(mut self, precedence: i32) -> Self {
        self.options.precedence = Some(precedence);
        self
    }

    /// Override default prevention.
    #[must_use]
    pub fn prevent_default(mut self, prevent: bool) -> Self {
        self.options.prevent_default = Some(prevent);
        self
    }

    /// Option overrides.
    #[must_use]
    pub fn overrides(&self) -> &GestureOptions {
        &self.options
    }

    /// Check if any callback is set.
    #[must_use]
    pub fn has_callbacks(&self) -> bool {
        self.callbacks.count() > 0
    }

    /// Fail with a configuration error when no callback is set.
    pub fn require_callbacks(&self, kind: &GestureKind) -> Result<()> {
        if self.has_callbacks() {
            Ok(())
        } else {
            Err(GestureError::MissingCallback {
                kind: kind.to_string(),
            })
        }
    }

    /// Invoke the callback for the event's phase, if any.
    pub fn emit(&mut self, event: &GestureEvent<'_>) {
        if let Some(callback) = self.callbacks.slot(event.phase) {
            callback(event);
        }
    }
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("callbacks", &self.callbacks.count())
            .field("options", &self.options)
            .finish()
    }
}
