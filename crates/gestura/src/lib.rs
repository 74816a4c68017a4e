//! Gesture recognition for mouse, touch and pen input.
//!
//! Gestura turns raw device samples delivered to a surface into tap, double-tap, long-tap,
//! swipe, pinch and rotate callbacks. Several recognizers on one surface compete through a
//! priority order and cancel or pause each other when one of them wins.
//!
//! # Example
//!
//! ```
//! use gestura::{Binder, GestureEngine, StaticLayout};
//! use gestura_core::{ManualScheduler, Point, RawEvent, RawPhase, Rect, SurfaceId};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let surface = SurfaceId::new(1);
//! let layout = StaticLayout::new().with_rect(surface, Rect::new(0.0, 0.0, 200.0, 200.0));
//! let engine = GestureEngine::new(Rc::new(layout), Rc::new(ManualScheduler::new()));
//!
//! let taps = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&taps);
//! engine
//!     .attach(surface, "tap", Binder::new().on_end(move |_| counter.set(counter.get() + 1)))
//!     .unwrap();
//!
//! let p = Point::new(50.0, 50.0);
//! engine.handle(surface, &RawEvent::mouse(RawPhase::Start, p)).unwrap();
//! engine.handle(surface, &RawEvent::mouse(RawPhase::End, p)).unwrap();
//! assert_eq!(taps.get(), 1);
//! ```

mod binder;
mod engine;
pub mod gestures;
mod kind;
mod options;
mod recognizer;
mod router;

pub use binder::{Binder, Callbacks, GestureCallback, GestureData, GestureEvent, SwipeData};
pub use engine::{DetachFilter, GestureEngine, StaticLayout, SurfaceHost};
pub use kind::{factory, GestureFactory, GestureKind, KindRegistry};
pub use options::{
    clamp_inertia, Buttons, GestureConfig, GestureOptions, ResolvedOptions,
    DEFAULT_DOUBLE_TAP_GRACE_MS, FRAME_INTERVAL_MS, MAX_INERTIA, MOMENTUM_MIN_STEP,
};
pub use recognizer::{
    Arbitration, GestureBase, InputSample, Pauser, PhaseContext, Recognizer, RecognizerId,
    RecognizerInit, RivalFilter, TimerHost, TimerTag, TouchMatch,
};
pub use router::{Dispatch, Router};
