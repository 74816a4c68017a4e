//! Core types for the Gestura gesture engine.
//!
//! This crate provides the leaf types the engine is built from:
//! - Geometric primitives: [`Point`], [`Rect`]
//! - Raw input: [`RawEvent`], [`DeviceModel`], [`Phase`]
//! - Gesture math: angles, [`Direction`], velocity
//! - Scheduling: [`Scheduler`] and the deterministic [`ManualScheduler`]
//! - Errors: [`GestureError`]

pub mod clock;
mod error;
mod event;
mod geometry;
pub mod math;

pub use clock::{ManualScheduler, Millis, Scheduler, TimerId};
pub use error::{GestureError, Result};
pub use event::{
    parse_event_type, Contact, DeviceModel, Phase, PointerId, RawEvent, RawPhase, SurfaceId,
};
pub use geometry::{Point, Rect};
pub use math::Direction;
