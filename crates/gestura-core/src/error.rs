//! Error types for the gesture engine.
//!
//! Only integration mistakes are errors. A gesture that does not match its input is an ordinary
//! outcome and never surfaces here.

use crate::event::{DeviceModel, SurfaceId};
use thiserror::Error;

/// Result alias used across the engine.
pub type Result<T> = std::result::Result<T, GestureError>;

/// Configuration errors raised by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GestureError {
    /// No gesture kind is registered under this name.
    #[error("unknown gesture kind `{0}`")]
    UnknownKind(String),

    /// Raw event type name not understood by any device model.
    #[error("unrecognized input event type `{0}`")]
    UnknownEventType(String),

    /// Contact list does not fit the device model.
    #[error("malformed {model} event: {reason}")]
    MalformedEvent {
        /// Device model of the offending event.
        model: DeviceModel,
        /// What was wrong with it.
        reason: String,
    },

    /// Binder attached without any callback.
    #[error("binder for `{kind}` has no callbacks")]
    MissingCallback {
        /// Gesture kind being attached.
        kind: String,
    },

    /// Event delivered to a surface without attached gestures.
    #[error("{0} has no attached gestures")]
    UnknownSurface(SurfaceId),

    /// Option overrides could not be decoded.
    #[error("invalid gesture options: {0}")]
    InvalidOptions(String),
}
