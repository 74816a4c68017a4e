//! Gesture options: binder overrides, per-kind defaults and engine configuration.
//!
//! Resolution runs once when a recognizer is created: built-in defaults for the kind, then the
//! engine's [`GestureConfig`] defaults for the kind, then the binder's overrides. Options are
//! immutable afterwards; detach and attach again to change them.

use crate::kind::GestureKind;
use gestura_core::{GestureError, Millis, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Grace added to the double-tap window before the pending tap is released.
pub const DEFAULT_DOUBLE_TAP_GRACE_MS: Millis = 20;

/// Momentum frame interval (about 60fps).
pub const FRAME_INTERVAL_MS: Millis = 16;

/// Momentum stops once a frame moves less than this many pixels.
pub const MOMENTUM_MIN_STEP: f32 = 0.5;

/// Highest per-frame velocity retention; at 1.0 or above the momentum tail would never settle.
pub const MAX_INERTIA: f32 = 0.99;

/// Clamp an inertia into `[0, MAX_INERTIA]`. Non-finite values stop momentum at once.
#[must_use]
pub fn clamp_inertia(inertia: f32) -> f32 {
    if inertia.is_finite() {
        inertia.clamp(0.0, MAX_INERTIA)
    } else {
        0.0
    }
}

/// Mouse buttons a gesture accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Buttons {
    /// One button index.
    Single(u8),
    /// Any of these button indexes; an empty set accepts every button.
    Set(Vec<u8>),
}

impl Buttons {
    /// Check if a button index is accepted.
    #[must_use]
    pub fn allows(&self, button: u8) -> bool {
        match self {
            Self::Single(b) => *b == button,
            Self::Set(set) => set.is_empty() || set.contains(&button),
        }
    }
}

impl Default for Buttons {
    fn default() -> Self {
        Self::Single(0)
    }
}

/// Option overrides. Every key is optional; absent keys fall through to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GestureOptions {
    /// Required (tap) or maximum (others) number of contacts.
    pub touches: Option<u32>,
    /// Dispatch precedence; lower runs first.
    pub precedence: Option<i32>,
    /// Ask the transport to suppress platform default handling while started.
    pub prevent_default: Option<bool>,
    /// Pixels a tap may stray outside the surface rect (or a long-tap from its start point).
    pub area_threshold: Option<f32>,
    /// Pixels a swipe travels before it starts.
    pub radius_threshold: Option<f32>,
    /// Pixels the contact distance changes before a pinch starts.
    pub pinch_threshold: Option<f32>,
    /// Degrees the contacts turn before a rotate starts.
    pub rotation_threshold: Option<f32>,
    /// Milliseconds for long-tap duration or the double-tap window.
    pub time_threshold: Option<Millis>,
    /// Long-tap tick interval in milliseconds.
    pub interval: Option<Millis>,
    /// Accepted mouse buttons.
    pub which: Option<Buttons>,
    /// Continue a released swipe with decaying velocity.
    pub momentum: Option<bool>,
    /// Per-frame velocity retention of the momentum tail.
    pub inertia: Option<f32>,
}

impl GestureOptions {
    /// Decode overrides from a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| GestureError::InvalidOptions(e.to_string()))
    }

    /// Decode overrides from an already parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| GestureError::InvalidOptions(e.to_string()))
    }

    /// Layer `over` on top of `self`; keys present in `over` win.
    #[must_use]
    pub fn merged(&self, over: &Self) -> Self {
        Self {
            touches: over.touches.or(self.touches),
            precedence: over.precedence.or(self.precedence),
            prevent_default: over.prevent_default.or(self.prevent_default),
            area_threshold: over.area_threshold.or(self.area_threshold),
            radius_threshold: over.radius_threshold.or(self.radius_threshold),
            pinch_threshold: over.pinch_threshold.or(self.pinch_threshold),
            rotation_threshold: over.rotation_threshold.or(self.rotation_threshold),
            time_threshold: over.time_threshold.or(self.time_threshold),
            interval: over.interval.or(self.interval),
            which: over.which.clone().or_else(|| self.which.clone()),
            momentum: over.momentum.or(self.momentum),
            inertia: over.inertia.or(self.inertia),
        }
    }

    /// Fill every key from `defaults` unless overridden here.
    #[must_use]
    pub fn resolve(&self, defaults: &ResolvedOptions) -> ResolvedOptions {
        ResolvedOptions {
            touches: self.touches.unwrap_or(defaults.touches),
            precedence: self.precedence.unwrap_or(defaults.precedence),
            prevent_default: self.prevent_default.unwrap_or(defaults.prevent_default),
            area_threshold: self.area_threshold.unwrap_or(defaults.area_threshold),
            radius_threshold: self.radius_threshold.unwrap_or(defaults.radius_threshold),
            pinch_threshold: self.pinch_threshold.unwrap_or(defaults.pinch_threshold),
            rotation_threshold: self.rotation_threshold.unwrap_or(defaults.rotation_threshold),
            time_threshold: self.time_threshold.unwrap_or(defaults.time_threshold),
            interval: self.interval.unwrap_or(defaults.interval),
            which: self.which.clone().unwrap_or_else(|| defaults.which.clone()),
            momentum: self.momentum.unwrap_or(defaults.momentum),
            inertia: clamp_inertia(self.inertia.unwrap_or(defaults.inertia)),
        }
    }
}

/// Fully resolved options of one recognizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOptions {
    /// Required or maximum contacts; 0 disables touch-count gating.
    pub touches: u32,
    /// Dispatch precedence; lower runs first.
    pub precedence: i32,
    /// Suppress platform defaults while started.
    pub prevent_default: bool,
    /// Tap / long-tap area threshold in pixels.
    pub area_threshold: f32,
    /// Swipe start radius in pixels.
    pub radius_threshold: f32,
    /// Pinch start distance change in pixels.
    pub pinch_threshold: f32,
    /// Rotate start angle in degrees.
    pub rotation_threshold: f32,
    /// Long-tap duration or double-tap window in milliseconds.
    pub time_threshold: Millis,
    /// Long-tap tick interval in milliseconds.
    pub interval: Millis,
    /// Accepted mouse buttons.
    pub which: Buttons,
    /// Swipe momentum tail.
    pub momentum: bool,
    /// Momentum velocity retention per frame.
    pub inertia: f32,
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        Self {
            touches: 1,
            precedence: 100,
            prevent_default: false,
            area_threshold: 10.0,
            radius_threshold: 12.0,
            pinch_threshold: 12.0,
            rotation_threshold: 5.0,
            time_threshold: 300,
            interval: 100,
            which: Buttons::default(),
            momentum: false,
            inertia: 0.95,
        }
    }
}

impl ResolvedOptions {
    /// Built-in defaults for a gesture kind. Unknown kinds get the generic defaults.
    #[must_use]
    pub fn for_kind(kind: &GestureKind) -> Self {
        let base = Self::default();
        match kind.as_str() {
            "doubletap" => Self {
                precedence: 10,
                ..base
            },
            "longtap" => Self {
                precedence: 20,
                time_threshold: 1000,
                ..base
            },
            "tap" => Self {
                precedence: 30,
                ..base
            },
            "swipe" => Self {
                precedence: 40,
                prevent_default: true,
                ..base
            },
            "pinch" => Self {
                touches: 2,
                precedence: 50,
                prevent_default: true,
                ..base
            },
            "rotate" => Self {
                touches: 2,
                precedence: 60,
                prevent_default: true,
                ..base
            },
            _ => base,
        }
    }
}

/// Engine-wide configuration.
///
/// ```toml
/// double_tap_grace_ms = 30
///
/// [defaults.tap]
/// areaThreshold = 8.0
///
/// [defaults.swipe]
/// momentum = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Per-kind overrides of the built-in defaults.
    pub defaults: HashMap<String, GestureOptions>,
    /// Grace added to the double-tap window.
    pub double_tap_grace_ms: Millis,
    /// Momentum frame interval.
    pub frame_interval_ms: Millis,
    /// Momentum stop threshold in pixels per frame.
    pub momentum_min_step: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            defaults: HashMap::new(),
            double_tap_grace_ms: DEFAULT_DOUBLE_TAP_GRACE_MS,
            frame_interval_ms: FRAME_INTERVAL_MS,
            momentum_min_step: MOMENTUM_MIN_STEP,
        }
    }
}

impl GestureConfig {
    /// Parse a configuration from TOML.
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| GestureError::InvalidOptions(e.to_string()))
    }

    /// Defaults for a kind: built-ins with this configuration's overrides applied.
    #[must_use]
    pub fn defaults_for(&self, kind: &GestureKind) -> ResolvedOptions {
        let builtin = ResolvedOptions::for_kind(kind);
        match self.defaults.get(kind.as_str()) {
            Some(overrides) => overrides.resolve(&builtin),
            None => builtin,
        }
    }
}
