//! Gesture kinds and the open registry of recognizer factories.

use crate::gestures::{DoubleTap, LongTap, Pinch, Rotate, Swipe, Tap};
use crate::recognizer::{Recognizer, RecognizerInit};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Name of a gesture kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GestureKind(Cow<'static, str>);

impl GestureKind {
    /// Single or multi-finger tap.
    pub const TAP: Self = Self(Cow::Borrowed("tap"));
    /// Two taps inside a time window.
    pub const DOUBLE_TAP: Self = Self(Cow::Borrowed("doubletap"));
    /// Press held for a duration.
    pub const LONG_TAP: Self = Self(Cow::Borrowed("longtap"));
    /// Directional drag.
    pub const SWIPE: Self = Self(Cow::Borrowed("swipe"));
    /// Two-contact scale.
    pub const PINCH: Self = Self(Cow::Borrowed("pinch"));
    /// Two-contact rotation.
    pub const ROTATE: Self = Self(Cow::Borrowed("rotate"));

    /// Create a kind from any name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// The kind's name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GestureKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Builds a recognizer for one attachment.
pub type GestureFactory = Rc<dyn Fn(RecognizerInit) -> Box<dyn Recognizer>>;

/// Wrap a recognizer constructor as a factory.
pub fn factory<R: Recognizer + 'static>(build: fn(RecognizerInit) -> R) -> GestureFactory {
    Rc::new(move |init: RecognizerInit| -> Box<dyn Recognizer> { Box::new(build(init)) })
}

/// Registry of available gesture kinds.
#[derive(Clone)]
pub struct KindRegistry {
    factories: BTreeMap<String, GestureFactory>,
}

impl KindRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Create a registry with the six built-in kinds.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.add(GestureKind::TAP, factory(Tap::new));
        registry.add(GestureKind::DOUBLE_TAP, factory(DoubleTap::new));
        registry.add(GestureKind::LONG_TAP, factory(LongTap::new));
        registry.add(GestureKind::SWIPE, factory(Swipe::new));
        registry.add(GestureKind::PINCH, factory(Pinch::new));
        registry.add(GestureKind::ROTATE, factory(Rotate::new));
        registry
    }

    /// Register or replace a kind.
    pub fn add(&mut self, kind: GestureKind, factory: GestureFactory) {
        self.factories.insert(kind.as_str().to_string(), factory);
    }

    /// Remove a kind. Returns true if it was registered.
    pub fn remove(&mut self, kind: &str) -> bool {
        self.factories.remove(kind).is_some()
    }

    /// Look up a factory.
    #[must_use]
    pub fn get(&self, kind: &str) -> Option<GestureFactory> {
        self.factories.get(kind).cloned()
    }

    /// Check if a kind is registered.
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered kind names in sorted order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if no kind is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for KindRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindRegistry")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
