//! Raw input events consumed by the router.
//!
//! An input transport translates platform events into [`RawEvent`] values: a device model, a
//! phase, the reporting target and the contacts the device reported for this sample.

use crate::error::{GestureError, Result};
use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of an interactive surface (or any target inside it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub u64);

impl SurfaceId {
    /// Create a new surface ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Pointer identifier for identity-tracked devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct PointerId(pub u32);

impl PointerId {
    /// Create a new pointer ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

/// How a device reports its contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceModel {
    /// One implicit pointer that reports a button (mouse).
    Mouse,
    /// Full positional contact list per sample (touch lists).
    Touch,
    /// One contact per sample carrying a persistent identity (pen/pointer events).
    Pointer,
}

impl DeviceModel {
    /// Check if this model reports a meaningful button.
    #[must_use]
    pub const fn has_button(&self) -> bool {
        matches!(self, Self::Mouse)
    }

    /// Check if this model tracks contact identities.
    #[must_use]
    pub const fn is_identity_tracked(&self) -> bool {
        matches!(self, Self::Pointer)
    }
}

impl fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mouse => "mouse",
            Self::Touch => "touch",
            Self::Pointer => "pointer",
        };
        f.write_str(name)
    }
}

/// Lifecycle phase of one interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Contact started
    Start,
    /// Contact moved
    Update,
    /// Contact released
    End,
    /// Interaction interrupted by the system
    Cancel,
}

impl Phase {
    /// Check if this phase terminates an interaction.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::End | Self::Cancel)
    }
}

/// Phase reported by a raw event.
///
/// `DragStart` is the platform starting a native drag, which interrupts every started gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawPhase {
    /// Start-class event
    Start,
    /// Update-class event
    Update,
    /// End-class event
    End,
    /// Cancel-class event
    Cancel,
    /// Native drag started
    DragStart,
}

impl RawPhase {
    /// The dispatch phase this raw phase maps to, if any.
    #[must_use]
    pub const fn phase(&self) -> Option<Phase> {
        match self {
            Self::Start => Some(Phase::Start),
            Self::Update => Some(Phase::Update),
            Self::End => Some(Phase::End),
            Self::Cancel => Some(Phase::Cancel),
            Self::DragStart => None,
        }
    }
}

/// Parse a DOM-style event type name into its device model and phase.
///
/// `dragstart` reports the mouse model since native drags originate from it.
pub fn parse_event_type(name: &str) -> Result<(DeviceModel, RawPhase)> {
    let parsed = match name {
        "mousedown" => (DeviceModel::Mouse, RawPhase::Start),
        "mousemove" => (DeviceModel::Mouse, RawPhase::Update),
        "mouseup" => (DeviceModel::Mouse, RawPhase::End),
        "touchstart" => (DeviceModel::Touch, RawPhase::Start),
        "touchmove" => (DeviceModel::Touch, RawPhase::Update),
        "touchend" => (DeviceModel::Touch, RawPhase::End),
        "touchcancel" => (DeviceModel::Touch, RawPhase::Cancel),
        "pointerdown" | "MSPointerDown" => (DeviceModel::Pointer, RawPhase::Start),
        "pointermove" | "MSPointerMove" => (DeviceModel::Pointer, RawPhase::Update),
        "pointerup" | "MSPointerUp" => (DeviceModel::Pointer, RawPhase::End),
        "pointercancel" | "MSPointerCancel" => (DeviceModel::Pointer, RawPhase::Cancel),
        "dragstart" => (DeviceModel::Mouse, RawPhase::DragStart),
        other => return Err(GestureError::UnknownEventType(other.to_string())),
    };
    Ok(parsed)
}

/// One contact reported by a device sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Identity for identity-tracked devices.
    pub id: Option<PointerId>,
    /// Position in page space.
    pub position: Point,
}

impl Contact {
    /// A positional contact without identity.
    #[must_use]
    pub const fn at(position: Point) -> Self {
        Self { id: None, position }
    }

    /// A contact carrying a pointer identity.
    #[must_use]
    pub const fn tracked(id: PointerId, position: Point) -> Self {
        Self {
            id: Some(id),
            position,
        }
    }
}

/// A raw device sample delivered to a surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Device model of the sample.
    pub model: DeviceModel,
    /// Phase reported by the device.
    pub phase: RawPhase,
    /// Element the sample was reported on (defaults to the surface).
    pub target: Option<SurfaceId>,
    /// Contacts reported by the device.
    pub contacts: Vec<Contact>,
    /// Button index for the mouse model.
    pub button: Option<u8>,
}

impl RawEvent {
    /// Create a raw event with no contacts.
    #[must_use]
    pub fn new(model: DeviceModel, phase: RawPhase) -> Self {
        Self {
            model,
            phase,
            target: None,
            contacts: Vec::new(),
            button: None,
        }
    }

    /// Create a raw event from a DOM-style type name.
    pub fn from_type(name: &str, contacts: Vec<Contact>) -> Result<Self> {
        let (model, phase) = parse_event_type(name)?;
        let button = model.has_button().then_some(0);
        Ok(Self {
            model,
            phase,
            target: None,
            contacts,
            button,
        })
    }

    /// Mouse sample with the primary button.
    #[must_use]
    pub fn mouse(phase: RawPhase, position: Point) -> Self {
        Self::mouse_button(phase, position, 0)
    }

    /// Mouse sample with a specific button.
    #[must_use]
    pub fn mouse_button(phase: RawPhase, position: Point, button: u8) -> Self {
        Self {
            model: DeviceModel::Mouse,
            phase,
            target: None,
            contacts: vec![Contact::at(position)],
            button: Some(button),
        }
    }

    /// Touch sample reporting the full list of current contacts.
    #[must_use]
    pub fn touch(phase: RawPhase, positions: &[Point]) -> Self {
        Self {
            model: DeviceModel::Touch,
            phase,
            target: None,
            contacts: positions.iter().copied().map(Contact::at).collect(),
            button: None,
        }
    }

    /// Identity-tracked sample for one pointer.
    #[must_use]
    pub fn pointer(phase: RawPhase, id: PointerId, position: Point) -> Self {
        Self {
            model: DeviceModel::Pointer,
            phase,
            target: None,
            contacts: vec![Contact::tracked(id, position)],
            button: None,
        }
    }

    /// Native drag start.
    #[must_use]
    pub fn drag_start() -> Self {
        Self::new(DeviceModel::Mouse, RawPhase::DragStart)
    }

    /// Set the reporting target.
    #[must_use]
    pub fn with_target(mut self, target: SurfaceId) -> Self {
        self.target = Some(target);
        self
    }

    /// Check the contact list against the device model.
    pub fn validate(&self) -> Result<()> {
        let malformed = |reason: &str| GestureError::MalformedEvent {
            model: self.model,
            reason: reason.to_string(),
        };
        match (self.model, self.phase) {
            (_, RawPhase::DragStart) => Ok(()),
            (DeviceModel::Mouse, _) if self.contacts.len() != 1 => {
                Err(malformed("mouse samples carry exactly one contact"))
            }
            (DeviceModel::Touch, RawPhase::Start) if self.contacts.is_empty() => {
                Err(malformed("touch start without contacts"))
            }
            (DeviceModel::Pointer, _) if self.contacts.len() != 1 => {
                Err(malformed("pointer samples carry exactly one contact"))
            }
            (DeviceModel::Pointer, _) if self.contacts[0].id.is_none() => {
                Err(malformed("pointer contact without identity"))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event_type_all_models() {
        assert_eq!(
            parse_event_type("mousedown").unwrap(),
            (DeviceModel::Mouse, RawPhase::Start)
        );
        assert_eq!(
            parse_event_type("touchcancel").unwrap(),
            (DeviceModel::Touch, RawPhase::Cancel)
        );
        assert_eq!(
            parse_event_type("MSPointerMove").unwrap(),
            (DeviceModel::Pointer, RawPhase::Update)
        );
        assert_eq!(
            parse_event_type("dragstart").unwrap(),
            (DeviceModel::Mouse, RawPhase::DragStart)
        );
    }

    #[test]
    fn test_parse_event_type_unknown() {
        let err = parse_event_type("wheel").unwrap_err();
        assert!(matches!(err, GestureError::UnknownEventType(ref n) if n == "wheel"));
    }

    #[test]
    fn test_raw_phase_mapping() {
        assert_eq!(RawPhase::Start.phase(), Some(Phase::Start));
        assert_eq!(RawPhase::Cancel.phase(), Some(Phase::Cancel));
        assert_eq!(RawPhase::DragStart.phase(), None);
        assert!(Phase::End.is_terminal());
        assert!(!Phase::Update.is_terminal());
    }

    #[test]
    fn test_from_type_sets_mouse_button() {
        let e = RawEvent::from_type("mousedown", vec![Contact::at(Point::ORIGIN)]).unwrap();
        assert_eq!(e.button, Some(0));
        let t = RawEvent::from_type("touchstart", vec![Contact::at(Point::ORIGIN)]).unwrap();
        assert_eq!(t.button, None);
    }

    #[test]
    fn test_validate_mouse_requires_one_contact() {
        let mut e = RawEvent::mouse(RawPhase::Start, Point::ORIGIN);
        assert!(e.validate().is_ok());
        e.contacts.clear();
        assert!(matches!(
            e.validate(),
            Err(GestureError::MalformedEvent {
                model: DeviceModel::Mouse,
                ..
            })
        ));
    }

    #[test]
    fn test_validate_touch_start_requires_contacts() {
        assert!(RawEvent::touch(RawPhase::Start, &[]).validate().is_err());
        assert!(RawEvent::touch(RawPhase::End, &[]).validate().is_ok());
    }

    #[test]
    fn test_validate_pointer_requires_identity() {
        let mut e = RawEvent::pointer(RawPhase::Start, PointerId::new(7), Point::ORIGIN);
        assert!(e.validate().is_ok());
        e.contacts[0].id = None;
        assert!(e.validate().is_err());
    }

    #[test]
    fn test_device_model_predicates() {
        assert!(DeviceModel::Mouse.has_button());
        assert!(!DeviceModel::Touch.has_button());
        assert!(DeviceModel::Pointer.is_identity_tracked());
        assert_eq!(DeviceModel::Touch.to_string(), "touch");
    }

    #[test]
    fn test_raw_event_serde_roundtrip() {
        let e = RawEvent::pointer(RawPhase::Update, PointerId::new(3), Point::new(1.0, 2.0))
            .with_target(SurfaceId::new(9));
        let json = serde_json::to_string(&e).unwrap();
        let back: RawEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(e, back);
    }
}
