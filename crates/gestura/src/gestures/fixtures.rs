//! Shared setup for recognizer unit tests.

use crate::binder::{Binder, GestureData};
use crate::kind::GestureKind;
use crate::options::{GestureConfig, GestureOptions, ResolvedOptions};
use crate::recognizer::{InputSample, PhaseContext, RecognizerId, RecognizerInit, TimerHost};
use gestura_core::{DeviceModel, ManualScheduler, Millis, Phase, Point, Rect};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub(crate) type Log = Rc<RefCell<Vec<(Phase, GestureData)>>>;

pub(crate) fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub(crate) fn phases(log: &Log) -> Vec<Phase> {
    log.borrow().iter().map(|(phase, _)| *phase).collect()
}

fn recording(log: &Log) -> Binder {
    let (a, b, c, d) = (
        Rc::clone(log),
        Rc::clone(log),
        Rc::clone(log),
        Rc::clone(log),
    );
    Binder::new()
        .on_start(move |e| a.borrow_mut().push((e.phase, e.data)))
        .on_update(move |e| b.borrow_mut().push((e.phase, e.data)))
        .on_end(move |e| c.borrow_mut().push((e.phase, e.data)))
        .on_cancel(move |e| d.borrow_mut().push((e.phase, e.data)))
}

/// Construction input with recording callbacks. Timers go to `clock` but are not routed
/// back, so tests call `on_timer` by hand.
pub(crate) fn init(
    kind: GestureKind,
    options: &str,
    clock: &Rc<ManualScheduler>,
    log: &Log,
) -> RecognizerInit {
    let overrides = GestureOptions::from_json(options).unwrap();
    RecognizerInit {
        defaults: ResolvedOptions::for_kind(&kind),
        kind,
        id: RecognizerId(1),
        binder: recording(log).options(overrides),
        timers: TimerHost::new(clock.clone(), Weak::new(), RecognizerId(1)),
        config: Rc::new(GestureConfig::default()),
    }
}

/// Touch sample on a 100x100 surface.
pub(crate) fn ctx(points: &[Point], at: Millis) -> PhaseContext {
    PhaseContext::new(Rc::new(InputSample {
        model: DeviceModel::Touch,
        points: points.to_vec(),
        page_points: points.to_vec(),
        rect: Rect::new(0.0, 0.0, 100.0, 100.0),
        button: None,
        timestamp: at,
    }))
}
