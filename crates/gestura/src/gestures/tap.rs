//! Tap: contacts go down and lift inside the surface without wandering off.

use crate::binder::{Binder, GestureData};
use crate::kind::GestureKind;
use crate::recognizer::{
    GestureBase, InputSample, PhaseContext, Recognizer, RecognizerInit, RivalFilter, TouchMatch,
};
use gestura_core::Phase;
use std::rc::Rc;

/// Tap recognizer.
#[derive(Debug)]
pub struct Tap {
    base: GestureBase,
    armed: bool,
    /// Kind whose other-touch-count members are cancelled on confirmation.
    rival: Option<GestureKind>,
}

impl Tap {
    /// Build a standalone tap.
    #[must_use]
    pub fn new(init: RecognizerInit) -> Self {
        let (base, _, _) = init.split();
        Self {
            rival: Some(base.kind().clone()),
            base,
            armed: false,
        }
    }

    /// Build a tap machine owned by another recognizer. It has no callbacks and no rivals.
    #[must_use]
    pub(crate) fn embedded(owner: &GestureBase) -> Self {
        Self {
            base: GestureBase::new(
                owner.kind().clone(),
                owner.id(),
                Binder::new(),
                owner.options().clone(),
            ),
            armed: false,
            rival: None,
        }
    }

    /// Page points inside the surface rect grown by `areaThreshold`.
    fn within_area(&self, sample: &InputSample) -> bool {
        let threshold = self.base.options().area_threshold;
        sample
            .page_points
            .iter()
            .all(|p| sample.rect.contains_point_with_threshold(p, threshold))
    }

    /// Check a start or update sample. False means the tap failed.
    pub(crate) fn track(&mut self, sample: &InputSample) -> bool {
        !self.base.has_more_touches(&sample.points)
            && self.base.is_valid_button(sample)
            && self.within_area(sample)
    }

    /// Check the final sample. True confirms the tap.
    pub(crate) fn confirm(&mut self, sample: &InputSample) -> bool {
        !self.base.has_not_equal_touches(&sample.points) && self.within_area(sample)
    }
}

impl Recognizer for Tap {
    fn base(&self) -> &GestureBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GestureBase {
        &mut self.base
    }

    fn on_start(&mut self, ctx: &mut PhaseContext) {
        let sample = Rc::clone(ctx.sample());
        if !self.track(&sample) {
            self.cancel(ctx);
            return;
        }
        if !self.armed {
            self.armed = true;
            self.base.emit(Phase::Start, GestureData::None, &sample);
        }
    }

    fn on_update(&mut self, ctx: &mut PhaseContext) {
        let sample = Rc::clone(ctx.sample());
        if !self.track(&sample) {
            self.cancel(ctx);
        }
    }

    fn on_end(&mut self, ctx: &mut PhaseContext) {
        let sample = Rc::clone(ctx.sample());
        if !self.confirm(&sample) {
            self.cancel(ctx);
            return;
        }
        self.armed = false;
        self.base.emit(Phase::End, GestureData::None, &sample);
        if let Some(kind) = &self.rival {
            let touches = self.base.options().touches;
            ctx.cancel_matching(
                RivalFilter::kind(kind.clone()).touches(TouchMatch::NotEqual(touches)),
            );
        }
    }

    fn on_cancel(&mut self, ctx: &mut PhaseContext) {
        self.armed = false;
        let sample = Rc::clone(ctx.sample());
        self.base.emit(Phase::Cancel, GestureData::None, &sample);
    }

    fn reset(&mut self) {
        self.base.reset();
        self.armed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ResolvedOptions;
    use crate::recognizer::{Arbitration, RecognizerId};
    use gestura_core::{DeviceModel, Point, Rect};
    use std::cell::RefCell;

    fn tap(touches: u32, log: &Rc<RefCell<Vec<Phase>>>) -> Tap {
        let (a, b, c) = (Rc::clone(log), Rc::clone(log), Rc::clone(log));
        let binder = Binder::new()
            .on_start(move |e| a.borrow_mut().push(e.phase))
            .on_end(move |e| b.borrow_mut().push(e.phase))
            .on_cancel(move |e| c.borrow_mut().push(e.phase));
        let options = ResolvedOptions {
            touches,
            area_threshold: 5.0,
            ..ResolvedOptions::for_kind(&GestureKind::TAP)
        };
        Tap {
            base: GestureBase::new(GestureKind::TAP, RecognizerId(1), binder, options),
            armed: false,
            rival: Some(GestureKind::TAP),
        }
    }

    fn ctx(points: &[Point]) -> PhaseContext {
        PhaseContext::new(Rc::new(InputSample {
            model: DeviceModel::Touch,
            points: points.to_vec(),
            page_points: points.to_vec(),
            rect: Rect::new(0.0, 0.0, 100.0, 100.0),
            button: None,
            timestamp: 0,
        }))
    }

    #[test]
    fn test_tap_confirms_and_cancels_rivals() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut t = tap(1, &log);
        let p = [Point::new(50.0, 50.0)];

        t.deliver(Phase::Start, &mut ctx(&p));
        let mut end = ctx(&p);
        t.deliver(Phase::End, &mut end);

        assert_eq!(*log.borrow(), vec![Phase::Start, Phase::End]);
        assert!(matches!(
            end.commands(),
            [Arbitration::CancelMatching(f)] if f.touches == TouchMatch::NotEqual(1)
        ));
    }

    #[test]
    fn test_tap_cancels_outside_grown_rect() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut t = tap(1, &log);

        t.deliver(Phase::Start, &mut ctx(&[Point::new(50.0, 50.0)]));
        t.deliver(Phase::Update, &mut ctx(&[Point::new(104.0, 50.0)]));
        assert!(!t.base().is_cancelled());
        t.deliver(Phase::Update, &mut ctx(&[Point::new(106.0, 50.0)]));
        assert!(t.base().is_cancelled());
        t.deliver(Phase::End, &mut ctx(&[Point::new(106.0, 50.0)]));

        assert_eq!(*log.borrow(), vec![Phase::Start, Phase::Cancel]);
    }

    #[test]
    fn test_tap_requires_exact_touches_on_end() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut t = tap(2, &log);
        let one = [Point::new(10.0, 10.0)];

        t.deliver(Phase::Start, &mut ctx(&one));
        t.deliver(Phase::End, &mut ctx(&one));

        assert_eq!(*log.borrow(), vec![Phase::Start, Phase::Cancel]);
    }

    #[test]
    fn test_tap_cancel_is_idempotent() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut t = tap(1, &log);
        t.cancel(&mut ctx(&[]));
        t.cancel(&mut ctx(&[]));
        assert_eq!(*log.borrow(), vec![Phase::Cancel]);

        t.reset();
        assert!(!t.base().is_cancelled());
    }
}
