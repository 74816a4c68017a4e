//! Shared machine for gestures measured between the first two contacts.

use crate::binder::GestureData;
use crate::options::ResolvedOptions;
use crate::recognizer::{GestureBase, PhaseContext, Recognizer, RecognizerInit};
use gestura_core::{Phase, Point};
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

/// Quantity tracked between two contacts.
pub trait ContactMeasure {
    /// Measure the pair.
    fn measure(a: &Point, b: &Point) -> f32;

    /// Check if the change from `baseline` is large enough to start.
    fn reached(baseline: f32, current: f32, options: &ResolvedOptions) -> bool;

    /// Payload for a sample.
    fn data(baseline: f32, previous: f32, current: f32) -> GestureData;
}

/// Two-contact recognizer over a measure.
pub struct TwoContact<M> {
    base: GestureBase,
    baseline: Option<f32>,
    previous: f32,
    active: bool,
    measure: PhantomData<M>,
}

impl<M: ContactMeasure> TwoContact<M> {
    /// Build the recognizer.
    #[must_use]
    pub fn new(init: RecognizerInit) -> Self {
        let (base, _, _) = init.split();
        Self {
            base,
            baseline: None,
            previous: 0.0,
            active: false,
            measure: PhantomData,
        }
    }

    /// Check if the measure passed its threshold in this interaction.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    fn track(&mut self, ctx: &mut PhaseContext) {
        let sample = Rc::clone(ctx.sample());
        if self.base.has_more_touches(&sample.points) {
            self.cancel(ctx);
            return;
        }
        let [a, b, ..] = sample.points.as_slice() else {
            return;
        };
        let current = M::measure(a, b);
        let Some(baseline) = self.baseline else {
            self.baseline = Some(current);
            self.previous = current;
            return;
        };
        let phase = if self.active {
            Phase::Update
        } else if M::reached(baseline, current, self.base.options()) {
            self.active = true;
            ctx.cancel_others();
            Phase::Start
        } else {
            return;
        };
        let data = M::data(baseline, self.previous, current);
        self.previous = current;
        self.base.emit(phase, data, &sample);
    }
}

impl<M: ContactMeasure> Recognizer for TwoContact<M> {
    fn base(&self) -> &GestureBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GestureBase {
        &mut self.base
    }

    fn on_start(&mut self, ctx: &mut PhaseContext) {
        self.track(ctx);
    }

    fn on_update(&mut self, ctx: &mut PhaseContext) {
        self.track(ctx);
    }

    fn on_end(&mut self, ctx: &mut PhaseContext) {
        if !self.active {
            return;
        }
        self.active = false;
        let sample = Rc::clone(ctx.sample());
        let current = self.previous;
        let data = M::data(self.baseline.unwrap_or(current), current, current);
        self.base.emit(Phase::End, data, &sample);
    }

    fn on_cancel(&mut self, ctx: &mut PhaseContext) {
        if self.active {
            self.active = false;
            let sample = Rc::clone(ctx.sample());
            self.base.emit(Phase::Cancel, GestureData::None, &sample);
        }
    }

    fn reset(&mut self) {
        self.base.reset();
        self.baseline = None;
        self.previous = 0.0;
        self.active = false;
    }
}

impl<M> fmt::Debug for TwoContact<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwoContact")
            .field("base", &self.base)
            .field("baseline", &self.baseline)
            .field("active", &self.active)
            .finish()
    }
}
