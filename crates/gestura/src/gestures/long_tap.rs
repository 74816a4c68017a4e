//! Long tap: a press held in place for `timeThreshold`, reporting progress every `interval`.

use crate::binder::GestureData;
use crate::recognizer::{GestureBase, PhaseContext, Recognizer, RecognizerInit, TimerHost, TimerTag};
use gestura_core::math::step_count;
use gestura_core::{Millis, Phase, Point, TimerId};
use std::rc::Rc;

/// Long-tap recognizer.
#[derive(Debug)]
pub struct LongTap {
    base: GestureBase,
    timers: TimerHost,
    origin: Option<Point>,
    began_at: Millis,
    step: u32,
    total: u32,
    ticker: Option<TimerId>,
}

impl LongTap {
    /// Build a long tap.
    #[must_use]
    pub fn new(init: RecognizerInit) -> Self {
        let (base, timers, _) = init.split();
        let options = base.options();
        let total = step_count(options.time_threshold, options.interval);
        Self {
            base,
            timers,
            origin: None,
            began_at: 0,
            step: 0,
            total,
            ticker: None,
        }
    }

    /// Completion in `[0, 100]`.
    #[must_use]
    pub fn percent(&self) -> f32 {
        (self.step as f32 / self.total as f32 * 100.0).min(100.0)
    }

    fn moved(&self, points: &[Point]) -> bool {
        let threshold = self.base.options().area_threshold;
        match (self.origin, points.first()) {
            (Some(origin), Some(p)) => origin.distance(p) > threshold,
            _ => false,
        }
    }

    fn stop(&mut self) {
        if let Some(timer) = self.ticker.take() {
            self.timers.cancel(timer);
        }
    }

    fn progress(&self) -> GestureData {
        GestureData::LongTap {
            percent: self.percent(),
        }
    }
}

impl Recognizer for LongTap {
    fn base(&self) -> &GestureBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GestureBase {
        &mut self.base
    }

    fn on_start(&mut self, ctx: &mut PhaseContext) {
        let sample = Rc::clone(ctx.sample());
        if self.base.has_more_touches(&sample.points) || !self.base.is_valid_button(&sample) {
            self.cancel(ctx);
            return;
        }
        if self.origin.is_none() {
            self.origin = sample.first_point();
            self.began_at = ctx.now();
            let interval = self.base.options().interval.max(1);
            self.ticker = Some(self.timers.repeating(interval, TimerTag::Tick));
        }
    }

    fn on_update(&mut self, ctx: &mut PhaseContext) {
        let sample = Rc::clone(ctx.sample());
        if self.base.has_more_touches(&sample.points) || self.moved(&sample.points) {
            self.cancel(ctx);
        }
    }

    fn on_end(&mut self, ctx: &mut PhaseContext) {
        self.stop();
        let sample = Rc::clone(ctx.sample());
        let held = ctx.now().saturating_sub(self.began_at);
        if self.origin.is_none()
            || self.base.has_not_equal_touches(&sample.points)
            || self.moved(&sample.points)
            || held < self.base.options().time_threshold
        {
            self.cancel(ctx);
            return;
        }
        self.base.emit(Phase::End, self.progress(), &sample);
    }

    fn on_cancel(&mut self, ctx: &mut PhaseContext) {
        self.stop();
        if self.step >= 1 {
            let sample = Rc::clone(ctx.sample());
            self.base.emit(Phase::Cancel, self.progress(), &sample);
        }
    }

    fn on_timer(&mut self, tag: TimerTag, ctx: &mut PhaseContext) {
        if tag != TimerTag::Tick || self.ticker.is_none() || self.base.is_cancelled() {
            return;
        }
        self.step += 1;
        let phase = if self.step == 1 {
            Phase::Start
        } else {
            Phase::Update
        };
        if self.step >= self.total {
            self.stop();
        }
        let sample = Rc::clone(ctx.sample());
        self.base.emit(phase, self.progress(), &sample);
    }

    fn on_detach(&mut self, _ctx: &mut PhaseContext) {
        self.ticker = None;
        self.timers.cancel_all();
    }

    fn reset(&mut self) {
        self.stop();
        self.base.reset();
        self.origin = None;
        self.began_at = 0;
        self.step = 0;
    }
}
