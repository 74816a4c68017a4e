//! Double tap: two taps completing within `timeThreshold`.
//!
//! The first completed tap opens a window and pauses sibling taps with the same touch count, so
//! a single tap is only reported once it is clear no second tap follows. The window timer runs
//! `timeThreshold` plus a grace margin; when it expires the siblings are replayed.

use crate::binder::GestureData;
use crate::gestures::tap::Tap;
use crate::kind::GestureKind;
use crate::recognizer::{
    GestureBase, PhaseContext, Recognizer, RecognizerInit, RivalFilter, TimerHost, TimerTag,
    TouchMatch,
};
use gestura_core::{Millis, Phase, TimerId};
use std::rc::Rc;
use tracing::debug;

/// Double-tap recognizer.
#[derive(Debug)]
pub struct DoubleTap {
    base: GestureBase,
    tap: Tap,
    timers: TimerHost,
    grace: Millis,
    first_at: Option<Millis>,
    window: Option<TimerId>,
}

impl DoubleTap {
    /// Build a double tap.
    #[must_use]
    pub fn new(init: RecognizerInit) -> Self {
        let (base, timers, config) = init.split();
        Self {
            tap: Tap::embedded(&base),
            base,
            timers,
            grace: config.double_tap_grace_ms,
            first_at: None,
            window: None,
        }
    }

    /// Check if a first tap is waiting for its partner.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.window.is_some()
    }

    fn open_window(&mut self, ctx: &mut PhaseContext) {
        let touches = self.base.options().touches;
        ctx.pause(
            RivalFilter::kind(GestureKind::TAP)
                .touches(TouchMatch::Equal(touches))
                .started(),
        );
        self.first_at = Some(ctx.now());
        let delay = self.base.options().time_threshold + self.grace;
        self.window = Some(self.timers.once(delay, TimerTag::Window));
        let sample = Rc::clone(ctx.sample());
        self.base.emit(Phase::Start, GestureData::None, &sample);
    }

    /// Drop the pending window, handing paused siblings back. Returns true if one was pending.
    fn close_window(&mut self, ctx: &mut PhaseContext, replay: bool) -> bool {
        self.first_at = None;
        match self.window.take() {
            Some(timer) => {
                self.timers.cancel(timer);
                ctx.resume(replay);
                true
            }
            None => false,
        }
    }
}

impl Recognizer for DoubleTap {
    fn base(&self) -> &GestureBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GestureBase {
        &mut self.base
    }

    fn on_start(&mut self, ctx: &mut PhaseContext) {
        let sample = Rc::clone(ctx.sample());
        if !self.tap.track(&sample) {
            self.cancel(ctx);
        }
    }

    fn on_update(&mut self, ctx: &mut PhaseContext) {
        let sample = Rc::clone(ctx.sample());
        if !self.tap.track(&sample) {
            self.cancel(ctx);
        }
    }

    fn on_end(&mut self, ctx: &mut PhaseContext) {
        let sample = Rc::clone(ctx.sample());
        if !self.tap.confirm(&sample) {
            self.cancel(ctx);
            return;
        }
        let now = ctx.now();
        let threshold = self.base.options().time_threshold;
        match self.first_at {
            Some(first) if now.saturating_sub(first) <= threshold => {
                self.close_window(ctx, false);
                self.base.emit(
                    Phase::End,
                    GestureData::DoubleTap {
                        interval: now.saturating_sub(first),
                    },
                    &sample,
                );
            }
            Some(_) => {
                debug!(id = self.base.id().0, "second tap too late, restarting window");
                self.close_window(ctx, true);
                self.base.emit(Phase::Cancel, GestureData::None, &sample);
                self.open_window(ctx);
            }
            None => self.open_window(ctx),
        }
    }

    fn on_cancel(&mut self, ctx: &mut PhaseContext) {
        if self.close_window(ctx, true) {
            let sample = Rc::clone(ctx.sample());
            self.base.emit(Phase::Cancel, GestureData::None, &sample);
        }
    }

    fn on_timer(&mut self, tag: TimerTag, ctx: &mut PhaseContext) {
        if tag != TimerTag::Window {
            return;
        }
        let Some(timer) = self.window.take() else {
            return;
        };
        self.timers.forget(timer);
        self.first_at = None;
        ctx.resume(true);
        let sample = Rc::clone(ctx.sample());
        self.base.emit(Phase::Cancel, GestureData::None, &sample);
    }

    fn on_detach(&mut self, ctx: &mut PhaseContext) {
        self.close_window(ctx, true);
        self.timers.cancel_all();
    }

    fn reset(&mut self) {
        // The window spans interactions; only the per-interaction flags go.
        self.base.reset();
        self.tap.reset();
    }
}
