//! Swipe: a drag that travels past `radiusThreshold`, with an optional momentum tail.

use crate::binder::{GestureData, SwipeData};
use crate::options::clamp_inertia;
use crate::recognizer::{
    GestureBase, InputSample, PhaseContext, Recognizer, RecognizerInit, TimerHost, TimerTag,
};
use gestura_core::math::{angle_between, percentage, velocity, velocity_vector};
use gestura_core::{Direction, Millis, Phase, Point, TimerId};
use std::rc::Rc;
use tracing::trace;

#[derive(Debug)]
struct Momentum {
    timer: TimerId,
    velocity: Point,
    position: Point,
    page_offset: Point,
    sample: Rc<InputSample>,
}

/// Measure a position against the start point and the previous sample.
fn measure(
    origin: Point,
    position: Point,
    step: Point,
    elapsed: Millis,
    sample: &InputSample,
) -> SwipeData {
    let delta = position - origin;
    let angle = angle_between(&origin, &position);
    let direction = Direction::from_angle(angle);
    let percentage = if direction.is_horizontal() {
        percentage(delta.x, sample.rect.width)
    } else {
        percentage(delta.y, sample.rect.height)
    };
    SwipeData {
        delta,
        step,
        velocity: velocity(step.length(), elapsed),
        angle,
        direction,
        percentage,
        momentum: false,
    }
}

/// Swipe recognizer.
#[derive(Debug)]
pub struct Swipe {
    base: GestureBase,
    timers: TimerHost,
    frame_interval: Millis,
    min_step: f32,
    origin: Option<Point>,
    last: Option<(Point, Millis)>,
    last_velocity: Point,
    data: Option<SwipeData>,
    active: bool,
    momentum: Option<Momentum>,
}

impl Swipe {
    /// Build a swipe.
    #[must_use]
    pub fn new(init: RecognizerInit) -> Self {
        let (base, timers, config) = init.split();
        Self {
            base,
            timers,
            frame_interval: config.frame_interval_ms.max(1),
            min_step: config.momentum_min_step,
            origin: None,
            last: None,
            last_velocity: Point::ORIGIN,
            data: None,
            active: false,
            momentum: None,
        }
    }

    /// Check if the swipe passed its radius in this interaction.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Emit the deferred end of a momentum tail and stop it.
    fn finish_momentum(&mut self) {
        let Some(tail) = self.momentum.take() else {
            return;
        };
        self.timers.cancel(tail.timer);
        let data = self.data.map_or(GestureData::None, GestureData::Swipe);
        self.base.emit(Phase::End, data, &tail.sample);
    }

    fn frame(&mut self) {
        let Some(origin) = self.origin else {
            return;
        };
        let Some(tail) = self.momentum.as_mut() else {
            return;
        };
        tail.velocity = tail.velocity * clamp_inertia(self.base.options().inertia);
        let step = tail.velocity * self.frame_interval as f32;
        if step.length() < self.min_step {
            trace!(id = self.base.id().0, "momentum settled");
            self.finish_momentum();
            return;
        }
        tail.position = tail.position + step;
        tail.page_offset = tail.page_offset + step;
        let mut sample = InputSample::clone(&tail.sample);
        if let Some(p) = sample.points.first_mut() {
            *p = tail.position;
        }
        if let Some(p) = sample.page_points.first_mut() {
            *p = *p + tail.page_offset;
        }
        let position = tail.position;
        let sample = Rc::new(sample);
        let mut data = measure(origin, position, step, self.frame_interval, &sample);
        data.momentum = true;
        self.data = Some(data);
        self.base.emit(Phase::Update, GestureData::Swipe(data), &sample);
    }
}

impl Recognizer for Swipe {
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
            self.last = self.origin.map(|p| (p, ctx.now()));
        }
    }

    fn on_update(&mut self, ctx: &mut PhaseContext) {
        let sample = Rc::clone(ctx.sample());
        if self.base.has_more_touches(&sample.points) {
            self.cancel(ctx);
            return;
        }
        let (Some(origin), Some(position)) = (self.origin, sample.first_point()) else {
            return;
        };
        let (previous, at) = self.last.unwrap_or((origin, ctx.now()));
        let elapsed = ctx.now().saturating_sub(at);
        let step = position - previous;
        self.last = Some((position, ctx.now()));
        self.last_velocity = velocity_vector(step, elapsed);

        let phase = if self.active {
            Phase::Update
        } else {
            if position.distance(&origin) < self.base.options().radius_threshold {
                return;
            }
            self.active = true;
            ctx.cancel_others();
            Phase::Start
        };
        let data = measure(origin, position, step, elapsed, &sample);
        self.data = Some(data);
        self.base.emit(phase, GestureData::Swipe(data), &sample);
    }

    fn on_end(&mut self, ctx: &mut PhaseContext) {
        if !self.active {
            return;
        }
        self.active = false;
        let sample = Rc::clone(ctx.sample());
        let moving = self.last_velocity.length() * self.frame_interval as f32 >= self.min_step;
        if self.base.options().momentum && moving {
            let position = self.last.map_or(Point::ORIGIN, |(p, _)| p);
            let timer = self.timers.repeating(self.frame_interval, TimerTag::Frame);
            self.momentum = Some(Momentum {
                timer,
                velocity: self.last_velocity,
                position,
                page_offset: Point::ORIGIN,
                sample,
            });
            return;
        }
        let data = self.data.map_or(GestureData::None, GestureData::Swipe);
        self.base.emit(Phase::End, data, &sample);
    }

    fn on_cancel(&mut self, ctx: &mut PhaseContext) {
        let tail = self.momentum.take();
        if let Some(tail) = &tail {
            self.timers.cancel(tail.timer);
        }
        if self.active || tail.is_some() {
            self.active = false;
            let sample = Rc::clone(ctx.sample());
            self.base.emit(Phase::Cancel, GestureData::None, &sample);
        }
    }

    fn on_timer(&mut self, tag: TimerTag, _ctx: &mut PhaseContext) {
        if tag == TimerTag::Frame {
            self.frame();
        }
    }

    fn on_detach(&mut self, _ctx: &mut PhaseContext) {
        self.momentum = None;
        self.timers.cancel_all();
    }

    fn reset(&mut self) {
        self.finish_momentum();
        self.base.reset();
        self.origin = None;
        self.last = None;
        self.last_velocity = Point::ORIGIN;
        self.data = None;
        self.active = false;
    }
}
