//! Recognizer abstraction shared by every gesture kind.
//!
//! A recognizer is a state machine driven by the router. Each concrete gesture embeds a
//! [`GestureBase`] carrying the flags the router inspects (`started`, `cancelled`, paused state)
//! and implements the phase hooks of [`Recognizer`]. Recognizers never touch each other directly:
//! they ask for arbitration through the [`PhaseContext`] they are handed, and the router applies
//! the requests once the call returns.

use crate::binder::{Binder, GestureData, GestureEvent};
use crate::kind::GestureKind;
use crate::options::{GestureConfig, ResolvedOptions};
use crate::router::Router;
use gestura_core::math::{exceeds_touches, high_water, matches_touches};
use gestura_core::{DeviceModel, Millis, Phase, Point, Rect, Scheduler, TimerId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::trace;

/// Handle to one attached recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecognizerId(pub u64);

impl fmt::Display for RecognizerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "recognizer#{}", self.0)
    }
}

/// One normalized input sample, shared between the live dispatch and paused queues.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSample {
    /// Device model that produced the sample.
    pub model: DeviceModel,
    /// Contacts in the origin target's space, by index.
    pub points: Vec<Point>,
    /// Contacts in page space, parallel to `points`.
    pub page_points: Vec<Point>,
    /// Surface rect snapshotted at interaction start.
    pub rect: Rect,
    /// Mouse button, if the model reports one.
    pub button: Option<u8>,
    /// Scheduler time of the sample.
    pub timestamp: Millis,
}

impl InputSample {
    /// A sample without contacts.
    #[must_use]
    pub fn empty(timestamp: Millis) -> Self {
        Self {
            model: DeviceModel::Mouse,
            points: Vec::new(),
            page_points: Vec::new(),
            rect: Rect::default(),
            button: None,
            timestamp,
        }
    }

    /// First contact in the origin target's space.
    #[must_use]
    pub fn first_point(&self) -> Option<Point> {
        self.points.first().copied()
    }

    /// Copy of this sample at a later time.
    #[must_use]
    pub fn at(&self, timestamp: Millis) -> Self {
        Self {
            timestamp,
            ..self.clone()
        }
    }
}

/// Which touch counts a [`RivalFilter`] accepts, compared to the rival's `touches` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchMatch {
    /// Any touch count.
    Any,
    /// Rivals configured for exactly this many contacts.
    Equal(u32),
    /// Rivals configured for any other count.
    NotEqual(u32),
}

impl TouchMatch {
    const fn accepts(self, touches: u32) -> bool {
        match self {
            Self::Any => true,
            Self::Equal(n) => touches == n,
            Self::NotEqual(n) => touches != n,
        }
    }
}

/// Predicate selecting rival recognizers. The requester is always excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RivalFilter {
    /// Kind the rival must have.
    pub kind: GestureKind,
    /// Touch-count requirement.
    pub touches: TouchMatch,
    /// Only rivals that received a start in this interaction.
    pub started_only: bool,
    /// A further recognizer to leave alone.
    pub excluding: Option<RecognizerId>,
}

impl RivalFilter {
    /// Every rival of a kind.
    #[must_use]
    pub fn kind(kind: GestureKind) -> Self {
        Self {
            kind,
            touches: TouchMatch::Any,
            started_only: false,
            excluding: None,
        }
    }

    /// Restrict by touch count.
    #[must_use]
    pub fn touches(mut self, touches: TouchMatch) -> Self {
        self.touches = touches;
        self
    }

    /// Restrict to started rivals.
    #[must_use]
    pub fn started(mut self) -> Self {
        self.started_only = true;
        self
    }

    /// Leave one more recognizer alone.
    #[must_use]
    pub fn excluding(mut self, id: Option<RecognizerId>) -> Self {
        self.excluding = id;
        self
    }

    /// Check a candidate against the filter.
    #[must_use]
    pub fn accepts(&self, id: RecognizerId, base: &GestureBase) -> bool {
        base.kind == self.kind
            && self.excluding != Some(id)
            && self.touches.accepts(base.options.touches)
            && (!self.started_only || base.started)
    }
}

/// Arbitration request raised by a recognizer or the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arbitration {
    /// Cancel one recognizer.
    CancelOne(RecognizerId),
    /// Cancel every recognizer whose kind differs from the requester's.
    CancelOthers,
    /// Cancel rivals selected by a filter.
    CancelMatching(RivalFilter),
    /// Cancel every started recognizer.
    CancelAllStarted,
    /// Pause rivals selected by a filter; their phases are buffered.
    Pause(RivalFilter),
    /// Unpause what the requester paused, replaying or discarding the buffered phases.
    Resume {
        /// Replay buffered phases in arrival order; otherwise cancel.
        replay: bool,
    },
}

/// Who paused a recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pauser {
    /// The application, through the engine.
    Engine,
    /// Another recognizer.
    Recognizer(RecognizerId),
}

/// Per-call context handed to recognizer hooks.
#[derive(Debug)]
pub struct PhaseContext {
    sample: Rc<InputSample>,
    commands: Vec<Arbitration>,
}

impl PhaseContext {
    /// Create a context for one sample.
    #[must_use]
    pub fn new(sample: Rc<InputSample>) -> Self {
        Self {
            sample,
            commands: Vec::new(),
        }
    }

    /// The sample being processed.
    #[must_use]
    pub fn sample(&self) -> &Rc<InputSample> {
        &self.sample
    }

    /// Scheduler time of the sample.
    #[must_use]
    pub fn now(&self) -> Millis {
        self.sample.timestamp
    }

    /// Cancel one recognizer.
    pub fn cancel_one(&mut self, id: RecognizerId) {
        self.commands.push(Arbitration::CancelOne(id));
    }

    /// Cancel every recognizer of another kind.
    pub fn cancel_others(&mut self) {
        self.commands.push(Arbitration::CancelOthers);
    }

    /// Cancel rivals selected by `filter`.
    pub fn cancel_matching(&mut self, filter: RivalFilter) {
        self.commands.push(Arbitration::CancelMatching(filter));
    }

    /// Cancel every started recognizer.
    pub fn cancel_all_started(&mut self) {
        self.commands.push(Arbitration::CancelAllStarted);
    }

    /// Pause rivals selected by `filter`.
    pub fn pause(&mut self, filter: RivalFilter) {
        self.commands.push(Arbitration::Pause(filter));
    }

    /// Resume the rivals this recognizer paused.
    pub fn resume(&mut self, replay: bool) {
        self.commands.push(Arbitration::Resume { replay });
    }

    /// Requests raised so far.
    #[must_use]
    pub fn commands(&self) -> &[Arbitration] {
        &self.commands
    }

    /// Consume the context, returning its requests in order.
    #[must_use]
    pub fn into_commands(self) -> Vec<Arbitration> {
        self.commands
    }
}

/// Timer role, passed back to [`Recognizer::on_timer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerTag {
    /// Long-tap progress tick.
    Tick,
    /// Double-tap window expiry.
    Window,
    /// Swipe momentum frame.
    Frame,
}

/// Scheduler access for one recognizer. Fired timers are routed back through the owning router.
pub struct TimerHost {
    scheduler: Rc<dyn Scheduler>,
    router: Weak<Router>,
    owner: RecognizerId,
    live: Vec<TimerId>,
}

impl TimerHost {
    /// Create a host for `owner`.
    #[must_use]
    pub fn new(scheduler: Rc<dyn Scheduler>, router: Weak<Router>, owner: RecognizerId) -> Self {
        Self {
            scheduler,
            router,
            owner,
            live: Vec::new(),
        }
    }

    /// Current scheduler time.
    #[must_use]
    pub fn now(&self) -> Millis {
        self.scheduler.now()
    }

    /// Fire `tag` once after `delay` milliseconds.
    pub fn once(&mut self, delay: Millis, tag: TimerTag) -> TimerId {
        let (router, owner) = (self.router.clone(), self.owner);
        let id = self.scheduler.schedule_once(
            delay,
            Box::new(move || {
                if let Some(router) = router.upgrade() {
                    router.fire_timer(owner, tag);
                }
            }),
        );
        trace!(owner = owner.0, timer = id.0, ?tag, delay, "scheduled timer");
        self.live.push(id);
        id
    }

    /// Fire `tag` every `interval` milliseconds until cancelled.
    pub fn repeating(&mut self, interval: Millis, tag: TimerTag) -> TimerId {
        let (router, owner) = (self.router.clone(), self.owner);
        let id = self.scheduler.schedule_repeating(
            interval,
            Box::new(move || {
                if let Some(router) = router.upgrade() {
                    router.fire_timer(owner, tag);
                }
            }),
        );
        trace!(owner = owner.0, timer = id.0, ?tag, interval, "scheduled repeating timer");
        self.live.push(id);
        id
    }

    /// Cancel one timer.
    pub fn cancel(&mut self, id: TimerId) {
        self.scheduler.cancel(id);
        self.live.retain(|t| *t != id);
    }

    /// Drop a timer that already fired from the live set.
    pub fn forget(&mut self, id: TimerId) {
        self.live.retain(|t| *t != id);
    }

    /// Number of timers scheduled and not yet cancelled or forgotten.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Cancel every timer this host scheduled.
    pub fn cancel_all(&mut self) {
        for id in self.live.drain(..) {
            self.scheduler.cancel(id);
        }
    }
}

impl fmt::Debug for TimerHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHost")
            .field("owner", &self.owner)
            .field("live", &self.live)
            .finish()
    }
}

/// Everything a factory needs to build one recognizer.
#[derive(Debug)]
pub struct RecognizerInit {
    /// Kind being attached.
    pub kind: GestureKind,
    /// Handle assigned to the new recognizer.
    pub id: RecognizerId,
    /// User callbacks and overrides.
    pub binder: Binder,
    /// Defaults for the kind: built-ins plus engine configuration.
    pub defaults: ResolvedOptions,
    /// Scheduler access.
    pub timers: TimerHost,
    /// Engine configuration.
    pub config: Rc<GestureConfig>,
}

impl RecognizerInit {
    /// Resolve options and split into the base state, the timer host and the configuration.
    #[must_use]
    pub fn split(self) -> (GestureBase, TimerHost, Rc<GestureConfig>) {
        let options = self.binder.overrides().resolve(&self.defaults);
        let base = GestureBase::new(self.kind, self.id, self.binder, options);
        (base, self.timers, self.config)
    }
}

/// State shared by every recognizer.
#[derive(Debug)]
pub struct GestureBase {
    kind: GestureKind,
    id: RecognizerId,
    binder: Binder,
    options: ResolvedOptions,
    started: bool,
    cancelled: bool,
    paused: Option<Pauser>,
    touch_count: usize,
    queue: Vec<(Phase, Rc<InputSample>)>,
}

impl GestureBase {
    /// Create base state with resolved options.
    #[must_use]
    pub fn new(
        kind: GestureKind,
        id: RecognizerId,
        binder: Binder,
        options: ResolvedOptions,
    ) -> Self {
        Self {
            kind,
            id,
            binder,
            options,
            started: false,
            cancelled: false,
            paused: None,
            touch_count: 0,
            queue: Vec::new(),
        }
    }

    /// Kind of this recognizer.
    #[must_use]
    pub fn kind(&self) -> &GestureKind {
        &self.kind
    }

    /// Handle of this recognizer.
    #[must_use]
    pub const fn id(&self) -> RecognizerId {
        self.id
    }

    /// Resolved options.
    #[must_use]
    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    /// Received a start in this interaction.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started
    }

    /// Cancelled in this interaction.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Who paused this recognizer, if paused.
    #[must_use]
    pub const fn paused_by(&self) -> Option<Pauser> {
        self.paused
    }

    /// Highest contact count seen in this interaction.
    #[must_use]
    pub const fn touch_count(&self) -> usize {
        self.touch_count
    }

    /// Number of buffered phases.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Started, not cancelled and asking for default prevention.
    #[must_use]
    pub const fn claims_default(&self) -> bool {
        self.started && !self.cancelled && self.options.prevent_default
    }

    /// Raise the touch high-water mark; true if it now exceeds `touches`.
    pub fn has_more_touches(&mut self, points: &[Point]) -> bool {
        self.touch_count = high_water(self.touch_count, points.len());
        exceeds_touches(self.touch_count, self.options.touches)
    }

    /// True if there are too many contacts or not exactly `touches` of them.
    pub fn has_not_equal_touches(&mut self, points: &[Point]) -> bool {
        self.has_more_touches(points) || !matches_touches(self.touch_count, self.options.touches)
    }

    /// Mouse samples must use an accepted button; other models always pass.
    #[must_use]
    pub fn is_valid_button(&self, sample: &InputSample) -> bool {
        match (sample.model.has_button(), sample.button) {
            (true, Some(button)) => self.options.which.allows(button),
            _ => true,
        }
    }

    /// Invoke the user callback for `phase`.
    pub fn emit(&mut self, phase: Phase, data: GestureData, sample: &InputSample) {
        trace!(kind = %self.kind, id = self.id.0, ?phase, "gesture callback");
        let event = GestureEvent {
            kind: &self.kind,
            id: self.id,
            phase,
            points: &sample.points,
            page_points: &sample.page_points,
            timestamp: sample.timestamp,
            data,
        };
        self.binder.emit(&event);
    }

    /// Start buffering phases.
    pub fn pause(&mut self, by: Pauser) {
        if self.paused.is_none() && !self.cancelled {
            self.paused = Some(by);
        }
    }

    /// Stop buffering and hand back the buffered phases.
    pub fn unpause(&mut self) -> Vec<(Phase, Rc<InputSample>)> {
        self.paused = None;
        std::mem::take(&mut self.queue)
    }

    /// Clear per-interaction flags. Paused state and its queue survive.
    pub fn reset(&mut self) {
        self.started = false;
        self.cancelled = false;
        self.touch_count = 0;
    }
}

/// A gesture state machine.
///
/// Implementors provide the four phase hooks; the router calls [`Recognizer::deliver`] and
/// [`Recognizer::cancel`], which take care of the shared flags.
pub trait Recognizer {
    /// Shared state.
    fn base(&self) -> &GestureBase;

    /// Shared state, mutably.
    fn base_mut(&mut self) -> &mut GestureBase;

    /// Contacts went down.
    fn on_start(&mut self, ctx: &mut PhaseContext);

    /// Contacts moved.
    fn on_update(&mut self, ctx: &mut PhaseContext);

    /// Contacts lifted.
    fn on_end(&mut self, ctx: &mut PhaseContext);

    /// The recognizer is being cancelled. Runs at most once per interaction.
    fn on_cancel(&mut self, ctx: &mut PhaseContext);

    /// A timer scheduled through the [`TimerHost`] fired.
    fn on_timer(&mut self, _tag: TimerTag, _ctx: &mut PhaseContext) {}

    /// The recognizer was detached. Timers must be cleared here.
    fn on_detach(&mut self, _ctx: &mut PhaseContext) {}

    /// Reset per-interaction state before a new interaction starts.
    fn reset(&mut self) {
        self.base_mut().reset();
    }

    /// Route one phase: skipped once cancelled, buffered while paused.
    fn deliver(&mut self, phase: Phase, ctx: &mut PhaseContext) {
        if self.base().cancelled {
            return;
        }
        if phase == Phase::Start {
            self.base_mut().started = true;
        }
        if self.base().paused.is_some() {
            let sample = Rc::clone(ctx.sample());
            self.base_mut().queue.push((phase, sample));
            return;
        }
        match phase {
            Phase::Start => self.on_start(ctx),
            Phase::Update => self.on_update(ctx),
            Phase::End => self.on_end(ctx),
            Phase::Cancel => self.cancel(ctx),
        }
    }

    /// Cancel for the rest of the interaction. Idempotent.
    fn cancel(&mut self, ctx: &mut PhaseContext) {
        if self.base().cancelled {
            return;
        }
        self.base_mut().cancelled = true;
        self.on_cancel(ctx);
        let base = self.base_mut();
        base.paused = None;
        base.queue.clear();
    }
}
