//! Per-surface input router.
//!
//! The router turns raw device samples into normalized [`InputSample`]s, walks its recognizers
//! in priority order and applies the arbitration they request. One router exists per surface
//! with at least one attached recognizer.

use crate::engine::{DetachFilter, SurfaceHost};
use crate::kind::GestureKind;
use crate::recognizer::{
    Arbitration, GestureBase, InputSample, Pauser, PhaseContext, Recognizer, RecognizerId,
    TimerHost, TimerTag,
};
use gestura_core::{
    DeviceModel, Phase, Point, PointerId, RawEvent, Rect, Result, Scheduler, SurfaceId,
};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};

/// Outcome of handling one raw event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispatch {
    /// Phase dispatched to recognizers, if the event was not ignored.
    pub phase: Option<Phase>,
    /// The transport should suppress the platform's default handling.
    pub prevent_default: bool,
}

impl Dispatch {
    /// Check if the event reached the recognizers.
    #[must_use]
    pub const fn is_dispatched(&self) -> bool {
        self.phase.is_some()
    }
}

pub(crate) struct Entry {
    id: RecognizerId,
    kind: GestureKind,
    key: (i32, u64),
    recognizer: RefCell<Box<dyn Recognizer>>,
    detached: Cell<bool>,
}

impl Entry {
    fn with_base<T>(&self, f: impl FnOnce(&GestureBase) -> T) -> Option<T> {
        self.recognizer.try_borrow().ok().map(|r| f(r.base()))
    }
}

#[derive(Debug, Default)]
struct Interaction {
    model: Option<DeviceModel>,
    started: bool,
    ended: bool,
    listening: bool,
    origin: Option<SurfaceId>,
    rect: Rect,
    points: Vec<Point>,
    page_points: Vec<Point>,
    identities: Vec<PointerId>,
    down: Vec<PointerId>,
    button: Option<u8>,
    last: Option<Rc<InputSample>>,
}

impl Interaction {
    const fn is_active(&self) -> bool {
        self.started && !self.ended
    }

    fn accepts(&self, model: DeviceModel) -> bool {
        self.listening && self.model == Some(model)
    }
}

/// Input router for one surface.
pub struct Router {
    surface: SurfaceId,
    me: Weak<Router>,
    host: Rc<dyn SurfaceHost>,
    scheduler: Rc<dyn Scheduler>,
    entries: RefCell<Vec<Rc<Entry>>>,
    sorted: RefCell<Vec<Rc<Entry>>>,
    deferred: RefCell<Vec<Rc<Entry>>>,
    state: RefCell<Interaction>,
}

impl Router {
    /// Create a router for `surface`.
    #[must_use]
    pub fn new(
        surface: SurfaceId,
        host: Rc<dyn SurfaceHost>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Rc<Self> {
        Rc::new_cyclic(|me| Self {
            surface,
            me: me.clone(),
            host,
            scheduler,
            entries: RefCell::new(Vec::new()),
            sorted: RefCell::new(Vec::new()),
            deferred: RefCell::new(Vec::new()),
            state: RefCell::new(Interaction::default()),
        })
    }

    /// Surface this router serves.
    #[must_use]
    pub const fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// Timer access for a recognizer about to be added.
    #[must_use]
    pub fn timer_host(&self, owner: RecognizerId) -> TimerHost {
        TimerHost::new(Rc::clone(&self.scheduler), self.me.clone(), owner)
    }

    /// Number of attached recognizers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Check if no recognizer is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Check if a recognizer of `kind` is attached.
    #[must_use]
    pub fn contains_kind(&self, kind: &str) -> bool {
        self.entries.borrow().iter().any(|e| e.kind.as_str() == kind)
    }

    /// Attached recognizers in dispatch order.
    #[must_use]
    pub fn dispatch_order(&self) -> Vec<(RecognizerId, GestureKind)> {
        self.sorted
            .borrow()
            .iter()
            .map(|e| (e.id, e.kind.clone()))
            .collect()
    }

    /// Add a recognizer. `seq` breaks precedence ties.
    pub fn add(&self, seq: u64, recognizer: Box<dyn Recognizer>) {
        let base = recognizer.base();
        let (id, kind, key) = (base.id(), base.kind().clone(), (base.options().precedence, seq));
        let entry = Rc::new(Entry {
            id,
            kind,
            key,
            recognizer: RefCell::new(recognizer),
            detached: Cell::new(false),
        });
        debug!(
            surface = %self.surface,
            id = entry.id.0,
            kind = %entry.kind,
            key = ?entry.key,
            "recognizer attached"
        );
        self.entries.borrow_mut().push(entry);
        self.resort();
    }

    /// Detach the recognizers selected by `filter`. Returns how many were removed.
    pub fn remove(&self, filter: &DetachFilter) -> usize {
        let removed: Vec<Rc<Entry>> = {
            let mut entries = self.entries.borrow_mut();
            let (gone, kept): (Vec<_>, Vec<_>) = entries
                .drain(..)
                .partition(|e| filter.matches(e.id, &e.kind));
            *entries = kept;
            gone
        };
        if removed.is_empty() {
            return 0;
        }
        self.resort();
        let sample = self.current_sample();
        for entry in &removed {
            entry.detached.set(true);
            debug!(surface = %self.surface, id = entry.id.0, kind = %entry.kind, "detached");
            if !self.run(entry, &sample, |r, ctx| r.on_detach(ctx)) {
                // Still running; cleaned up once its call returns.
                self.deferred.borrow_mut().push(Rc::clone(entry));
            }
        }
        removed.len()
    }

    fn resort(&self) {
        let mut sorted = self.entries.borrow().clone();
        sorted.sort_by_key(|e| e.key);
        *self.sorted.borrow_mut() = sorted;
    }

    fn snapshot(&self) -> Vec<Rc<Entry>> {
        self.sorted.borrow().clone()
    }

    /// Handle one raw device sample.
    pub fn handle(&self, event: &RawEvent) -> Result<Dispatch> {
        event.validate()?;
        let Some(phase) = event.phase.phase() else {
            debug!(surface = %self.surface, "native drag started");
            self.arbitrate(None, Arbitration::CancelAllStarted);
            return Ok(Dispatch::default());
        };
        let prepared = match phase {
            Phase::Start => self.begin(event),
            Phase::Update => self.track(event),
            Phase::End | Phase::Cancel => self.finish(event),
        };
        let Some(sample) = prepared else {
            trace!(surface = %self.surface, ?phase, model = %event.model, "event ignored");
            return Ok(Dispatch::default());
        };
        self.dispatch(phase, &sample);
        Ok(Dispatch {
            phase: Some(phase),
            prevent_default: self.prevents_default(),
        })
    }

    fn begin(&self, event: &RawEvent) -> Option<Rc<InputSample>> {
        let reset = {
            let state = self.state.borrow();
            if state.is_active() && state.model != Some(event.model) {
                return None;
            }
            state.started && state.ended
        };
        if reset {
            self.reset_interaction();
        }
        let mut state = self.state.borrow_mut();
        if !state.started {
            state.started = true;
            state.listening = true;
            state.model = Some(event.model);
            state.origin = Some(event.target.unwrap_or(self.surface));
            state.rect = self.host.rect_of(self.surface);
        }
        for contact in &event.contacts {
            if let Some(id) = contact.id {
                if !state.down.contains(&id) {
                    state.down.push(id);
                }
            }
        }
        if event.button.is_some() {
            state.button = event.button;
        }
        Some(self.normalize(&mut state, event))
    }

    fn track(&self, event: &RawEvent) -> Option<Rc<InputSample>> {
        let mut state = self.state.borrow_mut();
        if !state.accepts(event.model) {
            return None;
        }
        Some(self.normalize(&mut state, event))
    }

    fn finish(&self, event: &RawEvent) -> Option<Rc<InputSample>> {
        let mut state = self.state.borrow_mut();
        if !state.accepts(event.model) {
            return None;
        }
        if event.model.is_identity_tracked() {
            self.record_pointers(&mut state, event, false);
            for contact in &event.contacts {
                state.down.retain(|id| Some(*id) != contact.id);
            }
            if !state.down.is_empty() && event.phase.phase() == Some(Phase::End) {
                // Other pointers are still down; the lifted one keeps its last position.
                self.project(&mut state);
                return None;
            }
        }
        state.listening = false;
        state.ended = true;
        Some(self.project(&mut state))
    }

    fn reset_interaction(&self) {
        trace!(surface = %self.surface, "new interaction");
        *self.state.borrow_mut() = Interaction::default();
        for entry in self.snapshot() {
            match entry.recognizer.try_borrow_mut() {
                Ok(mut recognizer) => recognizer.reset(),
                Err(_) => warn!(id = entry.id.0, "recognizer busy, not reset"),
            }
        }
    }

    /// Fold an identity-tracked sample into the index space. Unknown identities get a new
    /// index only when `grow` is set; a lift never adds a contact.
    fn record_pointers(&self, state: &mut Interaction, event: &RawEvent, grow: bool) {
        for contact in &event.contacts {
            let Some(id) = contact.id else {
                continue;
            };
            match state.identities.iter().position(|known| *known == id) {
                Some(index) => state.page_points[index] = contact.position,
                None if grow => {
                    state.identities.push(id);
                    state.page_points.push(contact.position);
                }
                None => trace!(surface = %self.surface, pointer = id.0, "lift for unknown pointer"),
            }
        }
    }

    fn normalize(&self, state: &mut Interaction, event: &RawEvent) -> Rc<InputSample> {
        match event.model {
            DeviceModel::Mouse | DeviceModel::Touch => {
                if !event.contacts.is_empty() {
                    state.page_points = event.contacts.iter().map(|c| c.position).collect();
                }
            }
            DeviceModel::Pointer => self.record_pointers(state, event, true),
        }
        self.project(state)
    }

    /// Transform the page points into the origin's space and record the sample.
    fn project(&self, state: &mut Interaction) -> Rc<InputSample> {
        let origin = state.origin.unwrap_or(self.surface);
        state.points = state
            .page_points
            .iter()
            .map(|p| self.host.transform(origin, *p))
            .collect();
        let sample = Rc::new(InputSample {
            model: state.model.unwrap_or(DeviceModel::Mouse),
            points: state.points.clone(),
            page_points: state.page_points.clone(),
            rect: state.rect,
            button: state.button,
            timestamp: self.scheduler.now(),
        });
        state.last = Some(Rc::clone(&sample));
        sample
    }

    /// Latest sample restamped with the current time.
    fn current_sample(&self) -> Rc<InputSample> {
        let now = self.scheduler.now();
        match &self.state.borrow().last {
            Some(last) => Rc::new(last.at(now)),
            None => Rc::new(InputSample::empty(now)),
        }
    }

    fn dispatch(&self, phase: Phase, sample: &Rc<InputSample>) {
        trace!(surface = %self.surface, ?phase, points = sample.points.len(), "dispatching");
        for entry in self.snapshot() {
            if entry.detached.get() {
                continue;
            }
            if !self.run(&entry, sample, |r, ctx| r.deliver(phase, ctx)) {
                warn!(id = entry.id.0, ?phase, "recognizer busy, phase skipped");
            }
        }
    }

    /// Run one recognizer hook, then apply the arbitration it requested.
    /// Returns false if the recognizer is already running further up the stack.
    fn run(
        &self,
        entry: &Rc<Entry>,
        sample: &Rc<InputSample>,
        f: impl FnOnce(&mut dyn Recognizer, &mut PhaseContext),
    ) -> bool {
        let mut ctx = PhaseContext::new(Rc::clone(sample));
        {
            let Ok(mut recognizer) = entry.recognizer.try_borrow_mut() else {
                return false;
            };
            f(recognizer.as_mut(), &mut ctx);
        }
        for command in ctx.into_commands() {
            self.arbitrate(Some(entry), command);
        }
        self.flush_deferred();
        true
    }

    fn flush_deferred(&self) {
        let pending = std::mem::take(&mut *self.deferred.borrow_mut());
        if pending.is_empty() {
            return;
        }
        let sample = self.current_sample();
        for entry in pending {
            if !self.run(&entry, &sample, |r, ctx| r.on_detach(ctx)) {
                self.deferred.borrow_mut().push(entry);
            }
        }
    }

    fn cancel_entry(&self, entry: &Rc<Entry>) {
        if entry.detached.get() {
            return;
        }
        let sample = self.current_sample();
        if !self.run(entry, &sample, |r, ctx| r.cancel(ctx)) {
            warn!(id = entry.id.0, "recognizer busy, cancel skipped");
        }
    }

    /// Apply one arbitration request. `source` is the requesting recognizer, `None` for the
    /// application.
    pub(crate) fn arbitrate(&self, source: Option<&Rc<Entry>>, command: Arbitration) {
        let source_id = source.map(|s| s.id);
        debug!(surface = %self.surface, source = ?source_id, ?command, "arbitration");
        let others = self
            .snapshot()
            .into_iter()
            .filter(|e| Some(e.id) != source_id && !e.detached.get());
        match command {
            Arbitration::CancelOne(id) => {
                let target = self.snapshot().into_iter().find(|e| e.id == id);
                if let Some(entry) = target {
                    self.cancel_entry(&entry);
                }
            }
            Arbitration::CancelOthers => {
                let Some(source) = source else {
                    return;
                };
                for entry in others.filter(|e| e.kind != source.kind) {
                    self.cancel_entry(&entry);
                }
            }
            Arbitration::CancelMatching(filter) => {
                for entry in others {
                    if entry.with_base(|b| filter.accepts(entry.id, b)) == Some(true) {
                        self.cancel_entry(&entry);
                    }
                }
            }
            Arbitration::CancelAllStarted => {
                for entry in others {
                    if entry.with_base(|b| b.is_started()) == Some(true) {
                        self.cancel_entry(&entry);
                    }
                }
            }
            Arbitration::Pause(filter) => {
                let by = source_id.map_or(Pauser::Engine, Pauser::Recognizer);
                for entry in others {
                    let Ok(mut recognizer) = entry.recognizer.try_borrow_mut() else {
                        continue;
                    };
                    if filter.accepts(entry.id, recognizer.base()) {
                        recognizer.base_mut().pause(by);
                    }
                }
            }
            Arbitration::Resume { replay } => {
                for entry in others {
                    self.resume_entry(&entry, source_id, replay);
                }
            }
        }
    }

    fn resume_entry(&self, entry: &Rc<Entry>, source: Option<RecognizerId>, replay: bool) {
        let queue = {
            let Ok(mut recognizer) = entry.recognizer.try_borrow_mut() else {
                return;
            };
            let owned = match (recognizer.base().paused_by(), source) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(by), Some(id)) => by == Pauser::Recognizer(id),
            };
            if !owned {
                return;
            }
            recognizer.base_mut().unpause()
        };
        trace!(id = entry.id.0, replay, queued = queue.len(), "resumed");
        if !replay {
            self.cancel_entry(entry);
            return;
        }
        for (phase, sample) in queue {
            if entry.detached.get() {
                break;
            }
            self.run(entry, &sample, |r, ctx| r.deliver(phase, ctx));
        }
    }

    /// Route a fired timer to its recognizer.
    pub(crate) fn fire_timer(&self, owner: RecognizerId, tag: TimerTag) {
        let target = self.entries.borrow().iter().find(|e| e.id == owner).cloned();
        let Some(entry) = target else {
            return;
        };
        let sample = self.current_sample();
        if !self.run(&entry, &sample, |r, ctx| r.on_timer(tag, ctx)) {
            warn!(id = owner.0, ?tag, "recognizer busy, timer skipped");
        }
    }

    fn prevents_default(&self) -> bool {
        self.snapshot()
            .iter()
            .any(|e| !e.detached.get() && e.with_base(|b| b.claims_default()) == Some(true))
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("surface", &self.surface)
            .field("recognizers", &self.dispatch_order())
            .field("state", &self.state.borrow())
            .finish_non_exhaustive()
    }
}
