//! Surface registry and the public engine API.

use crate::binder::Binder;
use crate::kind::{GestureFactory, GestureKind, KindRegistry};
use crate::options::GestureConfig;
use crate::recognizer::{Arbitration, RecognizerId, RecognizerInit, RivalFilter};
use crate::router::{Dispatch, Router};
use gestura_core::{GestureError, Point, RawEvent, Rect, Result, Scheduler, SurfaceId};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Layout and listener services consumed by the engine.
pub trait SurfaceHost {
    /// Page-space bounds of a surface.
    fn rect_of(&self, surface: SurfaceId) -> Rect;

    /// Map a page point into the space of the element an interaction started on.
    fn transform(&self, _origin: SurfaceId, point: Point) -> Point {
        point
    }

    /// Called when a surface gains its first recognizer or loses its last one.
    fn set_listening(&self, _surface: SurfaceId, _listening: bool) {}
}

/// Host with fixed rects and identity transforms.
#[derive(Debug, Default)]
pub struct StaticLayout {
    rects: RefCell<HashMap<SurfaceId, Rect>>,
    listening: RefCell<HashSet<SurfaceId>>,
}

impl StaticLayout {
    /// Create an empty layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`StaticLayout::set_rect`].
    #[must_use]
    pub fn with_rect(self, surface: SurfaceId, rect: Rect) -> Self {
        self.set_rect(surface, rect);
        self
    }

    /// Set the bounds of a surface.
    pub fn set_rect(&self, surface: SurfaceId, rect: Rect) {
        self.rects.borrow_mut().insert(surface, rect);
    }

    /// Check if the engine asked for input on a surface.
    #[must_use]
    pub fn is_listening(&self, surface: SurfaceId) -> bool {
        self.listening.borrow().contains(&surface)
    }
}

impl SurfaceHost for StaticLayout {
    fn rect_of(&self, surface: SurfaceId) -> Rect {
        self.rects
            .borrow()
            .get(&surface)
            .copied()
            .unwrap_or_default()
    }

    fn set_listening(&self, surface: SurfaceId, listening: bool) {
        let mut set = self.listening.borrow_mut();
        if listening {
            set.insert(surface);
        } else {
            set.remove(&surface);
        }
    }
}

/// Selects recognizers to detach. An empty filter selects everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetachFilter {
    /// Only this kind.
    pub kind: Option<GestureKind>,
    /// Only this recognizer.
    pub id: Option<RecognizerId>,
}

impl DetachFilter {
    /// Every recognizer.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Every recognizer of a kind.
    #[must_use]
    pub fn kind(kind: impl Into<GestureKind>) -> Self {
        Self {
            kind: Some(kind.into()),
            id: None,
        }
    }

    /// One recognizer.
    #[must_use]
    pub fn id(id: RecognizerId) -> Self {
        Self {
            kind: None,
            id: Some(id),
        }
    }

    /// Check a recognizer against the filter.
    #[must_use]
    pub fn matches(&self, id: RecognizerId, kind: &GestureKind) -> bool {
        self.kind.as_ref().map_or(true, |k| k == kind) && self.id.map_or(true, |i| i == id)
    }
}

struct EngineInner {
    host: Rc<dyn SurfaceHost>,
    scheduler: Rc<dyn Scheduler>,
    config: Rc<GestureConfig>,
    kinds: RefCell<KindRegistry>,
    surfaces: RefCell<HashMap<SurfaceId, Rc<Router>>>,
    next_id: Cell<u64>,
}

/// Gesture engine: kind registry, surface registry and input entry point.
///
/// Cloning yields another handle to the same engine, so callbacks can capture one to attach or
/// detach while gestures are being dispatched.
#[derive(Clone)]
pub struct GestureEngine {
    inner: Rc<EngineInner>,
}

impl GestureEngine {
    /// Create an engine with the built-in kinds and default configuration.
    pub fn new(host: Rc<dyn SurfaceHost>, scheduler: Rc<dyn Scheduler>) -> Self {
        Self::with_config(host, scheduler, GestureConfig::default())
    }

    /// Create an engine with an explicit configuration.
    pub fn with_config(
        host: Rc<dyn SurfaceHost>,
        scheduler: Rc<dyn Scheduler>,
        config: GestureConfig,
    ) -> Self {
        Self {
            inner: Rc::new(EngineInner {
                host,
                scheduler,
                config: Rc::new(config),
                kinds: RefCell::new(KindRegistry::with_builtins()),
                surfaces: RefCell::new(HashMap::new()),
                next_id: Cell::new(1),
            }),
        }
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.inner.config
    }

    fn router(&self, surface: SurfaceId) -> Option<Rc<Router>> {
        self.inner.surfaces.borrow().get(&surface).cloned()
    }

    /// Attach a recognizer of `kind` to `surface`.
    pub fn attach(&self, surface: SurfaceId, kind: &str, binder: Binder) -> Result<RecognizerId> {
        let factory = self
            .inner
            .kinds
            .borrow()
            .get(kind)
            .ok_or_else(|| GestureError::UnknownKind(kind.to_string()))?;
        let kind = GestureKind::new(kind);
        binder.require_callbacks(&kind)?;

        let router = match self.router(surface) {
            Some(router) => router,
            None => {
                let router = Router::new(
                    surface,
                    Rc::clone(&self.inner.host),
                    Rc::clone(&self.inner.scheduler),
                );
                self.inner
                    .surfaces
                    .borrow_mut()
                    .insert(surface, Rc::clone(&router));
                self.inner.host.set_listening(surface, true);
                debug!(%surface, "surface registered");
                router
            }
        };

        let seq = self.inner.next_id.get();
        self.inner.next_id.set(seq + 1);
        let id = RecognizerId(seq);
        let init = RecognizerInit {
            defaults: self.inner.config.defaults_for(&kind),
            kind,
            id,
            binder,
            timers: router.timer_host(id),
            config: Rc::clone(&self.inner.config),
        };
        router.add(seq, factory(init));
        Ok(id)
    }

    /// Detach the recognizers selected by `filter`. Unknown surfaces and kinds are ignored.
    /// Returns how many were detached.
    pub fn detach(&self, surface: SurfaceId, filter: &DetachFilter) -> usize {
        let Some(router) = self.router(surface) else {
            return 0;
        };
        let removed = router.remove(filter);
        if router.is_empty() {
            // A callback may have re-registered the surface with a new router meanwhile.
            let mut surfaces = self.inner.surfaces.borrow_mut();
            if surfaces
                .get(&surface)
                .is_some_and(|current| Rc::ptr_eq(current, &router))
            {
                surfaces.remove(&surface);
                drop(surfaces);
                self.inner.host.set_listening(surface, false);
                debug!(%surface, "surface released");
            }
        }
        removed
    }

    /// Feed one raw event for `surface`.
    pub fn handle(&self, surface: SurfaceId, event: &RawEvent) -> Result<Dispatch> {
        let router = self
            .router(surface)
            .ok_or(GestureError::UnknownSurface(surface))?;
        router.handle(event)
    }

    /// Register or replace a gesture kind.
    pub fn register_kind(&self, kind: impl Into<GestureKind>, factory: GestureFactory) {
        let kind = kind.into();
        debug!(%kind, "kind registered");
        self.inner.kinds.borrow_mut().add(kind, factory);
    }

    /// Remove a gesture kind, detaching every attachment of it. Returns true if it existed.
    pub fn unregister_kind(&self, kind: &str) -> bool {
        if !self.inner.kinds.borrow_mut().remove(kind) {
            return false;
        }
        let surfaces: Vec<SurfaceId> = self.inner.surfaces.borrow().keys().copied().collect();
        let filter = DetachFilter::kind(kind);
        for surface in surfaces {
            self.detach(surface, &filter);
        }
        debug!(kind, "kind unregistered");
        true
    }

    /// Registered kind names in sorted order.
    #[must_use]
    pub fn kinds(&self) -> Vec<String> {
        self.inner
            .kinds
            .borrow()
            .kinds()
            .map(str::to_string)
            .collect()
    }

    /// Cancel every started recognizer on a surface.
    pub fn cancel_all(&self, surface: SurfaceId) {
        if let Some(router) = self.router(surface) {
            router.arbitrate(None, Arbitration::CancelAllStarted);
        }
    }

    /// Pause started recognizers of `kind` on a surface, except `excluding`.
    pub fn pause(&self, surface: SurfaceId, kind: &str, excluding: Option<RecognizerId>) {
        if let Some(router) = self.router(surface) {
            let filter = RivalFilter::kind(GestureKind::new(kind))
                .started()
                .excluding(excluding);
            router.arbitrate(None, Arbitration::Pause(filter));
        }
    }

    /// Resume every paused recognizer on a surface, replaying or discarding buffered phases.
    pub fn resume(&self, surface: SurfaceId, replay: bool) {
        if let Some(router) = self.router(surface) {
            router.arbitrate(None, Arbitration::Resume { replay });
        }
    }

    /// Check if a recognizer of `kind` is attached to a surface.
    #[must_use]
    pub fn is_attached(&self, surface: SurfaceId, kind: &str) -> bool {
        self.router(surface)
            .is_some_and(|router| router.contains_kind(kind))
    }

    /// Number of surfaces with at least one recognizer.
    #[must_use]
    pub fn surface_count(&self) -> usize {
        self.inner.surfaces.borrow().len()
    }

    /// Number of recognizers attached to a surface.
    #[must_use]
    pub fn recognizer_count(&self, surface: SurfaceId) -> usize {
        self.router(surface).map_or(0, |router| router.len())
    }

    /// Recognizers of a surface in dispatch order.
    #[must_use]
    pub fn dispatch_order(&self, surface: SurfaceId) -> Vec<(RecognizerId, GestureKind)> {
        self.router(surface)
            .map(|router| router.dispatch_order())
            .unwrap_or_default()
    }
}

impl fmt::Debug for GestureEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureEngine")
            .field("kinds", &self.inner.kinds.borrow())
            .field("surfaces", &self.surface_count())
            .finish_non_exhaustive()
    }
}
