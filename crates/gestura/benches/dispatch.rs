//! Benchmarks for input dispatch through the gesture router.
//!
//! Measures a full press/drag/release interaction against surfaces carrying
//! a growing number of competing recognizers.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gestura::{Binder, GestureEngine, StaticLayout};
use gestura_core::{ManualScheduler, Point, RawEvent, RawPhase, Rect, SurfaceId};
use std::rc::Rc;

const SURFACE: SurfaceId = SurfaceId::new(1);
const KINDS: [&str; 6] = ["tap", "doubletap", "longtap", "swipe", "pinch", "rotate"];

fn engine(recognizers: usize) -> (GestureEngine, Rc<ManualScheduler>) {
    let layout = StaticLayout::new().with_rect(SURFACE, Rect::new(0.0, 0.0, 400.0, 400.0));
    let clock = Rc::new(ManualScheduler::new());
    let engine = GestureEngine::new(Rc::new(layout), clock.clone());
    for i in 0..recognizers {
        let binder = Binder::new().on_end(|e| {
            black_box(e.data);
        });
        let _ = engine.attach(SURFACE, KINDS[i % KINDS.len()], binder);
    }
    (engine, clock)
}

// =============================================================================
// Mouse Interaction Benchmarks
// =============================================================================

fn bench_mouse_drag(c: &mut Criterion) {
    let mut group = c.benchmark_group("mouse_drag");

    for count in [1, 6, 24, 96].iter() {
        let (engine, clock) = engine(*count);

        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| {
                let down = RawEvent::mouse(RawPhase::Start, Point::new(10.0, 10.0));
                let _ = engine.handle(SURFACE, &down);
                for step in 1..=20 {
                    clock.advance(8);
                    let p = Point::new(10.0 + step as f32 * 10.0, 10.0);
                    let moved = RawEvent::mouse(RawPhase::Update, p);
                    let _ = black_box(engine.handle(SURFACE, &moved));
                }
                let up = RawEvent::mouse(RawPhase::End, Point::new(210.0, 10.0));
                let _ = engine.handle(SURFACE, &up);
                clock.advance(2_000);
            });
        });
    }

    group.finish();
}

fn bench_mouse_tap(c: &mut Criterion) {
    let mut group = c.benchmark_group("mouse_tap");

    for count in [1, 6, 24, 96].iter() {
        let (engine, clock) = engine(*count);
        let p = Point::new(50.0, 50.0);

        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| {
                let _ = engine.handle(SURFACE, &RawEvent::mouse(RawPhase::Start, black_box(p)));
                let _ = engine.handle(SURFACE, &RawEvent::mouse(RawPhase::End, black_box(p)));
                clock.advance(2_000);
            });
        });
    }

    group.finish();
}

// =============================================================================
// Touch Interaction Benchmarks
// =============================================================================

fn bench_touch_pinch(c: &mut Criterion) {
    let mut group = c.benchmark_group("touch_pinch");

    for count in [2, 12, 48].iter() {
        let (engine, clock) = engine(*count);

        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| {
                let start = [Point::new(100.0, 100.0), Point::new(140.0, 100.0)];
                let _ = engine.handle(SURFACE, &RawEvent::touch(RawPhase::Start, &start));
                for step in 1..=20 {
                    let spread = 140.0 + step as f32 * 5.0;
                    let points = [
                        Point::new(100.0, 100.0),
                        Point::new(spread, 100.0 + step as f32),
                    ];
                    let moved = RawEvent::touch(RawPhase::Update, &points);
                    let _ = black_box(engine.handle(SURFACE, &moved));
                }
                let _ = engine.handle(SURFACE, &RawEvent::touch(RawPhase::End, &[]));
                clock.advance(2_000);
            });
        });
    }

    group.finish();
}

// =============================================================================
// Registry Benchmarks
// =============================================================================

fn bench_attach_detach(c: &mut Criterion) {
    c.bench_function("attach_detach_all_kinds", |b| {
        b.iter(|| {
            let (engine, _) = engine(0);
            for kind in KINDS {
                let _ = engine.attach(SURFACE, kind, Binder::new().on_end(|_| {}));
            }
            black_box(engine.detach(SURFACE, &gestura::DetachFilter::all()))
        });
    });
}

criterion_group!(
    benches,
    bench_mouse_drag,
    bench_mouse_tap,
    bench_touch_pinch,
    bench_attach_detach,
);
criterion_main!(benches);
