// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::{Arc, Weak};

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Rect;
use understory_exposure::{
    ElementFlags, ExposureState, ExposureTracker, Layer, Signal, VisibilityProbe,
};

fn populated(n: usize) -> (ExposureTracker<Weak<()>>, Vec<Arc<()>>, Vec<String>) {
    let tracker = ExposureTracker::new();
    let mut owners = Vec::with_capacity(n);
    let mut ids = Vec::with_capacity(n);
    for i in 0..n {
        let owner = Arc::new(());
        let id = format!("tool-{i}");
        tracker.register(id.as_str(), Arc::downgrade(&owner)).unwrap();
        owners.push(owner);
        ids.push(id);
    }
    (tracker, owners, ids)
}

/// A modal opening and closing over every tracked element.
fn bench_modal_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply");
    for &n in &[64usize, 512, 4096] {
        let (tracker, _owners, ids) = populated(n);
        group.throughput(Throughput::Elements((n * 2) as u64));
        group.bench_function(format!("modal_cycle_n{n}"), |b| {
            b.iter(|| {
                for id in &ids {
                    tracker.apply(
                        id,
                        Signal::Visibility {
                            visible: true,
                            obstructed: true,
                        },
                    );
                }
                for id in &ids {
                    tracker.apply(
                        id,
                        Signal::Visibility {
                            visible: true,
                            obstructed: false,
                        },
                    );
                }
            });
        });
    }
    group.finish();
}

/// Signals that do not change the state: recompute only, no events.
fn bench_steady_state(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply");
    let (tracker, _owners, ids) = populated(512);
    for id in &ids {
        tracker.apply(id, Signal::Interactivity(ElementFlags::DISABLED));
    }
    group.throughput(Throughput::Elements(ids.len() as u64));
    group.bench_function("steady_disabled_n512", |b| {
        b.iter(|| {
            for id in &ids {
                tracker.apply(id, Signal::Interactivity(ElementFlags::DISABLED));
            }
            black_box(tracker.state(&ids[0]).unwrap());
        });
    });
    group.finish();
}

fn bench_wait_satisfied(c: &mut Criterion) {
    let mut group = c.benchmark_group("wait_for_state");
    let (tracker, _owners, ids) = populated(64);
    group.bench_function("already_present", |b| {
        b.iter(|| {
            let fut = tracker
                .wait_for_state(&ids[7], ExposureState::Present, std::time::Duration::from_secs(1))
                .unwrap();
            black_box(fut);
        });
    });
    group.finish();
}

fn bench_register(c: &mut Criterion) {
    let mut group = c.benchmark_group("register");
    for &n in &[512usize, 4096] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("fresh_n{n}"), |b| {
            b.iter_batched(|| n, |n| black_box(populated(n)), BatchSize::SmallInput);
        });
    }
    group.finish();
}

fn bench_probe(c: &mut Criterion) {
    let mut group = c.benchmark_group("visibility_probe");
    let probe = VisibilityProbe::new(Rect::new(0.0, 0.0, 1920.0, 1080.0));
    let layers: Vec<Layer> = (0..16_i32)
        .map(|i| Layer {
            bounds: Rect::from_origin_size((f64::from(i) * 100.0, 50.0), (90.0, 90.0)),
            z_index: i * 10,
            modal: false,
        })
        .collect();
    let elements: Vec<Rect> = (0..1024_i32)
        .map(|i| {
            let x = f64::from(i % 64) * 30.0;
            let y = f64::from(i / 64) * 30.0;
            Rect::new(x, y, x + 24.0, y + 24.0)
        })
        .collect();
    group.throughput(Throughput::Elements(elements.len() as u64));
    group.bench_function("observe_1024_under_16_layers", |b| {
        b.iter(|| {
            let mut obstructed = 0_usize;
            for r in &elements {
                if let Signal::Visibility {
                    obstructed: true, ..
                } = probe.observe(*r, 0, &layers)
                {
                    obstructed += 1;
                }
            }
            black_box(obstructed);
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_modal_cycle,
    bench_steady_state,
    bench_wait_satisfied,
    bench_register,
    bench_probe
);
criterion_main!(benches);
