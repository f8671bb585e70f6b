// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_navigation::NavigationPlanner;

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn ctx(x: usize, y: usize) -> String {
    format!("c{x}_{y}")
}

/// `n × n` contexts, each linked right and down (and back) with random weights.
fn grid_planner(n: usize) -> NavigationPlanner {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    let mut p = NavigationPlanner::new();
    for y in 0..n {
        for x in 0..n {
            p.register_context(ctx(x, y), "grid", None).unwrap();
        }
    }
    for y in 0..n {
        for x in 0..n {
            let here = ctx(x, y);
            if x + 1 < n {
                let right = ctx(x + 1, y);
                p.register_edge_weighted(&here, &right, "right", 0.5 + rng.next_f64())
                    .unwrap();
                p.register_edge_weighted(&right, &here, "left", 0.5 + rng.next_f64())
                    .unwrap();
            }
            if y + 1 < n {
                let down = ctx(x, y + 1);
                p.register_edge_weighted(&here, &down, "down", 0.5 + rng.next_f64())
                    .unwrap();
                p.register_edge_weighted(&down, &here, "up", 0.5 + rng.next_f64())
                    .unwrap();
            }
        }
    }
    p
}

/// A shallow app: one hub with `tabs` tabs, each with `per_tab` dialogs holding one tool.
fn app_planner(tabs: usize, per_tab: usize) -> NavigationPlanner {
    let mut p = NavigationPlanner::new();
    p.register_context("app", "App", None).unwrap();
    for t in 0..tabs {
        let tab = format!("app.tab{t}");
        p.register_context(tab.as_str(), "Tab", Some("app")).unwrap();
        p.register_edge("app", &tab, format!("open-tab{t}")).unwrap();
        p.register_edge(&tab, "app", "home").unwrap();
        for d in 0..per_tab {
            let dialog = format!("{tab}.dialog{d}");
            p.register_context(dialog.as_str(), "Dialog", Some(tab.as_str())).unwrap();
            p.register_edge(&tab, &dialog, format!("open-dialog{d}"))
                .unwrap();
            p.register_edge(&dialog, &tab, "close").unwrap();
            p.register_tool_in_context(format!("{dialog}.ok"), &dialog)
                .unwrap();
        }
    }
    p.set_current_context("app").unwrap();
    p
}

fn bench_compute_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_path");
    for &n in &[8usize, 16, 32] {
        let planner = grid_planner(n);
        let from = ctx(0, 0);
        let to = ctx(n - 1, n - 1);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("grid_corner_to_corner_n{n}"), |b| {
            b.iter(|| {
                let path = planner.compute_path(&from, &to).unwrap();
                black_box(path.total_weight);
            });
        });
    }
    group.finish();
}

fn bench_plan_to_tool(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_to_tool");
    for &(tabs, per_tab) in &[(4usize, 4usize), (16, 8), (32, 16)] {
        let planner = app_planner(tabs, per_tab);
        let tool = format!("app.tab{}.dialog{}.ok", tabs - 1, per_tab - 1);
        group.bench_function(format!("app_tabs{tabs}_dialogs{per_tab}"), |b| {
            b.iter(|| {
                let path = planner.plan_to_tool(&tool).unwrap();
                black_box(path.len());
            });
        });
    }
    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("register");
    for &n in &[16usize, 32] {
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("grid_n{n}"), |b| {
            b.iter_batched(|| n, |n| black_box(grid_planner(n)), BatchSize::SmallInput);
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compute_path, bench_plan_to_tool, bench_build);
criterion_main!(benches);
