//! Performance benchmarks for stack mutations
//!
//! Measures push/pop cycles, deep-stack replacement and save/restore on a
//! headless container.
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use folio::adapters::mock::{LifecycleLog, ScriptedFactory};
use folio::adapters::HeadlessContainer;
use folio::config::{EngineConfig, RetentionPolicy};
use folio::factory::FactoryRegistry;
use folio::stack::StackEngine;

fn engine(log: &LifecycleLog, retention: RetentionPolicy) -> StackEngine {
    let mut registry = FactoryRegistry::new();
    ScriptedFactory::register(&mut registry, log);
    let mut engine = StackEngine::new(HeadlessContainer::new_ref())
        .with_config(EngineConfig::default().with_retention(retention))
        .with_registry(registry);
    engine.on_start();
    engine.on_resume();
    engine
}

fn settle(engine: &mut StackEngine) {
    while !engine.tick() {}
}

/// Build a settled stack of `depth` pages.
fn filled(log: &LifecycleLog, retention: RetentionPolicy, depth: usize) -> StackEngine {
    let mut engine = engine(log, retention);
    for i in 0..depth {
        engine.push(ScriptedFactory::new(format!("p{i}"), log)).unwrap();
        settle(&mut engine);
    }
    engine
}

/// Benchmark a push followed by a pop on stacks of varying depth
fn bench_push_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("push_pop");

    for retention in [RetentionPolicy::UnmountAndRetain, RetentionPolicy::KeepMounted] {
        for depth in [1, 10, 50].iter() {
            let log = LifecycleLog::new();
            let mut engine = filled(&log, retention, *depth);

            group.bench_with_input(
                BenchmarkId::new(format!("{retention:?}"), depth),
                depth,
                |b, _| {
                    b.iter(|| {
                        engine.push(ScriptedFactory::new("top", &log)).unwrap();
                        settle(&mut engine);
                        let popped = engine.pop().unwrap();
                        settle(&mut engine);
                        log.clear();
                        black_box(popped)
                    });
                },
            );
        }
    }

    group.finish();
}

/// Benchmark replacing everything above the bottom page
fn bench_replace_except_first(c: &mut Criterion) {
    let mut group = c.benchmark_group("replace_except_first");

    for depth in [2, 10, 50].iter() {
        group.throughput(Throughput::Elements(*depth as u64));
        group.bench_with_input(BenchmarkId::from_parameter(depth), depth, |b, &depth| {
            b.iter_batched(
                || {
                    let log = LifecycleLog::new();
                    let engine = filled(&log, RetentionPolicy::UnmountAndRetain, depth);
                    (log, engine)
                },
                |(log, mut engine)| {
                    engine
                        .replace_except_first(ScriptedFactory::new("replacement", &log))
                        .unwrap();
                    settle(&mut engine);
                    black_box(engine.size())
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Benchmark snapshotting a stack and rebuilding it in a fresh engine
fn bench_save_restore(c: &mut Criterion) {
    let mut group = c.benchmark_group("save_restore");

    for depth in [1, 10, 50].iter() {
        let log = LifecycleLog::new();
        let mut source = filled(&log, RetentionPolicy::UnmountAndRetain, *depth);
        let saved = source.save_state().unwrap();
        group.throughput(Throughput::Elements(*depth as u64));

        group.bench_with_input(BenchmarkId::new("save", depth), depth, |b, _| {
            b.iter(|| black_box(source.save_state().unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("restore", depth), &saved, |b, saved| {
            b.iter(|| {
                let mut target = engine(&log, RetentionPolicy::UnmountAndRetain);
                target.restore_state(black_box(saved.clone())).unwrap();
                log.clear();
                black_box(target.size())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_push_pop,
    bench_replace_except_first,
    bench_save_restore,
);
criterion_main!(benches);
