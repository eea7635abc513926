use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use recall::{args, Dispatcher, Registry};
use std::sync::Arc;

fn configure_criterion() -> Criterion {
    Criterion::default()
        .measurement_time(std::time::Duration::from_secs(1))
        .warm_up_time(std::time::Duration::from_secs(1))
        .sample_size(10)
}

fn slow_sum(n: u64) -> u64 {
    (0..n).fold(0u64, |acc, x| acc.wrapping_add(x * x))
}

fn benchmark_dispatch(c: &mut Criterion) {
    let config = recall::MemoConfig { log_level: Some(recall::logger::Level::Error), ..Default::default() };
    config.init_logging();
    let registry = Arc::new(Registry::with_config(config));
    registry.register::<u64>("sum", Some(1)).unwrap();
    let dispatcher = Dispatcher::new(Arc::clone(&registry));
    let hot = args![10_000u64];
    let cold = args![20_000u64];
    dispatcher.invoke_pure("sum", &hot, false, || slow_sum(10_000)).unwrap();

    let mut group = c.benchmark_group("Dispatcher");
    group.throughput(Throughput::Elements(1));

    group.bench_function("invoke::hit", |b| {
        b.iter(|| dispatcher.invoke_pure("sum", black_box(&hot), false, || slow_sum(10_000)).unwrap())
    });
    // the cache is full, so this one recomputes every time
    group.bench_function("invoke::refused", |b| {
        b.iter(|| dispatcher.invoke_pure("sum", black_box(&cold), false, || slow_sum(20_000)).unwrap())
    });
    group.bench_function("invoke::bypass", |b| {
        b.iter(|| dispatcher.invoke_pure("sum", black_box(&hot), true, || slow_sum(10_000)).unwrap())
    });
    group.finish();
}

fn benchmark_wrapper(c: &mut Criterion) {
    let registry = Registry::new();
    let sum = registry.memoize("wrapped_sum", None, |(n,): (u64,)| slow_sum(n)).unwrap();

    let mut group = c.benchmark_group("MemoFn");
    group.throughput(Throughput::Elements(1));
    group.bench_function("call::hit", |b| b.iter(|| sum.call(black_box((10_000,))).unwrap()));
    group.bench_function("direct", |b| b.iter(|| slow_sum(black_box(10_000))));
    group.finish();
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets = benchmark_dispatch, benchmark_wrapper
}
criterion_main!(benches);
