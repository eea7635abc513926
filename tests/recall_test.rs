use recall::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn dispatcher() -> Dispatcher {
    Dispatcher::new(Arc::new(Registry::new()))
}

fn counting(calls: &AtomicUsize, value: i64) -> impl FnOnce() -> i64 + '_ {
    move || {
        calls.fetch_add(1, Ordering::SeqCst);
        value * 2
    }
}

#[test]
fn first_n_distinct_argument_sets_win() {
    let d = dispatcher();
    d.registry().register::<i64>("first", Some(2)).unwrap();
    let calls = AtomicUsize::new(0);

    assert_eq!(d.invoke_pure("first", &args![10], false, counting(&calls, 10)).unwrap(), 20);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    assert_eq!(d.invoke_pure("first", &args![10], false, counting(&calls, 10)).unwrap(), 20);
    assert_eq!(calls.load(Ordering::SeqCst), 1, "second call with [10] must be a hit");

    assert_eq!(d.invoke_pure("first", &args![20], false, counting(&calls, 20)).unwrap(), 40);
    assert_eq!(d.registry().stats("first").unwrap().size, 2);

    assert_eq!(d.invoke_pure("first", &args![30], false, counting(&calls, 30)).unwrap(), 60);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    let cache = d.registry().lookup::<i64>("first").unwrap().unwrap();
    assert_eq!(cache.get(&CacheKey::build(&args![30]).unwrap()), None);

    assert_eq!(d.invoke_pure("first", &args![30], false, counting(&calls, 30)).unwrap(), 60);
    assert_eq!(calls.load(Ordering::SeqCst), 4, "[30] is recomputed once the cache is full");
    assert_eq!(cache.len(), 2);
}

#[test]
fn compute_runs_once_per_distinct_arguments() {
    let d = dispatcher();
    d.registry().register::<i64>("double", None).unwrap();
    let calls = AtomicUsize::new(0);
    for round in 0..3 {
        for n in 0..10i64 {
            assert_eq!(d.invoke_pure("double", &args![n, "tag"], false, counting(&calls, n)).unwrap(), n * 2, "round {}", round);
        }
    }
    assert_eq!(calls.load(Ordering::SeqCst), 10);
    let stats = d.registry().stats("double").unwrap();
    assert_eq!((stats.hits, stats.misses, stats.stored), (20, 10, 10));
}

#[test]
fn bypass_calls_compute_every_time() {
    let d = dispatcher();
    let cache = d.registry().register::<i64>("cb", None).unwrap();
    let calls = AtomicUsize::new(0);
    for _ in 0..5 {
        d.invoke_pure("cb", &args![1], true, counting(&calls, 1)).unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 5);
    assert!(cache.is_empty());
    assert_eq!(cache.stats(), CacheStats::default());
}

#[test]
fn operations_never_share_results() {
    let d = dispatcher();
    let a = d.registry().register::<i64>("a", None).unwrap();
    let b = d.registry().register::<i64>("b", None).unwrap();
    d.invoke_pure("a", &args![7], false, || 1i64).unwrap();
    assert_eq!(d.invoke_pure("b", &args![7], false, || 2i64).unwrap(), 2);
    let key = CacheKey::build(&args![7]).unwrap();
    assert_eq!(a.get(&key), Some(1));
    assert_eq!(b.get(&key), Some(2));
}

#[test]
fn reset_forces_recomputation() {
    let d = dispatcher();
    d.registry().register::<i64>("r", Some(1)).unwrap();
    let calls = AtomicUsize::new(0);
    d.invoke_pure("r", &args![1], false, counting(&calls, 1)).unwrap();
    assert!(d.registry().reset("r"));
    d.invoke_pure("r", &args![1], false, counting(&calls, 1)).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(d.registry().capacity("r"), Some(Some(1)));
}

#[test]
fn failing_compute_is_never_stored() {
    let d = dispatcher();
    let cache = d.registry().register::<i64>("f", None).unwrap();
    let out: Result<i64, InvokeError<std::io::Error>> =
        d.invoke("f", &args!["path"], false, || Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")));
    match out {
        Err(InvokeError::Compute(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("unexpected {:?}", other),
    }
    assert!(cache.is_empty());
}

#[test]
fn non_hashable_argument_aborts_call() {
    let d = dispatcher();
    d.registry().register::<i64>("nan", None).unwrap();
    let calls = AtomicUsize::new(0);
    let err = d.invoke_pure("nan", &args![1, f64::NAN], false, counting(&calls, 1)).unwrap_err();
    assert!(matches!(err, MemoError::NonHashableArgument { position: 1, .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn concurrent_callers_share_one_cache() {
    let d = dispatcher();
    d.registry().register::<i64>("shared", Some(8)).unwrap();
    let calls = AtomicUsize::new(0);

    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for n in 0..32i64 {
                    let out = d.invoke_pure("shared", &args![n], false, counting(&calls, n)).unwrap();
                    assert_eq!(out, n * 2);
                }
            });
        }
    });

    let stats = d.registry().stats("shared").unwrap();
    assert_eq!(stats.size, 8);
    assert_eq!(stats.stored, 8);
    // each of the 8 admitted keys is computed by at least one thread, the 24 refused keys by all of them
    let total = calls.load(Ordering::SeqCst);
    assert!(total >= 8 + 24 * 8, "total computations {}", total);
    assert!(total <= 32 * 8);
}

#[test]
fn registry_report_is_serializable() {
    let registry = Registry::new();
    let sq = registry.memoize("sq", Some(3), |(n,): (u64,)| n * n).unwrap();
    sq.call((2,)).unwrap();
    sq.call((2,)).unwrap();
    let report = registry.report();
    assert_eq!(report.len(), 1);
    let json = serde_json::to_value(&report[0].1).unwrap();
    assert_eq!(json, serde_json::json!({
        "size": 1, "capacity": 3, "hits": 1, "misses": 1, "stored": 1, "refused": 0
    }));
}
