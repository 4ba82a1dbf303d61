//! MPMC end-to-end conservation tests
//!
//! Each test runs the parameterized workload to completion and checks
//! the global invariants: total successful enqueues equal total
//! successful dequeues, the cursors meet at quiescence, and the multiset
//! of consumed trace ids equals the multiset of produced ones (zero
//! duplicates, zero misses).

use faultring::{run_workload, SpinBackoff, WorkloadConfig, YieldBackoff};
use std::sync::Arc;
use std::time::Duration;

fn config(producers: usize, consumers: usize, events: u32) -> WorkloadConfig {
    WorkloadConfig {
        producers,
        consumers,
        events_per_producer: events,
        producer_backoff: Arc::new(YieldBackoff::new()),
        consumer_backoff: Arc::new(YieldBackoff::new()),
        consumer_pause: None,
        pin_threads: false,
    }
}

fn assert_exactly_once(report: &faultring::WorkloadReport, expected: u64) {
    assert_eq!(
        report.produced, expected,
        "every event must eventually be accepted"
    );
    assert_eq!(
        report.consumed, report.produced,
        "successful dequeues must equal successful enqueues"
    );
    assert_eq!(report.duplicate_events, 0, "no event may be delivered twice");
    assert_eq!(report.missing_events, 0, "no event may be lost");
    assert_eq!(
        report.final_head, report.final_tail,
        "cursors must meet at quiescence"
    );
    assert_eq!(
        report.final_tail, expected,
        "each accepted event advances the producer cursor exactly once"
    );
}

#[test]
fn conservation_spsc() {
    let report = run_workload::<1024>(&config(1, 1, 50_000));
    assert_exactly_once(&report, 50_000);
}

#[test]
fn conservation_many_producers_few_consumers() {
    // The original deployment shape: many noisy guests, few monitors.
    let report = run_workload::<1024>(&config(8, 2, 20_000));
    assert_exactly_once(&report, 8 * 20_000);
}

#[test]
fn conservation_few_producers_many_consumers() {
    let report = run_workload::<1024>(&config(2, 8, 40_000));
    assert_exactly_once(&report, 2 * 40_000);
}

#[test]
fn conservation_under_heavy_wraparound() {
    // A tiny ring forces constant full/empty transitions and thousands
    // of index wraps, the worst case for claim and publication races.
    let report = run_workload::<4>(&config(4, 4, 10_000));
    assert_exactly_once(&report, 4 * 10_000);
    assert!(
        report.producer_rejections > 0,
        "a 3-slot ring under 4 producers must reject some enqueues"
    );
}

#[test]
fn conservation_with_slow_consumers() {
    // Slow monitors exercise sustained backpressure on the producers.
    let mut cfg = config(4, 2, 2_000);
    cfg.consumer_pause = Some(Duration::from_micros(1));
    cfg.producer_backoff = Arc::new(SpinBackoff::new());
    let report = run_workload::<64>(&cfg);
    assert_exactly_once(&report, 4 * 2_000);
}
