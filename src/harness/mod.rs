//! Parameterized multi-threaded stress workload
//!
//! One workload driver covers every producer/consumer mix: it creates an
//! explicit ring instance, spawns the requested producer and consumer
//! threads, retires a fixed number of uniquely-tagged events per
//! producer, and verifies end-to-end consistency from the trace ids and
//! the final cursor positions. The driver touches the ring only through
//! `try_enqueue` and `try_dequeue`; all retry spacing goes through the
//! configured [`BackoffPolicy`] values.

pub mod thread;

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_utils::CachePadded;
use serde::Serialize;
use tracing::{debug, info};

use crate::ring::{BackoffPolicy, EventRing, FaultEvent, SpinBackoff};
use self::thread::ThreadBuilder;

/// Configuration for one stress workload run
#[derive(Debug, Clone)]
pub struct WorkloadConfig {
    /// Number of producer threads
    pub producers: usize,
    /// Number of consumer threads
    pub consumers: usize,
    /// Events each producer retires (every event is eventually accepted)
    pub events_per_producer: u32,
    /// Backoff applied by producers after a `Full` rejection
    pub producer_backoff: Arc<dyn BackoffPolicy>,
    /// Backoff applied by consumers after an `Empty` rejection
    pub consumer_backoff: Arc<dyn BackoffPolicy>,
    /// Optional pause after each consumed event, simulating a slow
    /// monitoring layer
    pub consumer_pause: Option<Duration>,
    /// Pin worker threads to cores round-robin
    pub pin_threads: bool,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            producers: 4,
            consumers: 2,
            events_per_producer: 100_000,
            producer_backoff: Arc::new(SpinBackoff::new()),
            consumer_backoff: Arc::new(SpinBackoff::new()),
            consumer_pause: None,
            pin_threads: false,
        }
    }
}

/// Outcome of a stress workload run
#[derive(Debug, Clone, Serialize)]
pub struct WorkloadReport {
    /// Successful enqueues across all producers
    pub produced: u64,
    /// Successful dequeues across all consumers
    pub consumed: u64,
    /// `Full` rejections observed by producers
    pub producer_rejections: u64,
    /// `Empty` rejections observed by consumers
    pub consumer_rejections: u64,
    /// Trace ids consumed more than once
    pub duplicate_events: u64,
    /// Trace ids produced but never consumed
    pub missing_events: u64,
    /// Consumer cursor position at quiescence
    pub final_head: u64,
    /// Producer cursor position at quiescence
    pub final_tail: u64,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl WorkloadReport {
    /// True when the run conserved every event exactly once and the ring
    /// quiesced with equal cursors
    pub fn is_consistent(&self) -> bool {
        self.produced == self.consumed
            && self.duplicate_events == 0
            && self.missing_events == 0
            && self.final_head == self.final_tail
    }
}

/// Run one workload against a fresh ring of `N` slots
///
/// Producers retire every event (retrying rejections through their
/// backoff policy), consumers drain until all producers have finished
/// and the ring is empty. Returns the aggregated report; the caller
/// decides what counts as failure.
///
/// # Panics
/// Panics if the configuration has zero producers or zero consumers, or
/// if a worker thread cannot be spawned or joined.
pub fn run_workload<const N: usize>(config: &WorkloadConfig) -> WorkloadReport {
    assert!(config.producers > 0, "workload needs at least one producer");
    assert!(config.consumers > 0, "workload needs at least one consumer");

    let ring: Arc<EventRing<FaultEvent, N>> = Arc::new(EventRing::new());
    let produced = Arc::new(CachePadded::new(AtomicU64::new(0)));
    let consumed = Arc::new(CachePadded::new(AtomicU64::new(0)));
    let producer_rejections = Arc::new(CachePadded::new(AtomicU64::new(0)));
    let consumer_rejections = Arc::new(CachePadded::new(AtomicU64::new(0)));
    let producers_done = Arc::new(CachePadded::new(AtomicBool::new(false)));

    let expected = config.producers as u64 * u64::from(config.events_per_producer);
    info!(
        producers = config.producers,
        consumers = config.consumers,
        events_per_producer = config.events_per_producer,
        slots = N,
        "starting workload"
    );

    let start = Instant::now();
    let cores = core_affinity::get_core_ids().unwrap_or_default();
    let mut next_core = 0usize;
    let mut core_for_worker = |pin: bool| -> Option<usize> {
        if !pin || cores.is_empty() {
            return None;
        }
        let core = cores[next_core % cores.len()].id;
        next_core += 1;
        Some(core)
    };

    let mut producer_handles = Vec::with_capacity(config.producers);
    for p in 0..config.producers {
        let ring = Arc::clone(&ring);
        let produced = Arc::clone(&produced);
        let rejections = Arc::clone(&producer_rejections);
        let backoff = Arc::clone(&config.producer_backoff);
        let events = config.events_per_producer;

        let mut builder = ThreadBuilder::new().thread_name(format!("producer-{p}"));
        if let Some(core) = core_for_worker(config.pin_threads) {
            builder = builder.pin_at_core(core);
        }
        let handle = builder
            .spawn(move || {
                debug!(producer = p, "producer started");
                for i in 0..events {
                    let event = FaultEvent::new(
                        1000 + p as u32,
                        i % 1024,
                        FaultEvent::trace_id(p as u32, i),
                    );
                    let mut attempt = 0u32;
                    while ring.try_enqueue(event).is_err() {
                        rejections.fetch_add(1, Ordering::Relaxed);
                        backoff.on_rejection(attempt);
                        attempt = attempt.saturating_add(1);
                    }
                    produced.fetch_add(1, Ordering::Relaxed);
                }
                debug!(producer = p, events, "producer finished");
            })
            .expect("failed to spawn producer thread");
        producer_handles.push(handle);
    }

    let mut consumer_handles = Vec::with_capacity(config.consumers);
    for c in 0..config.consumers {
        let ring = Arc::clone(&ring);
        let consumed = Arc::clone(&consumed);
        let rejections = Arc::clone(&consumer_rejections);
        let done = Arc::clone(&producers_done);
        let backoff = Arc::clone(&config.consumer_backoff);
        let pause = config.consumer_pause;
        let capacity_hint = (expected / config.consumers as u64) as usize;

        let mut builder = ThreadBuilder::new().thread_name(format!("consumer-{c}"));
        if let Some(core) = core_for_worker(config.pin_threads) {
            builder = builder.pin_at_core(core);
        }
        let handle = builder
            .spawn(move || {
                debug!(consumer = c, "consumer started");
                let mut trace_ids = Vec::with_capacity(capacity_hint);
                let mut attempt = 0u32;
                loop {
                    match ring.try_dequeue() {
                        Ok(event) => {
                            trace_ids.push(event.event_id);
                            consumed.fetch_add(1, Ordering::Relaxed);
                            attempt = 0;
                            if let Some(pause) = pause {
                                std::thread::sleep(pause);
                            }
                        }
                        Err(_) => {
                            rejections.fetch_add(1, Ordering::Relaxed);
                            if done.load(Ordering::Acquire) {
                                // All enqueues happened before the flag was
                                // set; a rejection after observing it means
                                // the ring is drained.
                                match ring.try_dequeue() {
                                    Ok(event) => {
                                        trace_ids.push(event.event_id);
                                        consumed.fetch_add(1, Ordering::Relaxed);
                                        continue;
                                    }
                                    Err(_) => break,
                                }
                            }
                            backoff.on_rejection(attempt);
                            attempt = attempt.saturating_add(1);
                        }
                    }
                }
                debug!(consumer = c, events = trace_ids.len(), "consumer finished");
                trace_ids
            })
            .expect("failed to spawn consumer thread");
        consumer_handles.push(handle);
    }

    for handle in producer_handles {
        handle.join().expect("producer thread panicked");
    }
    producers_done.store(true, Ordering::Release);

    let mut all_ids: Vec<u64> = Vec::with_capacity(expected as usize);
    for handle in consumer_handles {
        all_ids.extend(handle.join().expect("consumer thread panicked"));
    }
    let elapsed = start.elapsed();

    let mut unique = HashSet::with_capacity(all_ids.len());
    let mut duplicate_events = 0u64;
    for &id in &all_ids {
        if !unique.insert(id) {
            duplicate_events += 1;
        }
    }
    let missing_events = expected - unique.len() as u64;

    let (final_head, final_tail) = ring.cursors();
    let report = WorkloadReport {
        produced: produced.load(Ordering::Acquire),
        consumed: consumed.load(Ordering::Acquire),
        producer_rejections: producer_rejections.load(Ordering::Acquire),
        consumer_rejections: consumer_rejections.load(Ordering::Acquire),
        duplicate_events,
        missing_events,
        final_head,
        final_tail,
        elapsed,
    };

    info!(
        produced = report.produced,
        consumed = report.consumed,
        duplicates = report.duplicate_events,
        missing = report.missing_events,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "workload finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::YieldBackoff;

    fn quick_config(producers: usize, consumers: usize, events: u32) -> WorkloadConfig {
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

    #[test]
    fn test_single_producer_single_consumer_workload() {
        let report = run_workload::<64>(&quick_config(1, 1, 5_000));
        assert!(report.is_consistent(), "inconsistent report: {report:?}");
        assert_eq!(report.produced, 5_000);
    }

    #[test]
    fn test_report_consistency_predicate() {
        let report = WorkloadReport {
            produced: 10,
            consumed: 10,
            producer_rejections: 3,
            consumer_rejections: 4,
            duplicate_events: 0,
            missing_events: 0,
            final_head: 10,
            final_tail: 10,
            elapsed: Duration::from_millis(1),
        };
        assert!(report.is_consistent());

        let mut bad = report.clone();
        bad.duplicate_events = 1;
        assert!(!bad.is_consistent());

        let mut bad = report;
        bad.final_head = 9;
        assert!(!bad.is_consistent());
    }

    #[test]
    #[should_panic(expected = "at least one producer")]
    fn test_zero_producers_rejected() {
        let _ = run_workload::<64>(&quick_config(0, 1, 1));
    }
}
