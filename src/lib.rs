//! `faultring` - Lock-Free Bounded MPMC Event Ring
//!
//! A fixed-capacity, concurrent, non-blocking queue for small fixed-size
//! event records, built for ultra-low-latency delivery of virtual-memory
//! fault notifications from a virtualization layer to a monitoring layer
//! under high contention.
//!
//! ## Features
//!
//! - **Lock-free**: coordination is compare-and-swap on two shared
//!   cursors; no mutex anywhere on the hot path
//! - **MPMC**: any number of producer and consumer threads operate on
//!   one ring simultaneously
//! - **Non-blocking**: `try_enqueue` and `try_dequeue` return a status
//!   immediately; all retry and backoff policy belongs to the caller
//! - **Mechanical sympathy**: cursors and the slot array are aligned to
//!   cache-line boundaries to avoid false sharing
//! - **Race-free publication**: per-slot generation stamps guarantee a
//!   consumer never observes a slot before its producer's write is
//!   visible
//!
//! ## Quick Start
//!
//! ```rust
//! use faultring::{EventRing, FaultEvent, RingError};
//!
//! // Eight slots, seven usable; capacity is a compile-time constant.
//! let ring: EventRing<FaultEvent, 8> = EventRing::new();
//!
//! let event = FaultEvent::new(4242, 7, FaultEvent::trace_id(0, 1));
//! ring.try_enqueue(event).unwrap();
//!
//! assert_eq!(ring.try_dequeue(), Ok(event));
//! assert_eq!(ring.try_dequeue(), Err(RingError::Empty));
//! ```
//!
//! ## Architecture
//!
//! - **`EventRing`**: the slot array plus producer and consumer cursors
//! - **`Cursor`**: cache-line-padded atomic position counter advanced
//!   only through compare-and-swap
//! - **`FaultEvent`**: the trivially copyable event record
//! - **`BackoffPolicy`**: caller-side retry spacing after a rejection
//! - **`harness`**: a parameterized multi-threaded stress workload that
//!   drives the ring through its public operations and verifies
//!   conservation
//!
//! ## Capacity semantics
//!
//! A ring of `N` slots holds at most `N - 1` events: one slot is
//! permanently sacrificed so that "full" and "empty" are distinct
//! relationships between the two cursors. Cursors are unbounded logical
//! counters reduced modulo `N` only at slot indexing, so the
//! disambiguation stays exact after any number of index wraps.

pub mod harness;
pub mod ring;

// Re-export the main types for convenience
pub use ring::{
    // Backoff policies
    backoff::BackoffPolicy,
    // Utility functions
    is_power_of_two,

    // Core types
    EventRing,
    FaultEvent,

    NoBackoff,
    // Error types
    RingError,

    Result,
    SleepBackoff,

    SpinBackoff,
    YieldBackoff,

    // Constants
    CACHE_LINE_SIZE,
    RING_CAPACITY,
};

pub use harness::{run_workload, WorkloadConfig, WorkloadReport};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the version of the `faultring` library
#[must_use]
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
