//! Lock-free bounded MPMC event ring
//!
//! This module provides the core ring data structure and its collaborators:
//! atomic cursors, the event record, and caller-side backoff policies.
//! Producers and consumers coordinate exclusively through compare-and-swap
//! on two shared cursors plus per-slot publication stamps.

pub mod backoff;
pub mod buffer;
pub mod cursor;
pub mod event;

#[cfg(test)]
mod property_tests;

pub use backoff::{BackoffPolicy, NoBackoff, SleepBackoff, SpinBackoff, YieldBackoff};
pub use buffer::EventRing;
pub use cursor::Cursor;
pub use event::FaultEvent;

/// Cache line size used for padding and alignment (x86-64 and most ARM cores)
pub const CACHE_LINE_SIZE: usize = 64;

/// The canonical ring capacity in slots
///
/// One slot is sacrificed to distinguish full from empty, so a ring of
/// this size holds at most `RING_CAPACITY - 1` events at once.
pub const RING_CAPACITY: usize = 1024;

/// Errors that can occur on the ring
///
/// Both conditions are expected under normal load and are final for the
/// call that observed them; retry policy belongs entirely to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RingError {
    #[error("ring is full")]
    Full,

    #[error("ring is empty")]
    Empty,
}

pub type Result<T> = std::result::Result<T, RingError>;

/// Utility function to check if a number is a power of 2
pub const fn is_power_of_two(n: usize) -> bool {
    n != 0 && (n & (n - 1)) == 0
}
