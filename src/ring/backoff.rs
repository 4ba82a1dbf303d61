//! Backoff policies for rejected ring operations
//!
//! The ring itself never waits: a `Full` or `Empty` rejection is final
//! for that call. Everything about retry spacing lives here, on the
//! caller's side, parameterized independently of the ring algorithm.
//! Different policies trade CPU usage against reaction latency.

use std::thread;
use std::time::Duration;

/// Policy applied by a caller between a rejected try-operation and its
/// next attempt
///
/// `attempt` is the number of consecutive rejections observed for the
/// current logical operation, starting at 0; policies may use it to
/// escalate.
pub trait BackoffPolicy: Send + Sync + std::fmt::Debug {
    /// React to one rejection before the caller retries
    fn on_rejection(&self, attempt: u32);
}

/// Retry immediately with no pause
///
/// Lowest reaction latency, burns a full core while the ring stays
/// rejecting. Use only when the opposite side is guaranteed to make
/// progress quickly.
#[derive(Debug, Default)]
pub struct NoBackoff;

impl NoBackoff {
    /// Create a new no-op backoff policy
    pub fn new() -> Self {
        Self
    }
}

impl BackoffPolicy for NoBackoff {
    fn on_rejection(&self, _attempt: u32) {}
}

/// Issue CPU pause hints, exponentially more per consecutive rejection
///
/// Keeps the thread runnable and reacts within nanoseconds, while the
/// pause hint lowers power draw and frees pipeline resources for the
/// sibling hyperthread. Escalation is capped so a long stall never turns
/// into an unbounded spin burst.
#[derive(Debug, Default)]
pub struct SpinBackoff;

impl SpinBackoff {
    /// Cap on the escalation exponent (2^6 = 64 pause hints per call)
    const MAX_SHIFT: u32 = 6;

    /// Create a new spinning backoff policy
    pub fn new() -> Self {
        Self
    }
}

impl BackoffPolicy for SpinBackoff {
    fn on_rejection(&self, attempt: u32) {
        let spins = 1u32 << attempt.min(Self::MAX_SHIFT);
        for _ in 0..spins {
            std::hint::spin_loop();
        }
    }
}

/// Yield the CPU to other runnable threads
///
/// Friendlier than spinning when the machine is oversubscribed; latency
/// is at the mercy of the scheduler.
#[derive(Debug, Default)]
pub struct YieldBackoff;

impl YieldBackoff {
    /// Create a new yielding backoff policy
    pub fn new() -> Self {
        Self
    }
}

impl BackoffPolicy for YieldBackoff {
    fn on_rejection(&self, _attempt: u32) {
        thread::yield_now();
    }
}

/// Sleep for a fixed interval after every rejection
///
/// Highest latency, lowest CPU usage. Suited to consumers that tolerate
/// batching, or producers throttling against a persistently full ring.
#[derive(Debug)]
pub struct SleepBackoff {
    pause: Duration,
}

impl SleepBackoff {
    /// Create a sleeping backoff policy with the given pause interval
    pub fn new(pause: Duration) -> Self {
        Self { pause }
    }
}

impl Default for SleepBackoff {
    fn default() -> Self {
        Self::new(Duration::from_micros(1))
    }
}

impl BackoffPolicy for SleepBackoff {
    fn on_rejection(&self, _attempt: u32) {
        thread::sleep(self.pause);
    }
}
