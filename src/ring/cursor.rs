//! Cursor implementation for the event ring
//!
//! A cursor is an unbounded logical position counter shared by all
//! producer or all consumer contexts. It is advanced only through
//! compare-and-swap and is padded to occupy a full cache line so the
//! producer-side and consumer-side cursors never share one.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::ring::CACHE_LINE_SIZE;

/// A ring position counter that prevents false sharing
///
/// The stored value is the unwrapped logical position; it is reduced
/// modulo the capacity only at the point of slot indexing, never here.
/// This keeps full/empty disambiguation exact across any number of
/// wraps of the index computation.
#[repr(align(64))]
pub struct Cursor {
    /// The actual position value
    value: AtomicU64,
    /// Padding to prevent false sharing (cache line size - size of AtomicU64)
    _padding: [u8; CACHE_LINE_SIZE - std::mem::size_of::<AtomicU64>()],
}

impl Cursor {
    /// Create a new cursor at the given starting position
    pub fn new(initial_value: u64) -> Self {
        Self {
            value: AtomicU64::new(initial_value),
            _padding: [0; CACHE_LINE_SIZE - std::mem::size_of::<AtomicU64>()],
        }
    }

    /// Get the current position with acquire ordering
    ///
    /// An acquire load makes the progress published by the opposite side
    /// (and the slot contents it vacated or filled) visible to the caller.
    #[inline]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    /// Get the current position with relaxed ordering
    ///
    /// Used by a context reading its own side's cursor, where no
    /// visibility of the other side's writes is required from this load.
    #[inline]
    pub fn get_relaxed(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Set the position with release ordering
    #[inline]
    pub fn set(&self, value: u64) {
        self.value.store(value, Ordering::Release);
    }

    /// Attempt to advance the cursor from `current` to `current + 1`
    ///
    /// Release ordering on success publishes the claim to whoever next
    /// observes the new position; relaxed on failure, since a lost race
    /// carries no data. The strong compare-exchange form is used so a
    /// failure always means another context won the position, never a
    /// spurious miss.
    ///
    /// # Returns
    /// True if this caller won the claim for position `current`
    #[inline]
    pub fn try_advance(&self, current: u64) -> bool {
        self.value
            .compare_exchange(current, current + 1, Ordering::Release, Ordering::Relaxed)
            .is_ok()
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new(0)
    }
}

impl std::fmt::Debug for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor").field("value", &self.get()).finish()
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_cursor_creation() {
        let cursor = Cursor::new(42);
        assert_eq!(cursor.get(), 42);
    }

    #[test]
    fn test_cursor_default_starts_at_zero() {
        let cursor = Cursor::default();
        assert_eq!(cursor.get(), 0);
    }

    #[test]
    fn test_cursor_set_get() {
        let cursor = Cursor::new(0);
        cursor.set(100);
        assert_eq!(cursor.get(), 100);
        assert_eq!(cursor.get_relaxed(), 100);
    }

    #[test]
    fn test_cursor_try_advance() {
        let cursor = Cursor::new(10);

        // Successful claim
        assert!(cursor.try_advance(10));
        assert_eq!(cursor.get(), 11);

        // Stale expected value loses
        assert!(!cursor.try_advance(10));
        assert_eq!(cursor.get(), 11);
    }

    #[test]
    fn test_cursor_occupies_full_cache_line() {
        assert_eq!(std::mem::size_of::<Cursor>(), CACHE_LINE_SIZE);
        assert_eq!(std::mem::align_of::<Cursor>(), CACHE_LINE_SIZE);
    }

    #[test]
    fn test_cursor_concurrent_claims_are_exclusive() {
        let cursor = Arc::new(Cursor::new(0));
        let claims_per_thread = 1000;
        let mut handles = vec![];

        // Each thread claims positions one at a time; every position must
        // be won by exactly one claimant.
        for _ in 0..4 {
            let cursor = Arc::clone(&cursor);
            handles.push(thread::spawn(move || {
                let mut won = 0u64;
                while won < claims_per_thread {
                    let current = cursor.get_relaxed();
                    if cursor.try_advance(current) {
                        won += 1;
                    }
                }
                won
            }));
        }

        let total: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 4 * claims_per_thread);
        assert_eq!(cursor.get(), 4 * claims_per_thread);
    }
}
