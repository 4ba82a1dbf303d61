//! Event ring implementation
//!
//! This module provides the core bounded MPMC ring. Any number of
//! producer threads race on the tail cursor and any number of consumer
//! threads race on the head cursor, both via compare-and-swap; no lock
//! exists anywhere on the hot path.
//!
//! # Claim protocol
//!
//! A producer claims the slot at the tail position by advancing the tail
//! cursor with CAS, writes the payload into the claimed slot, then
//! publishes it by storing `position + 1` into the slot's stamp with
//! release ordering. A consumer trusts a slot's payload only after an
//! acquire load of the stamp observes that exact generation value, which
//! closes the window where a claimed slot is visible through the cursor
//! before its payload write has landed. The stamp is a full generation
//! counter rather than a ready flag so slot reuse across wraps of the
//! index computation can never alias an old publication.
//!
//! One slot is permanently sacrificed: a ring of `N` slots holds at most
//! `N - 1` events, so "all slots full" and "none occupied" are distinct
//! cursor relationships.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::ring::cursor::Cursor;
use crate::ring::{is_power_of_two, Result, RingError};

/// A single ring slot: publication stamp plus payload storage
struct Slot<T> {
    /// Publication stamp; equals `position + 1` once the payload for
    /// logical position `position` is fully written
    stamp: AtomicU64,
    /// The payload; uninitialized until first published
    value: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            stamp: AtomicU64::new(0),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }
}

/// Slot storage aligned to a cache-line boundary, matching the alignment
/// of the two cursors
#[repr(align(64))]
struct SlotArray<T, const N: usize>([Slot<T>; N]);

/// Lock-free bounded MPMC event ring
///
/// The ring owns a fixed inline array of `N` slots and two cache-line
/// padded cursors. `N` is a compile-time constant and must be a power of
/// two no smaller than 2; usable capacity is `N - 1`.
///
/// Both cursors are unbounded logical counters; they are reduced modulo
/// `N` only when computing a slot index, never in the stored value, so
/// full/empty disambiguation stays exact after any number of wraps.
///
/// The ring is created once, before any producer or consumer context
/// starts, and then shared (typically behind an `Arc`) for the life of
/// the process. Construction uses plain stores; ownership guarantees no
/// other context can observe the ring before it is shared.
#[repr(C)]
pub struct EventRing<T, const N: usize> {
    /// Producer cursor: next logical position to claim for writing
    tail: Cursor,
    /// Consumer cursor: next logical position to claim for reading
    head: Cursor,
    /// The slot array
    slots: SlotArray<T, N>,
}

// SAFETY: EventRing is Send and Sync when T is Send because:
// - Slot payloads are only written by the producer that won the tail CAS
//   for that position, and only trusted by consumers after the stamp
//   check proves the write is published
// - Cursor mutation happens exclusively through CAS
// - T is Copy, so values moved out are plain bit copies with no drop glue
unsafe impl<T: Copy + Send, const N: usize> Send for EventRing<T, N> {}
unsafe impl<T: Copy + Send, const N: usize> Sync for EventRing<T, N> {}

impl<T: Copy, const N: usize> EventRing<T, N> {
    /// Compile-time capacity check, evaluated at monomorphization
    const CAPACITY_OK: () = assert!(
        N >= 2 && is_power_of_two(N),
        "ring capacity must be a power of two and at least 2"
    );

    /// Index mask for fast modulo (N - 1)
    const MASK: u64 = (N as u64) - 1;

    /// Occupancy at which the ring is full (one slot sacrificed)
    const HIGH_WATER: u64 = (N as u64) - 1;

    /// Create a new ring with both cursors at zero
    ///
    /// Slot payloads need no initialization; stamps start at zero, which
    /// matches no publication for any position. Must be called exactly
    /// once per ring, before the ring is shared with any producer or
    /// consumer context; the type system enforces this by ownership.
    pub fn new() -> Self {
        let () = Self::CAPACITY_OK;

        Self {
            tail: Cursor::new(0),
            head: Cursor::new(0),
            slots: SlotArray(std::array::from_fn(|_| Slot::new())),
        }
    }

    /// Attempt to enqueue an event
    ///
    /// Never blocks. A `Full` rejection is final for this call and leaves
    /// all ring state unchanged; retry and backoff policy belong to the
    /// caller. The internal loop retries only a CAS race lost to another
    /// producer for this same logical operation.
    ///
    /// # Errors
    /// Returns `RingError::Full` when `N - 1` events are resident
    pub fn try_enqueue(&self, event: T) -> Result<()> {
        loop {
            let tail = self.tail.get_relaxed();
            // Acquire: see the consumer progress that vacated slots
            let head = self.head.get();

            if tail.wrapping_sub(head) >= Self::HIGH_WATER {
                if self.tail.get_relaxed() != tail {
                    // The occupancy computation paired a stale tail with a
                    // newer head; re-read and retry
                    continue;
                }
                return Err(RingError::Full);
            }

            if !self.tail.try_advance(tail) {
                // Another producer won position `tail`; re-read both cursors
                continue;
            }

            let slot = &self.slots.0[(tail & Self::MASK) as usize];
            // SAFETY: winning the tail CAS for `tail` grants exclusive
            // write access to this slot. No later producer can claim the
            // same slot index before head passes `tail` (the high-water
            // check), and the consumer that previously vacated it
            // released its progress through the head cursor we acquired.
            unsafe {
                (*slot.value.get()).write(event);
            }
            // Publish: consumers trust the payload only after observing
            // this exact generation value
            slot.stamp.store(tail + 1, Ordering::Release);

            return Ok(());
        }
    }

    /// Attempt to dequeue an event
    ///
    /// Never blocks. An `Empty` rejection is final for this call and
    /// leaves all ring state unchanged. A position that has been claimed
    /// by a producer whose payload write is not yet published is also
    /// reported as `Empty`: the event is not observable at this call's
    /// linearization point, and the core never waits for publication.
    ///
    /// # Errors
    /// Returns `RingError::Empty` when the cursors denote the same
    /// logical position, or when the head slot is claimed but unpublished
    pub fn try_dequeue(&self) -> Result<T> {
        loop {
            let head = self.head.get_relaxed();
            // Acquire: see the producer progress and published payloads
            let tail = self.tail.get();

            if head == tail {
                return Err(RingError::Empty);
            }

            let slot = &self.slots.0[(head & Self::MASK) as usize];
            if slot.stamp.load(Ordering::Acquire) != head + 1 {
                if self.head.get_relaxed() != head {
                    // The stamp belongs to another generation because this
                    // thread's head observation is stale; re-read and retry
                    continue;
                }
                // Claimed but not yet published
                return Err(RingError::Empty);
            }

            // SAFETY: the stamp check above proves the payload for
            // position `head` was fully written and published with
            // release ordering. The copy below may still race with a
            // producer recycling this slot N positions later if this
            // thread is stale; in that case the head CAS below fails and
            // the copy is discarded without being observed. T: Copy, so
            // discarding it has no side effects.
            let event = unsafe { (*slot.value.get()).assume_init_read() };

            if self.head.try_advance(head) {
                return Ok(event);
            }
            // Another consumer won position `head`; restart the sequence
        }
    }

    /// Snapshot of the number of resident events
    ///
    /// Advisory under concurrency: the two cursors are read one after the
    /// other, so the value may be stale by the time it is returned. Never
    /// exceeds `N - 1`.
    pub fn len(&self) -> usize {
        let head = self.head.get();
        let tail = self.tail.get();
        (tail.wrapping_sub(head) as usize).min(N - 1)
    }

    /// Snapshot emptiness check
    pub fn is_empty(&self) -> bool {
        self.head.get() == self.tail.get()
    }

    /// Snapshot fullness check
    pub fn is_full(&self) -> bool {
        self.len() == N - 1
    }

    /// Usable capacity: the maximum number of resident events
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Total slot count, including the sacrificed slot
    pub const fn slot_count(&self) -> usize {
        N
    }

    /// Snapshot of `(head, tail)` logical positions
    ///
    /// Meaningful for verification once all producer and consumer
    /// contexts have quiesced: equal cursors mean every accepted event
    /// was drained.
    pub fn cursors(&self) -> (u64, u64) {
        (self.head.get(), self.tail.get())
    }
}

impl<T: Copy, const N: usize> Default for EventRing<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> std::fmt::Debug for EventRing<T, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRing")
            .field("slots", &N)
            .field("head", &self.head)
            .field("tail", &self.tail)
            .finish()
    }
}
