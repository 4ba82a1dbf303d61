//! Property-based tests for the ring components
//!
//! These tests use proptest to verify properties that should hold for all inputs

use crate::ring::{cursor::Cursor, EventRing, RingError};
use proptest::prelude::*;
use std::collections::VecDeque;

/// Property tests for Cursor
mod cursor_properties {
    use super::*;

    proptest! {
        #[test]
        fn cursor_set_get_consistency(value in any::<u64>()) {
            let cursor = Cursor::new(0);
            cursor.set(value);
            prop_assert_eq!(cursor.get(), value);
            prop_assert_eq!(cursor.get_relaxed(), value);
        }

        #[test]
        fn cursor_advance_success(initial in 0u64..u64::MAX / 2) {
            let cursor = Cursor::new(initial);
            prop_assert!(cursor.try_advance(initial));
            prop_assert_eq!(cursor.get(), initial + 1);
        }

        #[test]
        fn cursor_advance_stale_expected_fails(
            initial in 0u64..u64::MAX / 2,
            stale in 0u64..u64::MAX / 2,
        ) {
            prop_assume!(stale != initial);
            let cursor = Cursor::new(initial);
            prop_assert!(!cursor.try_advance(stale));
            prop_assert_eq!(cursor.get(), initial);
        }

        #[test]
        fn cursor_only_ever_advances(initial in 0u64..1000, claims in 1u64..100) {
            let cursor = Cursor::new(initial);
            let mut previous = cursor.get();
            for _ in 0..claims {
                let current = cursor.get_relaxed();
                prop_assert!(cursor.try_advance(current));
                prop_assert!(cursor.get() > previous);
                previous = cursor.get();
            }
            prop_assert_eq!(cursor.get(), initial + claims);
        }
    }
}

/// Property tests for `EventRing`
mod ring_properties {
    use super::*;

    proptest! {
        #[test]
        fn ring_preserves_fifo_order(values in prop::collection::vec(any::<u64>(), 0..=15)) {
            let ring: EventRing<u64, 16> = EventRing::new();

            for &value in &values {
                prop_assert_eq!(ring.try_enqueue(value), Ok(()));
            }
            for &value in &values {
                prop_assert_eq!(ring.try_dequeue(), Ok(value));
            }
            prop_assert_eq!(ring.try_dequeue(), Err(RingError::Empty));
        }

        #[test]
        fn ring_matches_deque_model(ops in prop::collection::vec(any::<bool>(), 0..200)) {
            // true = enqueue, false = dequeue; the ring must agree with a
            // bounded deque of usable capacity 7 on every operation.
            let ring: EventRing<u64, 8> = EventRing::new();
            let mut model: VecDeque<u64> = VecDeque::new();
            let mut next_value = 0u64;

            for op in ops {
                if op {
                    let outcome = ring.try_enqueue(next_value);
                    if model.len() < 7 {
                        prop_assert_eq!(outcome, Ok(()));
                        model.push_back(next_value);
                    } else {
                        prop_assert_eq!(outcome, Err(RingError::Full));
                    }
                    next_value += 1;
                } else {
                    let outcome = ring.try_dequeue();
                    match model.pop_front() {
                        Some(expected) => prop_assert_eq!(outcome, Ok(expected)),
                        None => prop_assert_eq!(outcome, Err(RingError::Empty)),
                    }
                }
                prop_assert_eq!(ring.len(), model.len());
            }
        }

        #[test]
        fn ring_occupancy_never_exceeds_usable_capacity(
            ops in prop::collection::vec(any::<bool>(), 0..300),
        ) {
            let ring: EventRing<u64, 8> = EventRing::new();

            for op in ops {
                if op {
                    let _ = ring.try_enqueue(1);
                } else {
                    let _ = ring.try_dequeue();
                }
                prop_assert!(ring.len() <= ring.capacity());
                let (head, tail) = ring.cursors();
                prop_assert!(head <= tail);
                prop_assert!(tail - head <= 7);
            }
        }
    }
}
