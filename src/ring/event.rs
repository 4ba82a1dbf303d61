//! Fault event record
//!
//! The ring carries small, trivially copyable records describing a
//! virtual-memory fault raised by a guest: which process faulted, on
//! which virtual page, plus a caller-assigned trace id. Events have no
//! identity beyond their field values.

use serde::{Deserialize, Serialize};

/// A virtual-memory fault notification
///
/// Copied by value into and out of the ring; no internal references.
/// `event_id` is owned by the caller and is conventionally composed as
/// `(producer << 32) | sequence` so every event in a run is unique and
/// traceable end to end.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultEvent {
    /// Process id of the guest that raised the fault
    pub pid: u32,
    /// Virtual page number the fault refers to
    pub vpn: u32,
    /// Caller-assigned trace id
    pub event_id: u64,
}

impl FaultEvent {
    /// Create a new fault event
    pub fn new(pid: u32, vpn: u32, event_id: u64) -> Self {
        Self { pid, vpn, event_id }
    }

    /// Compose a unique trace id from a producer index and a per-producer
    /// sequence number
    pub fn trace_id(producer: u32, sequence: u32) -> u64 {
        (u64::from(producer) << 32) | u64::from(sequence)
    }

    /// The producer index encoded in this event's trace id
    pub fn producer(&self) -> u32 {
        (self.event_id >> 32) as u32
    }

    /// The per-producer sequence number encoded in this event's trace id
    pub fn sequence(&self) -> u32 {
        (self.event_id & 0xFFFF_FFFF) as u32
    }
}
