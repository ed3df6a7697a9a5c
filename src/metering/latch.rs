//! Edge latch — the interrupt-to-poll handoff for S0 pulse inputs.
//!
//! The GPIO ISR stores the timestamp of the most recent rising edge into a
//! per-channel slot; the pulse meter reads the slots from the cooperative
//! loop once per tick. The ISR side does nothing else: no filtering, no
//! logging, no floating point, no allocation. Debounce belongs to the
//! consumer.
//!
//! Timestamps are 64-bit milliseconds since boot, which does not fit in a
//! single word on the 32-bit target, so each slot is guarded by a
//! `critical_section::Mutex`. The critical section covers only the slot
//! access itself — never any computation — so an edge recorded during the
//! read is either fully visible or fully deferred to the next tick; a torn
//! timestamp is never observed.

use core::cell::Cell;

use critical_section::Mutex;

use crate::config::MAX_PULSE_CHANNELS;

/// Per-channel latched edge timestamps, single ISR writer / single
/// cooperative reader.
pub struct EdgeLatch {
    slots: [Mutex<Cell<u64>>; MAX_PULSE_CHANNELS],
}

/// Shared instance for GPIO ISR registration. The meter still receives a
/// `&EdgeLatch` by injection, so tests construct their own latch and never
/// touch this one.
pub static EDGE_LATCH: EdgeLatch = EdgeLatch::new();

impl EdgeLatch {
    pub const fn new() -> Self {
        Self {
            slots: [const { Mutex::new(Cell::new(0)) }; MAX_PULSE_CHANNELS],
        }
    }

    /// Record a rising edge. Callable from ISR context; bounded time,
    /// stores the timestamp and returns.
    ///
    /// Out-of-range channels are ignored — an ISR must never panic.
    pub fn record_edge(&self, channel: usize, now_ms: u64) {
        if let Some(slot) = self.slots.get(channel) {
            critical_section::with(|cs| slot.borrow(cs).set(now_ms));
        }
    }

    /// Read the latched timestamp for `channel` and return it if it differs
    /// from `last_edge_ms`, the caller's most recently accepted edge.
    ///
    /// Cooperative context only. The critical section is held for the slot
    /// read alone; whether the returned edge is genuine (debounce) is the
    /// caller's decision.
    pub fn read_if_newer(&self, channel: usize, last_edge_ms: u64) -> Option<u64> {
        let slot = self.slots.get(channel)?;
        let latched = critical_section::with(|cs| slot.borrow(cs).get());
        if latched != last_edge_ms && latched != 0 {
            Some(latched)
        } else {
            None
        }
    }
}

impl Default for EdgeLatch {
    fn default() -> Self {
        Self::new()
    }
}
