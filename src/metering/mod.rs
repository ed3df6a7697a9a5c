//! Pulse metering — the S0 energy-meter subsystem.
//!
//! [`latch`] is the ISR-facing half: one timestamp slot per channel,
//! written from interrupt context. [`meter`] is the cooperative half:
//! debounce, power/energy computation and report scheduling.

pub mod latch;
pub mod meter;

pub use latch::{EDGE_LATCH, EdgeLatch};
pub use meter::PulseMeter;
