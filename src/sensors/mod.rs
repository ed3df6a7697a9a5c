//! Sensor glue — the hardware-facing side of the two input paths.
//!
//! `onewire` implements the [`ProbeBus`](crate::app::ports::ProbeBus)
//! port (DS18B20 bus on the target, an injectable simulation on the
//! host); `pulse_input` registers the GPIO interrupts that feed the
//! [`EdgeLatch`](crate::metering::EdgeLatch).

pub mod onewire;
#[cfg(feature = "espidf")]
pub mod pulse_input;
