//! Port traits — the boundary between the metering core and the outside
//! world.
//!
//! ```text
//!   GPIO ISR ──▶ EdgeLatch ──▶ PulseMeter ────▶ TelemetrySink
//!   ProbeBus ──▶ TemperatureSampler ──────────▶ TelemetrySink
//! ```
//!
//! Driven adapters (the MQTT/web layer, the 1-wire bus driver) implement
//! these traits. The core consumes them via generics, so it never touches
//! hardware or a network stack directly and runs unchanged under test.

/// Outbound measurement sink, implemented by the messaging/web layer.
///
/// Delivery is at-most-once and fire-and-forget: a failed publish is the
/// adapter's problem and is never surfaced back into the core.
pub trait TelemetrySink {
    fn publish(&mut self, topic: &str, value: &str, retained: bool);
}

/// Read-side port for the 1-wire temperature probes.
///
/// The probe set is fixed at startup (bus scan); indices are stable for
/// the process lifetime. A stalled conversion or absent probe shows up as
/// the offline sentinel from [`read_celsius`](ProbeBus::read_celsius),
/// not as a timeout.
pub trait ProbeBus {
    /// Number of probes found on the bus at startup.
    fn probe_count(&self) -> usize;

    /// Stable identifier for probe `idx` (hex-encoded ROM address).
    fn address(&self, idx: usize) -> &str;

    /// Kick off a conversion on every probe.
    fn request_conversion(&mut self);

    /// Read back the converted value for probe `idx`, degrees C.
    /// Returns a value below [`PROBE_OFFLINE_C`](crate::config::PROBE_OFFLINE_C)
    /// when the probe is absent or the bus transaction failed.
    fn read_celsius(&mut self, idx: usize) -> f32;
}
