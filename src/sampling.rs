//! Temperature sampler — 1-wire probe polling with slew-rate filtering.
//!
//! Driven by a coarse timer independent of the meter's tick cadence. Each
//! cycle triggers a conversion on every probe, reads the results back and
//! filters out readings that cannot be real: the offline sentinel from a
//! bus fault, and candidates whose implied rate of change exceeds
//! [`MAX_TEMP_SLEW_C_PER_SEC`]. A filtered reading is simply dropped; the
//! next cycle tries again naturally.
//!
//! Two cadences cooperate: a value that changed is published immediately
//! on its poll cycle, and a slow full-report timer re-publishes every
//! probe at a fixed period so an unchanging-but-alive probe is still
//! periodically reconfirmed downstream.

use heapless::{String as HString, Vec};
use log::{info, warn};

use crate::app::ports::{ProbeBus, TelemetrySink};
use crate::config::{MAX_TEMP_PROBES, MAX_TEMP_SLEW_C_PER_SEC, MeteringConfig, PROBE_OFFLINE_C};
use crate::topics::temperature_topic;

/// Longest probe identifier: 8 ROM bytes, hex encoded.
const ADDR_LEN: usize = 16;

/// Per-probe filter state, owned exclusively by the sampler.
#[derive(Debug, Clone)]
struct ProbeState {
    address: HString<ADDR_LEN>,
    /// Last value that survived filtering; `None` until one has.
    last_good: Option<f32>,
    /// When that value was accepted.
    last_good_ms: u64,
}

/// The temperature-telemetry engine for all probes on the bus.
pub struct TemperatureSampler {
    probes: Vec<ProbeState, MAX_TEMP_PROBES>,
    poll_interval_ms: u64,
    full_report_interval_ms: u64,
    next_poll_ms: u64,
    next_full_report_ms: u64,
}

impl TemperatureSampler {
    /// Build filter state for every probe the bus found at startup.
    /// Probes beyond [`MAX_TEMP_PROBES`] are ignored with a warning.
    pub fn new(config: &MeteringConfig, bus: &impl ProbeBus) -> Self {
        let mut probes = Vec::new();
        for idx in 0..bus.probe_count() {
            let mut address = HString::new();
            let _ = address.push_str(bus.address(idx));
            if probes
                .push(ProbeState {
                    address,
                    last_good: None,
                    last_good_ms: 0,
                })
                .is_err()
            {
                warn!(
                    "Reached max probe count; only {} probes will provide data",
                    MAX_TEMP_PROBES
                );
                break;
            }
        }
        info!("Servicing {} 1-wire temperature probes", probes.len());
        Self {
            probes,
            poll_interval_ms: u64::from(config.probe_poll_interval_secs) * 1000,
            full_report_interval_ms: u64::from(config.full_report_interval_secs) * 1000,
            next_poll_ms: 0,
            next_full_report_ms: 0,
        }
    }

    pub fn probe_count(&self) -> usize {
        self.probes.len()
    }

    /// Identifier of probe `idx`.
    pub fn address(&self, idx: usize) -> Option<&str> {
        self.probes.get(idx).map(|p| p.address.as_str())
    }

    /// Last accepted value for probe `idx`, if any reading has survived
    /// filtering yet.
    pub fn last_good(&self, idx: usize) -> Option<f32> {
        self.probes.get(idx).and_then(|p| p.last_good)
    }

    /// Run one sampler cycle if the poll timer has elapsed; otherwise do
    /// nothing. `now_ms` is the monotonic clock sampled once per tick by
    /// the caller.
    pub fn tick(&mut self, now_ms: u64, bus: &mut impl ProbeBus, sink: &mut impl TelemetrySink) {
        if now_ms < self.next_poll_ms {
            return;
        }
        self.next_poll_ms = now_ms + self.poll_interval_ms;

        let report_all = now_ms >= self.next_full_report_ms;
        if report_all {
            self.next_full_report_ms = now_ms + self.full_report_interval_ms;
        }

        bus.request_conversion();
        for idx in 0..self.probes.len() {
            let candidate = bus.read_celsius(idx);
            self.filter_and_publish(idx, candidate, now_ms, report_all, sink);
        }
    }

    fn filter_and_publish(
        &mut self,
        idx: usize,
        candidate: f32,
        now_ms: u64,
        report_all: bool,
        sink: &mut impl TelemetrySink,
    ) {
        let probe = &mut self.probes[idx];

        if candidate < PROBE_OFFLINE_C {
            // Hardware/bus fault sentinel; previous good value stands.
            warn!("1-wire probe offline: {}", probe.address);
            return;
        }

        if let Some(prev) = probe.last_good {
            let elapsed_secs = now_ms.saturating_sub(probe.last_good_ms) as f32 / 1000.0;
            let allowed = elapsed_secs * MAX_TEMP_SLEW_C_PER_SEC;
            if (candidate - prev).abs() > allowed {
                info!(
                    "Filtering probe {} reading: delta too high (candidate {:.2}, last {:.2})",
                    probe.address, candidate, prev
                );
                return;
            }
        }

        let changed = probe.last_good != Some(candidate);
        probe.last_good = Some(candidate);
        probe.last_good_ms = now_ms;

        if changed || report_all {
            info!("Probe {}: {:.2} C", probe.address, candidate);
            sink.publish(
                &temperature_topic(probe.address.as_str()),
                &format!("{candidate:.2}"),
                true,
            );
        }
    }
}
