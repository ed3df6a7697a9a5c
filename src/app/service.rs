//! Telemetry service — the cooperative core.
//!
//! [`TelemetryService`] owns the pulse meter and the temperature sampler
//! and drives both from a single scheduler tick. All I/O flows through
//! the port traits, so the whole service runs under test with a fake bus
//! and a recording sink.
//!
//! ```text
//!  EdgeLatch ──▶ ┌──────────────────────────┐
//!                │     TelemetryService     │ ──▶ TelemetrySink
//!  ProbeBus ───▶ │  PulseMeter · Sampler    │
//!                └──────────────────────────┘
//! ```
//!
//! The tick never blocks and never fails toward its scheduler; the only
//! externally visible failure is the returned [`FatalFault`], which the
//! owning supervisor turns into a process restart.

use log::info;

use crate::config::MeteringConfig;
use crate::error::FatalFault;
use crate::metering::{EdgeLatch, PulseMeter};
use crate::sampling::TemperatureSampler;
use crate::status::{
    StatusKind, energy_json_entry, energy_table_row, temperature_json_entry, temperature_table_row,
};
use crate::topics::watthour_topic;

use super::commands::Command;
use super::ports::{ProbeBus, TelemetrySink};

/// Orchestrates pulse metering and temperature sampling.
pub struct TelemetryService {
    meter: PulseMeter,
    sampler: TemperatureSampler,
}

impl TelemetryService {
    /// Build the service from the startup configuration and the probe set
    /// the bus discovered.
    pub fn new(config: &MeteringConfig, bus: &impl ProbeBus, now_ms: u64) -> Self {
        Self {
            meter: PulseMeter::new(config, now_ms),
            sampler: TemperatureSampler::new(config, bus),
        }
    }

    /// Topic suffixes the messaging layer must subscribe to so retained
    /// energy totals flow back in for cumulative channels.
    pub fn restore_subscriptions(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.meter.channel_count())
            .filter(|&i| self.meter.is_cumulative(i))
            .map(watthour_topic)
    }

    /// One scheduler tick. `now_ms` is sampled once by the caller and used
    /// for every decision in this tick.
    pub fn tick(
        &mut self,
        now_ms: u64,
        latch: &EdgeLatch,
        bus: &mut impl ProbeBus,
        live_config: &MeteringConfig,
        sink: &mut impl TelemetrySink,
    ) -> Result<(), FatalFault> {
        self.meter.tick(now_ms, latch, live_config, sink)?;
        self.sampler.tick(now_ms, bus, sink);
        Ok(())
    }

    /// Handle an inbound command from the messaging layer.
    pub fn handle_command(&mut self, command: Command) {
        match command {
            Command::RestoreEnergy {
                channel,
                watt_hours,
            } => {
                info!(
                    "Restore request: channel {} -> {:.2} Wh",
                    channel + 1,
                    watt_hours
                );
                self.meter.restore_energy(channel, watt_hours);
            }
        }
    }

    /// One status-page table row, or `None` past the end of the set.
    pub fn render_table_row(&self, kind: StatusKind, idx: usize) -> Option<String> {
        match kind {
            StatusKind::EnergyMeter => energy_table_row(&self.meter, idx),
            StatusKind::Temperature => temperature_table_row(&self.sampler, idx),
        }
    }

    /// One status-page JSON entry, or `None` past the end of the set.
    pub fn render_json_entry(&self, kind: StatusKind, idx: usize) -> Option<String> {
        match kind {
            StatusKind::EnergyMeter => energy_json_entry(&self.meter, idx),
            StatusKind::Temperature => temperature_json_entry(&self.sampler, idx),
        }
    }

    pub fn meter(&self) -> &PulseMeter {
        &self.meter
    }

    pub fn sampler(&self) -> &TemperatureSampler {
        &self.sampler
    }
}
