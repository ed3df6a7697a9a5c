//! S0 pulse meter — debounce, power estimation and adaptive reporting.
//!
//! Attached energy meters close a contact once per fixed energy increment;
//! the GPIO ISR latches the edge timestamp and this module does everything
//! else from the cooperative loop: debounce, instantaneous power from the
//! pulse interval, energy accumulation, and the decision of *when* each
//! channel's measurements are pushed to the [`TelemetrySink`].
//!
//! ## Reporting regimes
//!
//! A channel whose observed power is below the level at which one pulse
//! per `standby_interval_secs` would arrive is in the *standby* regime and
//! reports at that slower cadence; otherwise it reports every
//! [`MIN_REPORT_INTERVAL_MS`]. In both regimes the reported power is
//! clamped against the maximum power physically consistent with the time
//! since the last pulse, so a stale high reading cannot persist through a
//! long silence.

use heapless::Vec;
use log::{debug, error, info, warn};

use crate::app::ports::TelemetrySink;
use crate::config::{
    DEBOUNCE_MS, MAX_PULSE_CHANNELS, MIN_REPORT_INTERVAL_MS, MeteringConfig, PulseChannelConfig,
};
use crate::error::FatalFault;
use crate::metering::latch::EdgeLatch;
use crate::topics::{watt_topic, watthour_topic};

/// Milliseconds per kWh-normalised hour: one pulse every `interval` ms at
/// `ppkwh` pulses/kWh is `3_600_000_000 / (interval * ppkwh)` watts.
const MS_PER_KWH_HOUR: f64 = 3_600_000_000.0;

/// Mutable per-channel metering state, owned exclusively by the meter.
#[derive(Debug, Clone, Copy)]
struct ChannelState {
    /// Timestamp of the most recently accepted edge; 0 = none since boot.
    last_edge_ms: u64,
    /// Accepted pulses since the last report (or since boot when the
    /// channel accumulates energy).
    pulses: u32,
    /// Instantaneous power estimate, watts.
    watt: u32,
    /// When the next report is due. Monotonically non-decreasing except
    /// when a fresh pulse after an idle period forces it to "now".
    next_report_ms: u64,
}

/// The pulse-metering engine for all S0 channels.
pub struct PulseMeter {
    /// Configuration captured at initialisation. Compared against the live
    /// settings every tick; divergence means memory corruption.
    captured: Vec<PulseChannelConfig, MAX_PULSE_CHANNELS>,
    states: Vec<ChannelState, MAX_PULSE_CHANNELS>,
}

impl PulseMeter {
    /// Capture the channel configuration and initialise per-channel state.
    /// The first report is scheduled one interval out, not directly at boot.
    pub fn new(config: &MeteringConfig, now_ms: u64) -> Self {
        let mut states = Vec::new();
        for _ in &config.channels {
            let _ = states.push(ChannelState {
                last_edge_ms: 0,
                pulses: 0,
                watt: 0,
                next_report_ms: now_ms + MIN_REPORT_INTERVAL_MS,
            });
        }
        Self {
            captured: config.channels.clone(),
            states,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.states.len()
    }

    /// Current power estimate for a channel, watts.
    pub fn watt(&self, channel: usize) -> Option<u32> {
        self.states.get(channel).map(|s| s.watt)
    }

    /// Energy accumulated since the last report (or since boot for a
    /// cumulative channel), watt-hours.
    pub fn pending_watthour(&self, channel: usize) -> Option<f64> {
        let st = self.states.get(channel)?;
        let cfg = self.captured.get(channel)?;
        Some(f64::from(st.pulses) * (1000.0 / f64::from(cfg.pulses_per_kwh)))
    }

    /// Whether a channel accumulates energy across reports (and is thus a
    /// candidate for [`restore_energy`](Self::restore_energy)).
    pub fn is_cumulative(&self, channel: usize) -> bool {
        self.captured
            .get(channel)
            .is_some_and(|c| c.accumulate_energy)
    }

    /// Reseed a cumulative channel's pulse count from a persisted
    /// watt-hour total. An out-of-range channel is a logged no-op, never
    /// an index fault.
    pub fn restore_energy(&mut self, channel: usize, watt_hours: f32) {
        let Some(cfg) = self.captured.get(channel) else {
            warn!("Ignoring energy restore for unknown channel {}", channel + 1);
            return;
        };
        let pulses = (watt_hours * cfg.pulses_per_kwh as f32 / 1000.0).round() as u32;
        self.states[channel].pulses = pulses;
        info!(
            "Restored {:.2} Wh on S0 channel {} ({} pulses)",
            watt_hours,
            channel + 1,
            pulses
        );
    }

    /// Integrity self-check: the live settings must still equal the
    /// snapshot captured at initialisation. A mismatch is treated as
    /// memory corruption and is fatal — the supervisor restarts us.
    fn verify_config(&self, live: &MeteringConfig) -> Result<(), FatalFault> {
        if self.captured != live.channels {
            error!("S0 settings corrupted, requesting restart");
            return Err(FatalFault::ConfigCorrupted);
        }
        Ok(())
    }

    /// Run one metering tick: drain newly latched edges, then emit reports
    /// for every channel whose cadence is due. `now_ms` is the monotonic
    /// clock sampled once by the caller for the whole tick.
    pub fn tick(
        &mut self,
        now_ms: u64,
        latch: &EdgeLatch,
        live: &MeteringConfig,
        sink: &mut impl TelemetrySink,
    ) -> Result<(), FatalFault> {
        self.verify_config(live)?;

        for i in 0..self.states.len() {
            self.handle_edge(i, now_ms, latch);
            self.report_if_due(i, now_ms, sink);
        }
        Ok(())
    }

    /// Step 1–3: fetch a candidate edge, debounce, update power and count.
    fn handle_edge(&mut self, i: usize, now_ms: u64, latch: &EdgeLatch) {
        let cfg = &self.captured[i];
        let st = &mut self.states[i];

        let Some(edge_ms) = latch.read_if_newer(i, st.last_edge_ms) else {
            return;
        };
        let interval = edge_ms.saturating_sub(st.last_edge_ms);
        if interval <= DEBOUNCE_MS {
            // Contact bounce; also guards the division below against a
            // zero interval.
            return;
        }

        if st.last_edge_ms > 0 {
            st.watt = (MS_PER_KWH_HOUR / interval as f64 / f64::from(cfg.pulses_per_kwh)) as u32;
        }
        // First edge since boot: leave power at 0 rather than reporting a
        // misleadingly high value computed against the boot timestamp.
        st.last_edge_ms = edge_ms;
        st.pulses += 1;

        if st.next_report_ms > now_ms + MIN_REPORT_INTERVAL_MS {
            // The channel was waiting out a standby window; a live pulse
            // warrants a prompt report instead.
            st.next_report_ms = now_ms;
        }
        debug!(
            "S0 channel {} pulse accepted, {} pulses since last reset",
            i + 1,
            st.pulses
        );
    }

    /// Step 4: when the cadence is due, clamp the power estimate against
    /// the physical ceiling, pick the next cadence and publish.
    fn report_if_due(&mut self, i: usize, now_ms: u64, sink: &mut impl TelemetrySink) {
        let cfg = &self.captured[i];
        let st = &mut self.states[i];

        if now_ms < st.next_report_ms {
            return;
        }

        // Highest power consistent with "no pulse for this long".
        let since_edge_ms = now_ms.saturating_sub(st.last_edge_ms).max(1);
        let ceiling_watt = MS_PER_KWH_HOUR / since_edge_ms as f64 / f64::from(cfg.pulses_per_kwh);

        // Power at which pulses arrive exactly once per standby interval.
        let standby_threshold = (3_600_000.0 / f64::from(cfg.pulses_per_kwh))
            / f64::from(cfg.standby_interval_secs);

        if f64::from(st.watt) < standby_threshold {
            st.next_report_ms = now_ms + u64::from(cfg.standby_interval_secs) * 1000;
            if f64::from(st.watt) / 2.0 > ceiling_watt {
                st.watt = (ceiling_watt / 2.0) as u32;
            }
        } else {
            st.next_report_ms = now_ms + MIN_REPORT_INTERVAL_MS;
            if f64::from(st.watt) > ceiling_watt {
                st.watt = ceiling_watt as u32;
            }
        }

        let watt_hours = f64::from(st.pulses) * (1000.0 / f64::from(cfg.pulses_per_kwh));
        if !cfg.accumulate_energy {
            // Each report covers only the interval since the previous one.
            st.pulses = 0;
        }

        info!(
            "S0 channel {}: {} W, {:.2} Wh",
            i + 1,
            st.watt,
            watt_hours
        );
        sink.publish(&watthour_topic(i), &format!("{watt_hours:.2}"), true);
        sink.publish(&watt_topic(i), &st.watt.to_string(), true);
    }
}
