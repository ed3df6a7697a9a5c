//! Metering configuration parameters
//!
//! All tunable parameters for the pulse-metering and temperature-telemetry
//! engine. The structs are created once at startup by the settings layer
//! (JSON persistence lives outside this crate) and consumed read-only here.

use heapless::Vec;
use serde::{Deserialize, Serialize};

/// Number of S0 pulse-counter inputs on the feature board.
pub const MAX_PULSE_CHANNELS: usize = 2;

/// Maximum number of 1-wire temperature probes serviced on the bus.
pub const MAX_TEMP_PROBES: usize = 16;

/// Debounce window for S0 pulse edges. Edges closer together than this
/// are electrical noise, not energy; the window also guards the power
/// division against a zero interval.
pub const DEBOUNCE_MS: u64 = 50;

/// Fastest cadence at which a channel's power/energy is reported.
pub const MIN_REPORT_INTERVAL_MS: u64 = 5_000;

/// Largest physically plausible temperature change, degrees C per second.
/// Candidates implying a faster slew are filtered as bad readings.
pub const MAX_TEMP_SLEW_C_PER_SEC: f32 = 0.5;

/// Readings below this are the 1-wire "device disconnected" sentinel
/// (DS18B20 reports -127.0 when the probe is absent or the bus faults).
pub const PROBE_OFFLINE_C: f32 = -120.0;

/// One S0 energy-meter input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulseChannelConfig {
    /// GPIO pin the meter's open-collector output is wired to.
    pub gpio_pin: i32,
    /// Calibration constant of the attached meter (pulses per kWh).
    pub pulses_per_kwh: u32,
    /// Reporting period while the channel sits in the standby regime
    /// (observed power too low for the fast cadence), seconds.
    pub standby_interval_secs: u32,
    /// When set, the pulse count is cumulative: never reset between
    /// reports, and restorable from an externally persisted total.
    pub accumulate_energy: bool,
}

/// Core metering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeteringConfig {
    /// S0 pulse channels, at most [`MAX_PULSE_CHANNELS`].
    pub channels: Vec<PulseChannelConfig, MAX_PULSE_CHANNELS>,

    // --- Temperature cadences ---
    /// 1-wire conversion/poll period (seconds).
    pub probe_poll_interval_secs: u32,
    /// Period of the forced "report every probe" timer (seconds).
    pub full_report_interval_secs: u32,
}

impl Default for MeteringConfig {
    fn default() -> Self {
        let mut channels = Vec::new();
        // Two S0 ports as wired on the feature board.
        let _ = channels.push(PulseChannelConfig {
            gpio_pin: 12,
            pulses_per_kwh: 1000,
            standby_interval_secs: 60,
            accumulate_energy: false,
        });
        let _ = channels.push(PulseChannelConfig {
            gpio_pin: 14,
            pulses_per_kwh: 1000,
            standby_interval_secs: 60,
            accumulate_energy: false,
        });
        Self {
            channels,
            probe_poll_interval_secs: 30,
            full_report_interval_secs: 300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = MeteringConfig::default();
        assert!(!c.channels.is_empty());
        for ch in &c.channels {
            assert!(ch.pulses_per_kwh > 0);
            assert!(ch.standby_interval_secs > 0);
        }
        assert!(c.probe_poll_interval_secs > 0);
        assert!(c.full_report_interval_secs >= c.probe_poll_interval_secs);
    }

    #[test]
    fn serde_roundtrip() {
        let c = MeteringConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: MeteringConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c, c2);
    }

    #[test]
    fn timing_ratios_make_sense() {
        let c = MeteringConfig::default();
        for ch in &c.channels {
            assert!(
                u64::from(ch.standby_interval_secs) * 1000 >= MIN_REPORT_INTERVAL_MS,
                "standby cadence must not be faster than the minimum report interval"
            );
        }
        assert!(
            DEBOUNCE_MS < MIN_REPORT_INTERVAL_MS,
            "debounce window must sit well inside the report cadence"
        );
    }
}
