//! Status-page fragments.
//!
//! The web layer owns the surrounding page; this module renders one table
//! row or one JSON entry per channel/probe, purely derived from current
//! state with no side effects.

use crate::metering::PulseMeter;
use crate::sampling::TemperatureSampler;

/// Which status table an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    EnergyMeter,
    Temperature,
}

/// `<tr>` fragment for an S0 channel: 1-based index, watts, in-progress
/// watt-hours.
pub fn energy_table_row(meter: &PulseMeter, idx: usize) -> Option<String> {
    let watt = meter.watt(idx)?;
    let wh = meter.pending_watthour(idx)?;
    Some(format!(
        "<tr><td>{}</td><td>{}</td><td>{:.2}</td></tr>",
        idx + 1,
        watt,
        wh
    ))
}

/// JSON object for an S0 channel.
pub fn energy_json_entry(meter: &PulseMeter, idx: usize) -> Option<String> {
    let watt = meter.watt(idx)?;
    let wh = meter.pending_watthour(idx)?;
    Some(format!(
        "{{\"S0 port\": \"{}\", \"Watt\": \"{}\", \"Watthour\": \"{:.2}\"}}",
        idx + 1,
        watt,
        wh
    ))
}

/// `<tr>` fragment for a temperature probe: address and last good value
/// ("-" until a reading has survived filtering).
pub fn temperature_table_row(sampler: &TemperatureSampler, idx: usize) -> Option<String> {
    let address = sampler.address(idx)?;
    Some(match sampler.last_good(idx) {
        Some(t) => format!("<tr><td>{address}</td><td>{t:.2}</td></tr>"),
        None => format!("<tr><td>{address}</td><td>-</td></tr>"),
    })
}

/// JSON object for a temperature probe.
pub fn temperature_json_entry(sampler: &TemperatureSampler, idx: usize) -> Option<String> {
    let address = sampler.address(idx)?;
    Some(match sampler.last_good(idx) {
        Some(t) => {
            format!("{{\"Sensor\": \"{address}\", \"Temperature\": \"{t:.2}\"}}")
        }
        None => format!("{{\"Sensor\": \"{address}\", \"Temperature\": \"-\"}}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MeteringConfig;

    #[test]
    fn energy_rows_render_for_configured_channels() {
        let cfg = MeteringConfig::default();
        let meter = PulseMeter::new(&cfg, 0);

        let row = energy_table_row(&meter, 0).unwrap();
        assert_eq!(row, "<tr><td>1</td><td>0</td><td>0.00</td></tr>");
        assert!(energy_table_row(&meter, cfg.channels.len()).is_none());

        let json = energy_json_entry(&meter, 1).unwrap();
        assert!(json.contains("\"S0 port\": \"2\""));
        assert!(json.contains("\"Watthour\": \"0.00\""));
    }
}
