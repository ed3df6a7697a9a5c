//! Topic shape for published measurements.
//!
//! Transport-agnostic: `<base>/<domain>/<metric>/<index>` where the base
//! prefix belongs to the messaging layer. The energy-meter index is the
//! 1-based channel number; the temperature index is the probe's
//! hex-encoded bus address.

/// Domain segment for S0 energy-meter measurements.
pub const DOMAIN_ENERGY_METER: &str = "energy-meter";
/// Domain segment for 1-wire temperature measurements.
pub const DOMAIN_TEMPERATURE: &str = "temperature";

pub const METRIC_WATT: &str = "Watt";
pub const METRIC_WATTHOUR: &str = "Watthour";
pub const METRIC_TEMPERATURE: &str = "Temperature";

/// `<domain>/Watt/<n>` for channel index `channel` (0-based in, 1-based out).
pub fn watt_topic(channel: usize) -> String {
    format!("{DOMAIN_ENERGY_METER}/{METRIC_WATT}/{}", channel + 1)
}

/// `<domain>/Watthour/<n>` for channel index `channel` (0-based in, 1-based out).
pub fn watthour_topic(channel: usize) -> String {
    format!("{DOMAIN_ENERGY_METER}/{METRIC_WATTHOUR}/{}", channel + 1)
}

/// `<domain>/Temperature/<address>` for a probe identifier.
pub fn temperature_topic(address: &str) -> String {
    format!("{DOMAIN_TEMPERATURE}/{METRIC_TEMPERATURE}/{address}")
}

/// Parse an inbound `energy-meter/Watthour/<n>` suffix into a 0-based
/// channel index. Returns `None` for anything else; range validation
/// against the actual channel set happens in the meter.
pub fn parse_restore_topic(suffix: &str) -> Option<usize> {
    let rest = suffix.strip_prefix(DOMAIN_ENERGY_METER)?;
    let rest = rest.strip_prefix('/')?;
    let rest = rest.strip_prefix(METRIC_WATTHOUR)?;
    let rest = rest.strip_prefix('/')?;
    let n: usize = rest.parse().ok()?;
    n.checked_sub(1)
}
