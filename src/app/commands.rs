//! Inbound commands to the telemetry service.
//!
//! The messaging layer forwards messages arriving on our control topics;
//! the service interprets them. Today there is exactly one operation:
//! reseeding a cumulative channel's energy total after a restart.

use crate::topics::parse_restore_topic;

/// Commands that external adapters can send into the metering core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Restore the accumulated energy of channel `channel` (0-based) to
    /// `watt_hours`, typically from a retained message holding the last
    /// published total.
    RestoreEnergy { channel: usize, watt_hours: f32 },
}

impl Command {
    /// Decode an inbound `(topic suffix, payload)` pair. Returns `None`
    /// for topics we do not handle or payloads that do not parse; the
    /// messaging layer drops those silently.
    pub fn from_message(topic_suffix: &str, payload: &str) -> Option<Self> {
        let channel = parse_restore_topic(topic_suffix)?;
        let watt_hours: f32 = payload.trim().parse().ok()?;
        if !watt_hours.is_finite() || watt_hours < 0.0 {
            return None;
        }
        Some(Self::RestoreEnergy {
            channel,
            watt_hours,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_message_decodes() {
        let cmd = Command::from_message("energy-meter/Watthour/1", "12345.67");
        assert_eq!(
            cmd,
            Some(Command::RestoreEnergy {
                channel: 0,
                watt_hours: 12345.67
            })
        );
    }

    #[test]
    fn bad_payloads_are_rejected() {
        assert_eq!(Command::from_message("energy-meter/Watthour/1", "abc"), None);
        assert_eq!(Command::from_message("energy-meter/Watthour/1", "-5.0"), None);
        assert_eq!(Command::from_message("energy-meter/Watthour/1", "NaN"), None);
        assert_eq!(Command::from_message("energy-meter/Watt/1", "100"), None);
    }
}
