//! Log-based telemetry sink adapter.
//!
//! Implements [`TelemetrySink`] by writing every publish to the logger
//! (UART / USB-CDC in production). Used until the messaging layer has a
//! broker connection, and as the sink of record under test.

use log::info;

use crate::app::ports::TelemetrySink;

/// Adapter that logs every measurement instead of transmitting it.
pub struct LogTelemetrySink;

impl LogTelemetrySink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogTelemetrySink {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySink for LogTelemetrySink {
    fn publish(&mut self, topic: &str, value: &str, retained: bool) {
        info!(
            "PUBLISH | {topic} = {value}{}",
            if retained { " (retained)" } else { "" }
        );
    }
}
