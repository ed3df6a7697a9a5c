//! Adapters — concrete implementations of the port traits.
//!
//! | Adapter    | Implements     | Connects to                    |
//! |------------|----------------|--------------------------------|
//! | `log_sink` | TelemetrySink  | Serial log output              |
//! | `time`     | (clock source) | ESP32 system timer / `Instant` |
//!
//! The production MQTT/web sink lives in the messaging layer, outside
//! this crate; `log_sink` is the always-available fallback.

pub mod log_sink;
pub mod time;
