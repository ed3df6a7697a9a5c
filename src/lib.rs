//! HeatMon firmware library.
//!
//! The pulse-metering and temperature-telemetry engine of the heat-pump
//! monitoring appliance: S0 energy-meter pulses and 1-wire temperature
//! readings in, validated and rate-limited measurements out through the
//! [`TelemetrySink`](app::ports::TelemetrySink) port.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by the `espidf`
//! feature / `target_os = "espidf"` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod metering;
pub mod sampling;
pub mod status;
pub mod topics;

pub mod error;

pub mod adapters;
pub mod sensors;
