//! Application layer: port traits, inbound commands and the service that
//! orchestrates the metering core each tick.

pub mod commands;
pub mod ports;
pub mod service;
