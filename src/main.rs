//! HeatMon Firmware — Main Entry Point
//!
//! Single cooperative loop driving the telemetry service:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                   │
//! │                                                            │
//! │  PulseInputs     Ds18b20Bus     LogTelemetrySink           │
//! │  (GPIO ISRs)     (ProbeBus)     (TelemetrySink)            │
//! │                                                            │
//! │  ──────────────── Port Trait Boundary ───────────────      │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────┐      │
//! │  │        TelemetryService (pure logic)             │      │
//! │  │  PulseMeter · TemperatureSampler                 │      │
//! │  └──────────────────────────────────────────────────┘      │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The settings layer, web server and MQTT client live in separate
//! binaries/components and talk to this core through its ports.

#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info};

use heatmon::adapters::log_sink::LogTelemetrySink;
use heatmon::adapters::time::MonotonicClock;
use heatmon::app::service::TelemetryService;
use heatmon::config::MeteringConfig;
use heatmon::metering::EDGE_LATCH;
use heatmon::sensors::onewire::Ds18b20Bus;
use heatmon::sensors::pulse_input::PulseInputs;

/// Cooperative tick period. Both subsystems schedule their own cadences
/// internally; the loop only needs to be comfortably faster than the
/// 5-second minimum report interval.
const TICK_MS: u32 = 100;

/// How long to wait before the restart on a fatal fault, so the log line
/// makes it out of the UART buffer.
const RESTART_DELAY_MS: u32 = 1_000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("HeatMon v{} starting", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    // The JSON settings layer hands us a validated MeteringConfig at
    // startup; defaults stand in until it is wired up.
    let config = MeteringConfig::default();

    // ── 3. Hardware: pulse interrupts + 1-wire scan ───────────
    let _pulse_inputs = match PulseInputs::attach(&config) {
        Ok(p) => p,
        Err(e) => {
            error!("Pulse input init failed: {e} — halting");
            #[allow(clippy::empty_loop)]
            loop {}
        }
    };

    let mut onewire_pin = esp_idf_hal::gpio::PinDriver::input_output_od(unsafe {
        esp_idf_hal::gpio::AnyIOPin::new(4)
    })?;
    onewire_pin.set_pull(esp_idf_hal::gpio::Pull::Up)?;
    let mut bus = match Ds18b20Bus::scan(onewire_pin) {
        Ok(b) => b,
        Err(e) => {
            error!("1-wire init failed: {e} — halting");
            #[allow(clippy::empty_loop)]
            loop {}
        }
    };

    // ── 4. Service ────────────────────────────────────────────
    let clock = MonotonicClock::new();
    let mut sink = LogTelemetrySink::new();
    let mut service = TelemetryService::new(&config, &bus, clock.now_ms());

    for topic in service.restore_subscriptions() {
        // The messaging layer subscribes to these once it connects.
        info!("Restore topic for messaging layer: {topic}");
    }

    // ── 5. Cooperative loop ───────────────────────────────────
    loop {
        let now_ms = clock.now_ms();
        if let Err(fault) = service.tick(now_ms, &EDGE_LATCH, &mut bus, &config, &mut sink) {
            // The restart *is* the recovery: state reinitialises from
            // scratch, which is the only safe answer to corruption.
            error!("Fatal fault: {fault} — restarting");
            esp_idf_hal::delay::FreeRtos::delay_ms(RESTART_DELAY_MS);
            unsafe { esp_idf_svc::sys::esp_restart() };
        }
        esp_idf_hal::delay::FreeRtos::delay_ms(TICK_MS);
    }
}
