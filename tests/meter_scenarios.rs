//! End-to-end scenarios through the public service API.
//!
//! Runs on host only: time is simulated, pulses are injected into an
//! owned edge latch, probes come from the simulated 1-wire bus and every
//! publish lands in a recording sink.

#![cfg(not(target_os = "espidf"))]

use heatmon::app::commands::Command;
use heatmon::app::ports::TelemetrySink;
use heatmon::app::service::TelemetryService;
use heatmon::config::{MeteringConfig, PulseChannelConfig};
use heatmon::error::FatalFault;
use heatmon::metering::EdgeLatch;
use heatmon::sensors::onewire::SimProbeBus;
use heatmon::status::StatusKind;

// ── Recording sink ────────────────────────────────────────────

#[derive(Default)]
struct RecordingSink {
    published: Vec<(String, String, bool)>,
}

impl RecordingSink {
    fn value_of(&self, topic: &str) -> Option<&str> {
        self.published
            .iter()
            .rev()
            .find(|(t, _, _)| t == topic)
            .map(|(_, v, _)| v.as_str())
    }
}

impl TelemetrySink for RecordingSink {
    fn publish(&mut self, topic: &str, value: &str, retained: bool) {
        self.published
            .push((topic.to_string(), value.to_string(), retained));
    }
}

// ── Fixtures ──────────────────────────────────────────────────

fn test_config(accumulate: bool) -> MeteringConfig {
    let mut cfg = MeteringConfig::default();
    cfg.channels.clear();
    cfg.channels
        .push(PulseChannelConfig {
            gpio_pin: 12,
            pulses_per_kwh: 1000,
            standby_interval_secs: 300,
            accumulate_energy: accumulate,
        })
        .unwrap();
    cfg.channels
        .push(PulseChannelConfig {
            gpio_pin: 14,
            pulses_per_kwh: 2000,
            standby_interval_secs: 60,
            accumulate_energy: false,
        })
        .unwrap();
    cfg
}

// ── Pulse metering scenarios ──────────────────────────────────

#[test]
fn pulses_become_watt_and_watthour_reports() {
    let cfg = test_config(false);
    let latch = EdgeLatch::new();
    let mut bus = SimProbeBus::new(&[]);
    let mut sink = RecordingSink::default();
    let mut service = TelemetryService::new(&cfg, &bus, 0);

    // Two edges 3600 ms apart on channel 1: exactly 1000 W at 1000 ppkWh.
    latch.record_edge(0, 1000);
    service.tick(1000, &latch, &mut bus, &cfg, &mut sink).unwrap();
    latch.record_edge(0, 4600);
    service.tick(4600, &latch, &mut bus, &cfg, &mut sink).unwrap();
    assert!(sink.published.is_empty(), "no report before the cadence");

    service.tick(5000, &latch, &mut bus, &cfg, &mut sink).unwrap();
    assert_eq!(sink.value_of("energy-meter/Watt/1"), Some("1000"));
    assert_eq!(sink.value_of("energy-meter/Watthour/1"), Some("2.00"));

    // Channel 2 saw no pulses: 0 W, 0 Wh, same cadence.
    assert_eq!(sink.value_of("energy-meter/Watt/2"), Some("0"));
    assert_eq!(sink.value_of("energy-meter/Watthour/2"), Some("0.00"));

    // All measurements are retained.
    assert!(sink.published.iter().all(|(_, _, retained)| *retained));
}

#[test]
fn restore_command_reseeds_cumulative_channel() {
    let cfg = test_config(true);
    let latch = EdgeLatch::new();
    let mut bus = SimProbeBus::new(&[]);
    let mut sink = RecordingSink::default();
    let mut service = TelemetryService::new(&cfg, &bus, 0);

    let cmd = Command::from_message("energy-meter/Watthour/1", "250.00").unwrap();
    service.handle_command(cmd);

    service.tick(5000, &latch, &mut bus, &cfg, &mut sink).unwrap();
    assert_eq!(sink.value_of("energy-meter/Watthour/1"), Some("250.00"));

    // Cumulative: the total persists into the next report.
    service.tick(305_000, &latch, &mut bus, &cfg, &mut sink).unwrap();
    assert_eq!(sink.value_of("energy-meter/Watthour/1"), Some("250.00"));
}

#[test]
fn restore_for_unknown_channel_is_ignored() {
    let cfg = test_config(true);
    let latch = EdgeLatch::new();
    let mut bus = SimProbeBus::new(&[]);
    let mut sink = RecordingSink::default();
    let mut service = TelemetryService::new(&cfg, &bus, 0);

    // Channel 7 does not exist; the command must be a harmless no-op.
    let cmd = Command::from_message("energy-meter/Watthour/7", "250.00").unwrap();
    service.handle_command(cmd);

    service.tick(5000, &latch, &mut bus, &cfg, &mut sink).unwrap();
    assert_eq!(sink.value_of("energy-meter/Watthour/1"), Some("0.00"));
    assert_eq!(sink.value_of("energy-meter/Watthour/2"), Some("0.00"));
}

#[test]
fn only_cumulative_channels_get_restore_subscriptions() {
    let cfg = test_config(true);
    let bus = SimProbeBus::new(&[]);
    let service = TelemetryService::new(&cfg, &bus, 0);

    let topics: Vec<String> = service.restore_subscriptions().collect();
    assert_eq!(topics, vec!["energy-meter/Watthour/1".to_string()]);
}

#[test]
fn corrupted_settings_stop_all_reporting() {
    let cfg = test_config(false);
    let latch = EdgeLatch::new();
    let mut bus = SimProbeBus::new(&[]);
    let mut sink = RecordingSink::default();
    let mut service = TelemetryService::new(&cfg, &bus, 0);

    let mut corrupted = cfg.clone();
    corrupted.channels[1].gpio_pin = 99;

    let res = service.tick(10_000, &latch, &mut bus, &corrupted, &mut sink);
    assert_eq!(res, Err(FatalFault::ConfigCorrupted));
    assert!(
        sink.published.is_empty(),
        "no measurement may be emitted once corruption is detected"
    );
}

// ── Temperature scenarios ─────────────────────────────────────

#[test]
fn probe_readings_flow_to_the_sink() {
    let cfg = test_config(false);
    let latch = EdgeLatch::new();
    let mut bus = SimProbeBus::new(&["28ff4a1b00000042", "28ff4a1b00000043"]);
    bus.set_celsius(0, 21.53);
    bus.set_celsius(1, 35.0);
    let mut sink = RecordingSink::default();
    let mut service = TelemetryService::new(&cfg, &bus, 0);

    service.tick(0, &latch, &mut bus, &cfg, &mut sink).unwrap();
    assert_eq!(
        sink.value_of("temperature/Temperature/28ff4a1b00000042"),
        Some("21.53")
    );
    assert_eq!(
        sink.value_of("temperature/Temperature/28ff4a1b00000043"),
        Some("35.00")
    );
}

#[test]
fn offline_probe_keeps_its_last_value_on_the_status_page() {
    let cfg = test_config(false);
    let latch = EdgeLatch::new();
    let mut bus = SimProbeBus::new(&["28ff4a1b00000042"]);
    bus.set_celsius(0, 21.5);
    let mut sink = RecordingSink::default();
    let mut service = TelemetryService::new(&cfg, &bus, 0);

    service.tick(0, &latch, &mut bus, &cfg, &mut sink).unwrap();
    sink.published.clear();

    bus.set_celsius(0, -127.0);
    service.tick(30_000, &latch, &mut bus, &cfg, &mut sink).unwrap();
    assert!(sink.published.is_empty());
    assert_eq!(service.sampler().last_good(0), Some(21.5));
}

// ── Status rendering ──────────────────────────────────────────

#[test]
fn status_rows_render_both_domains() {
    let cfg = test_config(false);
    let latch = EdgeLatch::new();
    let mut bus = SimProbeBus::new(&["28ff4a1b00000042"]);
    bus.set_celsius(0, 21.5);
    let mut sink = RecordingSink::default();
    let mut service = TelemetryService::new(&cfg, &bus, 0);

    // Before any data: zero row for energy, dash for temperature.
    assert_eq!(
        service.render_table_row(StatusKind::Temperature, 0).unwrap(),
        "<tr><td>28ff4a1b00000042</td><td>-</td></tr>"
    );

    latch.record_edge(0, 1000);
    service.tick(1000, &latch, &mut bus, &cfg, &mut sink).unwrap();
    latch.record_edge(0, 4600);
    service.tick(4600, &latch, &mut bus, &cfg, &mut sink).unwrap();

    assert_eq!(
        service.render_table_row(StatusKind::EnergyMeter, 0).unwrap(),
        "<tr><td>1</td><td>1000</td><td>2.00</td></tr>"
    );
    assert_eq!(
        service.render_table_row(StatusKind::Temperature, 0).unwrap(),
        "<tr><td>28ff4a1b00000042</td><td>21.50</td></tr>"
    );
    assert_eq!(
        service.render_json_entry(StatusKind::EnergyMeter, 0).unwrap(),
        "{\"S0 port\": \"1\", \"Watt\": \"1000\", \"Watthour\": \"2.00\"}"
    );
    assert_eq!(
        service.render_json_entry(StatusKind::Temperature, 0).unwrap(),
        "{\"Sensor\": \"28ff4a1b00000042\", \"Temperature\": \"21.50\"}"
    );

    // Past the end of either set: None, so the web layer knows to stop.
    assert!(service.render_table_row(StatusKind::EnergyMeter, 2).is_none());
    assert!(service.render_json_entry(StatusKind::Temperature, 1).is_none());
}
