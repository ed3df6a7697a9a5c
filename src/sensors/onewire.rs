//! 1-wire DS18B20 probe bus.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the bus through `one-wire-bus` + `ds18b20`, scanning
//! for probes once at startup and reading each by ROM address afterwards.
//! On host/test: [`SimProbeBus`] holds injectable values so the sampler's
//! filtering can be exercised without hardware.
//!
//! Both implement [`ProbeBus`]. A failed bus transaction is reported as
//! the offline sentinel value, never as an error type — the sampler's
//! filter handles it like any other offline probe.

#[cfg(not(target_os = "espidf"))]
pub use sim::SimProbeBus;

#[cfg(feature = "espidf")]
pub use esp::Ds18b20Bus;

#[cfg(not(target_os = "espidf"))]
mod sim {
    use crate::app::ports::ProbeBus;

    /// Injectable probe bus for host-side tests and simulation.
    pub struct SimProbeBus {
        probes: Vec<(String, f32)>,
    }

    impl SimProbeBus {
        pub fn new(addresses: &[&str]) -> Self {
            Self {
                probes: addresses.iter().map(|a| ((*a).to_string(), 20.0)).collect(),
            }
        }

        /// Inject the value the next conversion will yield for `idx`.
        pub fn set_celsius(&mut self, idx: usize, celsius: f32) {
            if let Some(p) = self.probes.get_mut(idx) {
                p.1 = celsius;
            }
        }
    }

    impl ProbeBus for SimProbeBus {
        fn probe_count(&self) -> usize {
            self.probes.len()
        }

        fn address(&self, idx: usize) -> &str {
            &self.probes[idx].0
        }

        fn request_conversion(&mut self) {}

        fn read_celsius(&mut self, idx: usize) -> f32 {
            self.probes[idx].1
        }
    }
}

#[cfg(feature = "espidf")]
mod esp {
    use ds18b20::{Ds18b20, Resolution};
    use esp_idf_hal::delay::{Ets, FreeRtos};
    use log::{info, warn};
    use one_wire_bus::{Address, OneWire};

    use crate::app::ports::ProbeBus;
    use crate::config::MAX_TEMP_PROBES;
    use crate::error::Error;

    /// Value returned for a probe whose read failed; below
    /// [`PROBE_OFFLINE_C`](crate::config::PROBE_OFFLINE_C) so the sampler
    /// treats it as offline.
    const READ_FAILED_C: f32 = -127.0;

    struct Probe {
        sensor: Ds18b20,
        address: String,
    }

    /// DS18B20 bus driver. `P` is the open-drain data pin.
    pub struct Ds18b20Bus<P>
    where
        P: embedded_hal_02::digital::v2::OutputPin + embedded_hal_02::digital::v2::InputPin,
    {
        bus: OneWire<P>,
        probes: Vec<Probe>,
    }

    impl<P, E> Ds18b20Bus<P>
    where
        P: embedded_hal_02::digital::v2::OutputPin<Error = E>
            + embedded_hal_02::digital::v2::InputPin<Error = E>,
        E: core::fmt::Debug,
    {
        /// Scan the bus and build the probe set. The set is fixed for the
        /// process lifetime; probes appearing later are picked up at the
        /// next restart.
        pub fn scan(pin: P) -> Result<Self, Error> {
            let mut bus = OneWire::new(pin).map_err(|_| Error::Init("1-wire bus setup"))?;
            let mut probes = Vec::new();

            let mut held: one_wire_bus::SearchState;
            let mut state = None;
            loop {
                match bus.device_search(state, false, &mut Ets) {
                    Ok(None) => break,
                    Ok(Some((device_address, s))) => {
                        if probes.len() == MAX_TEMP_PROBES {
                            warn!("Reached max 1-wire probe count, ignoring further devices");
                            break;
                        }
                        if let Ok(sensor) = Ds18b20::new::<E>(device_address) {
                            let address = format_address(device_address);
                            info!("Found 1-wire probe: {address}");
                            probes.push(Probe { sensor, address });
                        }
                        held = s;
                        state = Some(&held);
                    }
                    Err(_) => return Err(Error::Init("1-wire device search")),
                }
            }

            info!("Number of 1-wire probes on bus: {}", probes.len());
            Ok(Self { bus, probes })
        }
    }

    fn format_address(address: Address) -> String {
        format!("{:016x}", address.0)
    }

    impl<P, E> ProbeBus for Ds18b20Bus<P>
    where
        P: embedded_hal_02::digital::v2::OutputPin<Error = E>
            + embedded_hal_02::digital::v2::InputPin<Error = E>,
        E: core::fmt::Debug,
    {
        fn probe_count(&self) -> usize {
            self.probes.len()
        }

        fn address(&self, idx: usize) -> &str {
            &self.probes[idx].address
        }

        fn request_conversion(&mut self) {
            if ds18b20::start_simultaneous_temp_measurement(&mut self.bus, &mut Ets).is_err() {
                warn!("1-wire conversion request failed");
                return;
            }
            Resolution::Bits12.delay_for_measurement_time(&mut FreeRtos);
        }

        fn read_celsius(&mut self, idx: usize) -> f32 {
            match self.probes[idx].sensor.read_data(&mut self.bus, &mut Ets) {
                Ok(data) => data.temperature,
                Err(_) => READ_FAILED_C,
            }
        }
    }
}
