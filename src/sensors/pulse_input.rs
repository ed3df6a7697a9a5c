//! S0 pulse input GPIO registration (ESP-IDF only).
//!
//! Wires each configured channel pin to a rising-edge interrupt whose
//! handler does exactly one thing: store "now" into the channel's
//! [`EDGE_LATCH`] slot. Everything else — debounce, power, reporting —
//! happens later in the cooperative loop.

use esp_idf_hal::gpio::{AnyIOPin, InterruptType, PinDriver, Pull};
use log::info;

use crate::config::MeteringConfig;
use crate::error::Error;
use crate::metering::EDGE_LATCH;

/// Milliseconds since boot, ISR-safe (`esp_timer_get_time` is documented
/// callable from interrupt context).
fn isr_now_ms() -> u64 {
    (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
}

/// Holds the pin drivers so the interrupt subscriptions stay alive.
pub struct PulseInputs {
    _pins: Vec<PinDriver<'static, AnyIOPin, esp_idf_hal::gpio::Input>>,
}

impl PulseInputs {
    /// Configure every channel pin as a pulled-up input with a
    /// rising-edge interrupt feeding the edge latch.
    pub fn attach(config: &MeteringConfig) -> Result<Self, Error> {
        let mut pins = Vec::new();
        for (channel, ch_cfg) in config.channels.iter().enumerate() {
            // SAFETY: pin numbers come from validated settings; each pin
            // is claimed exactly once, here.
            let pin = unsafe { AnyIOPin::new(ch_cfg.gpio_pin) };
            let mut driver =
                PinDriver::input(pin).map_err(|_| Error::Init("pulse input pin setup"))?;
            driver
                .set_pull(Pull::Up)
                .map_err(|_| Error::Init("pulse input pull-up"))?;
            driver
                .set_interrupt_type(InterruptType::PosEdge)
                .map_err(|_| Error::Init("pulse input interrupt type"))?;
            // SAFETY: the handler runs in ISR context and only performs
            // the bounded latch store; no allocation, no locking beyond
            // the latch's own critical section.
            unsafe {
                driver
                    .subscribe(move || EDGE_LATCH.record_edge(channel, isr_now_ms()))
                    .map_err(|_| Error::Init("pulse input ISR subscribe"))?;
            }
            driver
                .enable_interrupt()
                .map_err(|_| Error::Init("pulse input interrupt enable"))?;
            info!(
                "S0 channel {} armed on GPIO{}",
                channel + 1,
                ch_cfg.gpio_pin
            );
            pins.push(driver);
        }
        Ok(Self { _pins: pins })
    }
}
