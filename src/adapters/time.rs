//! Platform time base.
//!
//! Implements [`MonotonicClock`] and [`DelayNs`] for the sensor drivers.
//!
//! - **`target_os = "espidf"`** — counters come from `esp_timer_get_time()`
//!   (64-bit µs since boot, truncated to the wrapping 32-bit ports) and
//!   delays from the ROM busy-wait behind `esp_idf_hal::delay::Ets`.
//! - **`not(target_os = "espidf")`** — `std::time::Instant` with spin
//!   delays, for host-side benches and simulation.

use embedded_hal::delay::DelayNs;

use crate::ports::MonotonicClock;

/// Busy-waiting clock for the current platform.
pub struct SystemClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot, full width.
    #[cfg(target_os = "espidf")]
    fn uptime_us(&self) -> u64 {
        (unsafe { esp_idf_sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since construction, full width.
    #[cfg(not(target_os = "espidf"))]
    fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl MonotonicClock for SystemClock {
    fn now_us(&mut self) -> u32 {
        self.uptime_us() as u32
    }

    fn now_ms(&mut self) -> u32 {
        (self.uptime_us() / 1000) as u32
    }
}

#[cfg(target_os = "espidf")]
impl DelayNs for SystemClock {
    fn delay_ns(&mut self, ns: u32) {
        esp_idf_hal::delay::Ets::delay_us(ns.div_ceil(1000));
    }

    fn delay_us(&mut self, us: u32) {
        esp_idf_hal::delay::Ets::delay_us(us);
    }
}

#[cfg(not(target_os = "espidf"))]
impl DelayNs for SystemClock {
    fn delay_ns(&mut self, ns: u32) {
        let until = std::time::Instant::now() + std::time::Duration::from_nanos(u64::from(ns));
        while std::time::Instant::now() < until {
            core::hint::spin_loop();
        }
    }
}
