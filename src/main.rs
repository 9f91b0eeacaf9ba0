//! CupScale firmware — sensor bring-up harness.
//!
//! Wires the HC-SR04 and HX711 to their GPIOs, tares the scale once and
//! then logs a distance and a weight reading every poll period.  Useful on
//! the bench to check wiring and calibration before the application layer
//! is flashed on top.
//!
//! ```text
//!   GPIO12 ──▶ HC-SR04 TRIG        GPIO4 ◀── HX711 DOUT
//!   GPIO13 ◀── HC-SR04 ECHO        GPIO5 ──▶ HX711 PD_SCK
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::peripherals::Peripherals;
use log::{info, warn};

use cupscale::adapters::time::SystemClock;
use cupscale::{DistanceSensor, SensorConfig, WeightSensor};

/// Gap between readings.  The HC-SR04 needs >60 ms between triggers.
const POLL_INTERVAL_MS: u32 = 100;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("CupScale v{} sensor bring-up", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let config = SensorConfig::default();
    config.validate()?;

    // ── 3. Pins ───────────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let trigger = PinDriver::output(peripherals.pins.gpio12)?;
    let echo = PinDriver::input(peripherals.pins.gpio13)?;
    let dout = PinDriver::input(peripherals.pins.gpio4)?;
    let sck = PinDriver::output(peripherals.pins.gpio5)?;

    // ── 4. Drivers ────────────────────────────────────────────
    let mut distance = DistanceSensor::new(SystemClock::new(), config.distance);
    distance.init(trigger, echo)?;

    let mut weight = WeightSensor::new(SystemClock::new(), config.weight);
    weight.init(dout, sck)?;

    // Scale must be empty at boot for this tare to be meaningful.
    if let Err(e) = weight.tare() {
        warn!("Tare failed ({}), weights are relative to zero counts", e);
    }

    // ── 5. Poll loop ──────────────────────────────────────────
    loop {
        match distance.read_distance() {
            Ok(mm) => info!("distance: {} mm", mm),
            Err(e) => warn!("distance: {}", e),
        }

        match weight.read_weight(config.calibration) {
            Ok(g) => info!("weight: {} g (raw tare {})", g, weight.tare_offset()),
            Err(e) => warn!("weight: {}", e),
        }

        FreeRtos::delay_ms(POLL_INTERVAL_MS);
    }
}
