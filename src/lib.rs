//! CupScale sensor acquisition library.
//!
//! Polled drivers for the HC-SR04 ultrasonic range finder and the HX711
//! load-cell amplifier.  The drivers only see `embedded-hal` pins and the
//! [`ports::MonotonicClock`] time base, so everything below runs on the host
//! against simulated hardware.  ESP-IDF specifics are guarded by
//! `#[cfg(target_os = "espidf")]` inside [`adapters`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod config;
pub mod error;
pub mod ports;
pub mod sensors;

pub use config::{Calibration, DistanceConfig, SensorConfig, TimeoutPolicy, WeightConfig};
pub use error::{Error, SensorError, TimeoutPhase};
pub use sensors::{DistanceSensor, WeightSensor};
