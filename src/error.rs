//! Unified error types for the sensor drivers.
//!
//! Every driver operation returns [`SensorError`]; configuration checks
//! return the top-level [`Error`], which sensor errors also convert into so
//! the firmware loop has a single type to match on.  All variants are
//! `Copy` so they can be passed around without allocation.

use core::fmt;

use embedded_hal::digital::{self, ErrorKind};

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor transaction failed.
    Sensor(SensorError),
    /// Configuration is out of range.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

/// Where a bounded wait ran out of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPhase {
    /// Echo line never rose after the trigger pulse.
    EchoRise,
    /// Load-cell amplifier never pulled its data line low.
    DataReady,
}

impl fmt::Display for TimeoutPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EchoRise => write!(f, "echo rise"),
            Self::DataReady => write!(f, "data ready"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The driver has no pins yet; `init` was never called.
    NotInitialized,
    /// A polled line did not change within its deadline.
    Timeout(TimeoutPhase),
    /// The calibration multiplier is zero.
    InvalidCalibration,
    /// The pin implementation reported a failure.
    Gpio(ErrorKind),
}

impl SensorError {
    /// Lift a HAL pin error into a sensor error.
    pub fn gpio<E: digital::Error>(e: E) -> Self {
        Self::Gpio(e.kind())
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "not initialized"),
            Self::Timeout(phase) => write!(f, "timed out waiting for {phase}"),
            Self::InvalidCalibration => write!(f, "calibration multiplier is zero"),
            Self::Gpio(kind) => write!(f, "GPIO failure ({kind:?})"),
        }
    }
}

impl core::error::Error for SensorError {}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
