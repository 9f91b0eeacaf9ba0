//! Driver tunables and load-cell calibration.
//!
//! Defaults reproduce the timing of the shipped board.  The structs are
//! serde-serializable so the caller can keep them in NVS or send them over
//! a provisioning channel; this crate never persists anything itself.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// What a distance read reports when no echo arrives in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeoutPolicy {
    /// Report the farthest distance the timeout window can resolve.
    MaxRange,
    /// Report [`SensorError::Timeout`](crate::error::SensorError::Timeout).
    Error,
}

/// Ultrasonic (HC-SR04) timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceConfig {
    /// Deadline for each echo edge, in microseconds.
    pub echo_timeout_us: u32,
    /// Width of the trigger pulse, in microseconds.
    pub trigger_pulse_us: u32,
    pub on_timeout: TimeoutPolicy,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            echo_timeout_us: 10_000, // ~1.7 m round trip
            trigger_pulse_us: 10,
            on_timeout: TimeoutPolicy::MaxRange,
        }
    }
}

/// Load-cell amplifier (HX711) timing and range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightConfig {
    /// Deadline for the data-ready signal, in milliseconds.
    pub ready_timeout_ms: u32,
    /// Raw readings averaged by `tare`.
    pub tare_samples: u8,
    /// Pause between tare readings, in milliseconds.
    pub tare_settle_ms: u32,
    /// Pause after the discard read in `init`, in milliseconds.
    pub init_settle_ms: u32,
    /// Upper clamp for converted weights, in grams.
    pub capacity_g: u32,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            ready_timeout_ms: 100,
            tare_samples: 5,
            tare_settle_ms: 10,
            init_settle_ms: 10,
            capacity_g: 1000, // 1 kg cell
        }
    }
}

/// Linear load-cell calibration, supplied by the caller on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calibration {
    /// Permanent zero offset in raw counts, applied after the session tare.
    pub offset: i32,
    /// Grams per raw count, scaled by 1000.
    pub multiplier: i32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            offset: 0,
            multiplier: 1000,
        }
    }
}

impl Calibration {
    /// Encode into `buf`, returning the used prefix.
    pub fn to_bytes<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8]> {
        postcard::to_slice(self, buf).map_err(|_| Error::Config("calibration buffer too small"))
    }

    /// Decode a blob produced by [`Calibration::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        postcard::from_bytes(bytes).map_err(|_| Error::Config("calibration blob corrupted"))
    }
}

/// Everything the two drivers need, in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SensorConfig {
    pub distance: DistanceConfig,
    pub weight: WeightConfig,
    pub calibration: Calibration,
}

impl SensorConfig {
    /// Reject values that would make a driver unusable.
    pub fn validate(&self) -> Result<()> {
        if self.distance.echo_timeout_us == 0 {
            return Err(Error::Config("echo_timeout_us must be non-zero"));
        }
        if self.distance.trigger_pulse_us == 0 {
            return Err(Error::Config("trigger_pulse_us must be non-zero"));
        }
        if self.weight.ready_timeout_ms == 0 {
            return Err(Error::Config("ready_timeout_ms must be non-zero"));
        }
        if self.weight.tare_samples == 0 {
            return Err(Error::Config("tare_samples must be non-zero"));
        }
        if self.weight.capacity_g == 0 {
            return Err(Error::Config("capacity_g must be non-zero"));
        }
        if self.calibration.multiplier == 0 {
            return Err(Error::Config("calibration multiplier must be non-zero"));
        }
        Ok(())
    }
}
