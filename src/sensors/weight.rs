//! HX711 load-cell amplifier driver.
//!
//! The HX711 signals a finished conversion by pulling DOUT low.  The host
//! then clocks PD_SCK 25 times: the first 24 rising edges shift out the
//! sample MSB-first as 24-bit two's complement, and the 25th selects
//! channel A at gain 128 for the *next* conversion.  Skipping that last
//! pulse leaves the chip on a different channel and every later sample is
//! garbage.
//!
//! ```text
//! IDLE ─▶ WAIT_READY ─▶ SHIFT(24) ─▶ CHANNEL_SELECT ─▶ DONE
//!              │
//!              └── timeout ─▶ IDLE
//! ```
//!
//! Holding PD_SCK high for more than 60 µs powers the chip down, so the
//! shift loop never logs or yields between edges.
//!
//! ## Conversion
//!
//! `grams = (raw - tare - offset) * multiplier / 1000`, clamped to
//! `[0, capacity_g]`.  The multiplier carries three implied decimals.

use embedded_hal::digital::{InputPin, OutputPin};
use log::{debug, info, trace, warn};

use crate::config::{Calibration, WeightConfig};
use crate::error::{SensorError, TimeoutPhase};
use crate::ports::{Timebase, elapsed};

const DATA_BITS: u32 = 24;

/// Minimum PD_SCK high and low time used between edges.
const CLOCK_HALF_PERIOD_US: u32 = 1;

/// Poll interval while waiting for DOUT to fall.
const READY_POLL_US: u32 = 1;

/// Implied scale of [`Calibration::multiplier`].
const MULTIPLIER_SCALE: i64 = 1000;

/// Widen a 24-bit two's-complement sample to `i32`.
///
/// Bits above 23 in `raw` are ignored.
pub fn sign_extend_24(raw: u32) -> i32 {
    let shift = 32 - DATA_BITS;
    ((raw << shift) as i32) >> shift
}

/// Apply tare and calibration to a raw sample.
pub fn grams_from_raw(
    raw: i32,
    tare_offset: i32,
    calibration: Calibration,
    capacity_g: u32,
) -> Result<u32, SensorError> {
    if calibration.multiplier == 0 {
        return Err(SensorError::InvalidCalibration);
    }

    let counts = i64::from(raw) - i64::from(tare_offset) - i64::from(calibration.offset);
    let grams = counts.saturating_mul(i64::from(calibration.multiplier)) / MULTIPLIER_SCALE;

    Ok(grams.clamp(0, i64::from(capacity_g)) as u32)
}

pub struct WeightSensor<DATA, SCK, CLK> {
    pins: Option<(DATA, SCK)>,
    clock: CLK,
    config: WeightConfig,
    /// Session zero point in raw counts; never persisted.
    tare_offset: i32,
}

impl<DATA, SCK, CLK> WeightSensor<DATA, SCK, CLK>
where
    DATA: InputPin,
    SCK: OutputPin,
    CLK: Timebase,
{
    /// Build an uninitialized driver around the platform time base.
    pub fn new(clock: CLK, config: WeightConfig) -> Self {
        Self {
            pins: None,
            clock,
            config,
            tare_offset: 0,
        }
    }

    /// Take ownership of DOUT and PD_SCK, flush one conversion and clear
    /// the tare.
    ///
    /// The flush read only settles the chip; a timeout there is logged and
    /// otherwise ignored.  Calling again swaps in the new pins and hands back
    /// the old ones.
    ///
    /// On a pin fault the new pins are consumed and dropped, and whatever
    /// pins the driver held before the call stay in service.
    pub fn init(
        &mut self,
        data: DATA,
        mut sck: SCK,
    ) -> Result<Option<(DATA, SCK)>, SensorError> {
        sck.set_low().map_err(SensorError::gpio)?;
        self.clock.delay_us(CLOCK_HALF_PERIOD_US);

        let previous = self.pins.replace((data, sck));

        match self.read_raw() {
            Ok(raw) => trace!("hx711: discarded first sample {}", raw),
            Err(SensorError::Timeout(_)) => debug!("hx711: no sample to discard"),
            Err(e) => {
                self.pins = previous;
                return Err(e);
            }
        }
        self.clock.delay_ms(self.config.init_settle_ms);

        self.tare_offset = 0;
        info!(
            "hx711: ready (ready timeout={}ms, capacity={}g)",
            self.config.ready_timeout_ms, self.config.capacity_g
        );
        Ok(previous)
    }

    /// Run one full 25-pulse transaction and return the signed sample.
    pub fn read_raw(&mut self) -> Result<i32, SensorError> {
        let (data, sck) = self.pins.as_mut().ok_or(SensorError::NotInitialized)?;

        match transfer(data, sck, &mut self.clock, self.config.ready_timeout_ms) {
            Ok(bits) => {
                let raw = sign_extend_24(bits);
                trace!("hx711: shifted 0x{:06x} -> {}", bits, raw);
                Ok(raw)
            }
            Err(e) => {
                if let SensorError::Timeout(_) = e {
                    warn!(
                        "hx711: DOUT not ready within {}ms",
                        self.config.ready_timeout_ms
                    );
                }
                Err(e)
            }
        }
    }

    /// Read one sample and convert it to grams.
    ///
    /// A zero multiplier is rejected before touching the bus.
    pub fn read_weight(&mut self, calibration: Calibration) -> Result<u32, SensorError> {
        if !self.is_initialized() {
            return Err(SensorError::NotInitialized);
        }
        if calibration.multiplier == 0 {
            return Err(SensorError::InvalidCalibration);
        }

        let raw = self.read_raw()?;
        let grams = grams_from_raw(raw, self.tare_offset, calibration, self.config.capacity_g)?;
        debug!(
            "hx711: raw={} tare={} -> {}g",
            raw, self.tare_offset, grams
        );
        Ok(grams)
    }

    /// Average `tare_samples` readings into a new session zero point.
    ///
    /// If any sample times out the previous offset is kept.
    pub fn tare(&mut self) -> Result<i32, SensorError> {
        if !self.is_initialized() {
            return Err(SensorError::NotInitialized);
        }

        let samples = self.config.tare_samples.max(1);
        let mut sum: i64 = 0;
        for _ in 0..samples {
            sum += i64::from(self.read_raw()?);
            self.clock.delay_ms(self.config.tare_settle_ms);
        }

        // Mean of 24-bit values always fits back into i32.
        self.tare_offset = (sum / i64::from(samples)) as i32;
        info!(
            "hx711: tare offset {} ({} samples)",
            self.tare_offset, samples
        );
        Ok(self.tare_offset)
    }

    /// [`read_raw`](Self::read_raw) with every failure reported as 0.
    pub fn read_raw_or_zero(&mut self) -> i32 {
        self.read_raw().unwrap_or(0)
    }

    /// [`read_weight`](Self::read_weight) with every failure reported as 0 g.
    pub fn read_weight_or_zero(&mut self, calibration: Calibration) -> u32 {
        self.read_weight(calibration).unwrap_or(0)
    }

    /// Uncalibrated sample for bench diagnostics; 0 when unavailable.
    pub fn raw_debug(&mut self) -> i32 {
        self.read_raw_or_zero()
    }
}

impl<DATA, SCK, CLK> WeightSensor<DATA, SCK, CLK> {
    pub fn is_initialized(&self) -> bool {
        self.pins.is_some()
    }

    pub fn tare_offset(&self) -> i32 {
        self.tare_offset
    }

    pub fn config(&self) -> &WeightConfig {
        &self.config
    }

    /// Give the pins back and return to the uninitialized state.
    pub fn release(&mut self) -> Option<(DATA, SCK)> {
        self.tare_offset = 0;
        self.pins.take()
    }
}

/// WAIT_READY, SHIFT(24) and CHANNEL_SELECT for one conversion.
///
/// Returns the 24 data bits right-aligned.  On timeout no clock edge has
/// been issued.
fn transfer<DATA, SCK, CLK>(
    data: &mut DATA,
    sck: &mut SCK,
    clock: &mut CLK,
    ready_timeout_ms: u32,
) -> Result<u32, SensorError>
where
    DATA: InputPin,
    SCK: OutputPin,
    CLK: Timebase,
{
    let start = clock.now_ms();
    while data.is_high().map_err(SensorError::gpio)? {
        if elapsed(start, clock.now_ms()) >= ready_timeout_ms {
            return Err(SensorError::Timeout(TimeoutPhase::DataReady));
        }
        clock.delay_us(READY_POLL_US);
    }

    let mut bits: u32 = 0;
    for bit in (0..DATA_BITS).rev() {
        sck.set_high().map_err(SensorError::gpio)?;
        clock.delay_us(CLOCK_HALF_PERIOD_US);

        if data.is_high().map_err(SensorError::gpio)? {
            bits |= 1 << bit;
        }

        sck.set_low().map_err(SensorError::gpio)?;
        clock.delay_us(CLOCK_HALF_PERIOD_US);
    }

    // 25th pulse: channel A, gain 128.
    sck.set_high().map_err(SensorError::gpio)?;
    clock.delay_us(CLOCK_HALF_PERIOD_US);
    sck.set_low().map_err(SensorError::gpio)?;
    clock.delay_us(CLOCK_HALF_PERIOD_US);

    Ok(bits)
}
