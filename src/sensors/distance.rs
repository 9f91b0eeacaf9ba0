//! HC-SR04 ultrasonic range finder driver.
//!
//! A 10 µs pulse on TRIG makes the module fire an ultrasonic burst; ECHO
//! then goes high for as long as the sound took to travel out and back.
//! Both edges are found by polling with a microsecond deadline, and the
//! pulse width is converted to millimetres in integer arithmetic.
//!
//! Worst case is two full deadlines (~20 ms with the default config).

use embedded_hal::digital::{InputPin, OutputPin};
use log::{debug, info, warn};

use crate::config::{DistanceConfig, TimeoutPolicy};
use crate::error::{SensorError, TimeoutPhase};
use crate::ports::{Timebase, elapsed};

/// Half the speed of sound, as a ratio: 0.343 mm/µs / 2 = 343 / 2000.
const SOUND_MM_NUM: u64 = 343;
const SOUND_MM_DEN: u64 = 2000;

/// Settle time after parking TRIG low in `init`.
const TRIGGER_SETTLE_US: u32 = 2;

/// Value reported by [`DistanceSensor::read_distance_or_sentinel`] on failure.
pub const DISTANCE_SENTINEL: i32 = -1;

/// Convert a round-trip echo width to a one-way distance.
pub fn echo_to_mm(width_us: u32) -> u32 {
    (u64::from(width_us) * SOUND_MM_NUM / SOUND_MM_DEN) as u32
}

/// Farthest distance a given echo deadline can resolve.
pub fn max_range_mm(timeout_us: u32) -> u32 {
    echo_to_mm(timeout_us)
}

pub struct DistanceSensor<TRIG, ECHO, CLK> {
    pins: Option<(TRIG, ECHO)>,
    clock: CLK,
    config: DistanceConfig,
    last_distance_mm: Option<u32>,
}

impl<TRIG, ECHO, CLK> DistanceSensor<TRIG, ECHO, CLK>
where
    TRIG: OutputPin,
    ECHO: InputPin,
    CLK: Timebase,
{
    /// Build an uninitialized driver around the platform time base.
    pub fn new(clock: CLK, config: DistanceConfig) -> Self {
        Self {
            pins: None,
            clock,
            config,
            last_distance_mm: None,
        }
    }

    /// Take ownership of the trigger and echo lines and park TRIG low.
    ///
    /// Calling again swaps in the new pins and hands back the old ones.
    /// If TRIG cannot be driven low the new pins are consumed and dropped;
    /// any pins already held stay in service.
    pub fn init(
        &mut self,
        mut trigger: TRIG,
        echo: ECHO,
    ) -> Result<Option<(TRIG, ECHO)>, SensorError> {
        trigger.set_low().map_err(SensorError::gpio)?;
        self.clock.delay_us(TRIGGER_SETTLE_US);

        let previous = self.pins.replace((trigger, echo));
        info!(
            "hc-sr04: ready (timeout={}us, max range={}mm)",
            self.config.echo_timeout_us,
            max_range_mm(self.config.echo_timeout_us)
        );
        Ok(previous)
    }

    /// Fire one trigger pulse and measure the echo, in millimetres.
    ///
    /// With [`TimeoutPolicy::MaxRange`] a missing echo reads as the
    /// farthest resolvable distance; with [`TimeoutPolicy::Error`] it is
    /// reported as [`TimeoutPhase::EchoRise`].
    pub fn read_distance(&mut self) -> Result<u32, SensorError> {
        let (trigger, echo) = self.pins.as_mut().ok_or(SensorError::NotInitialized)?;

        let Some(width_us) = time_echo(trigger, echo, &mut self.clock, &self.config)? else {
            let timeout_us = self.config.echo_timeout_us;
            warn!("hc-sr04: no echo within {}us", timeout_us);
            return match self.config.on_timeout {
                TimeoutPolicy::MaxRange => {
                    let mm = max_range_mm(timeout_us);
                    self.last_distance_mm = Some(mm);
                    Ok(mm)
                }
                TimeoutPolicy::Error => Err(SensorError::Timeout(TimeoutPhase::EchoRise)),
            };
        };

        let mm = echo_to_mm(width_us);
        debug!("hc-sr04: echo {}us -> {}mm", width_us, mm);
        self.last_distance_mm = Some(mm);
        Ok(mm)
    }

    /// [`read_distance`](Self::read_distance) collapsed to the legacy
    /// integer contract: millimetres, or [`DISTANCE_SENTINEL`] on failure.
    pub fn read_distance_or_sentinel(&mut self) -> i32 {
        self.read_distance().map_or(DISTANCE_SENTINEL, |mm| mm as i32)
    }
}

impl<TRIG, ECHO, CLK> DistanceSensor<TRIG, ECHO, CLK> {
    pub fn is_initialized(&self) -> bool {
        self.pins.is_some()
    }

    /// Most recent successful measurement.
    pub fn last_distance_mm(&self) -> Option<u32> {
        self.last_distance_mm
    }

    pub fn config(&self) -> &DistanceConfig {
        &self.config
    }

    /// Give the pins back and return to the uninitialized state.
    pub fn release(&mut self) -> Option<(TRIG, ECHO)> {
        self.last_distance_mm = None;
        self.pins.take()
    }
}

/// One trigger/echo cycle.  `None` if the echo never rose.
///
/// The falling edge shares the deadline, counted from the rising edge;
/// a pulse longer than that is clamped to the deadline.
fn time_echo<TRIG, ECHO, CLK>(
    trigger: &mut TRIG,
    echo: &mut ECHO,
    clock: &mut CLK,
    config: &DistanceConfig,
) -> Result<Option<u32>, SensorError>
where
    TRIG: OutputPin,
    ECHO: InputPin,
    CLK: Timebase,
{
    let timeout_us = config.echo_timeout_us;

    trigger.set_high().map_err(SensorError::gpio)?;
    clock.delay_us(config.trigger_pulse_us);
    if let Err(e) = trigger.set_low() {
        // TRIG must not be left high; one retry before giving up.
        let parked = trigger.set_low().is_ok();
        warn!("hc-sr04: trigger release failed (parked low on retry: {})", parked);
        return Err(SensorError::gpio(e));
    }

    let start = clock.now_us();
    while echo.is_low().map_err(SensorError::gpio)? {
        if elapsed(start, clock.now_us()) >= timeout_us {
            return Ok(None);
        }
    }

    let rise = clock.now_us();
    while echo.is_high().map_err(SensorError::gpio)? {
        if elapsed(rise, clock.now_us()) >= timeout_us {
            break;
        }
    }
    let width_us = elapsed(rise, clock.now_us()).min(timeout_us);

    Ok(Some(width_us))
}
