//! Port traits — the boundary between the drivers and the host platform.
//!
//! ```text
//!   Platform adapter ──▶ Port trait ──▶ DistanceSensor / WeightSensor
//! ```
//!
//! Pin direction and level come from `embedded_hal::digital`; busy-wait
//! delays come from [`embedded_hal::delay::DelayNs`].  The one capability
//! embedded-hal does not define is a free-running clock, so it lives here.
//! Drivers take the clock by value, which lets tests inject simulated time.

use embedded_hal::delay::DelayNs;

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic clock whose counters wrap at `u32::MAX`.
///
/// Both counters must advance at their nominal rate while the caller spins.
/// Absolute values carry no meaning; only differences taken with
/// [`elapsed`] are compared against deadlines.
pub trait MonotonicClock {
    /// Free-running microsecond counter.
    fn now_us(&mut self) -> u32;

    /// Free-running millisecond counter.
    fn now_ms(&mut self) -> u32;
}

/// Everything a driver needs from the platform's time base.
pub trait Timebase: MonotonicClock + DelayNs {}

impl<T: MonotonicClock + DelayNs> Timebase for T {}

impl<T: MonotonicClock + ?Sized> MonotonicClock for &mut T {
    fn now_us(&mut self) -> u32 {
        T::now_us(self)
    }

    fn now_ms(&mut self) -> u32 {
        T::now_ms(self)
    }
}

/// Ticks from `start` to `now`, correct across one counter wrap.
#[inline]
pub fn elapsed(start: u32, now: u32) -> u32 {
    now.wrapping_sub(start)
}
