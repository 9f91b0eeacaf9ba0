//! Platform adapters (outer ring).
//!
//! Adapters implement the traits in [`ports`](crate::ports) on top of a
//! concrete platform.  Pins need no adapter: any `embedded-hal` 1.0 pin
//! driver (for example `esp_idf_hal::gpio::PinDriver`) plugs in directly.

pub mod time;
