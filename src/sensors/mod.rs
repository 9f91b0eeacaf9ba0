//! Sensor drivers.
//!
//! Each driver is a caller-owned handle that takes its pins at `init` and
//! its time base at construction.  Reads are single blocking transactions;
//! nothing is retried and nothing runs in the background.
//!
//! | Driver                       | Peripheral | Unit | Worst case           |
//! |------------------------------|------------|------|----------------------|
//! | [`distance::DistanceSensor`] | HC-SR04    | mm   | 2 × echo timeout     |
//! | [`weight::WeightSensor`]     | HX711      | g    | ready timeout + 50µs |

pub mod distance;
pub mod weight;

pub use distance::{DISTANCE_SENTINEL, DistanceSensor};
pub use weight::WeightSensor;
