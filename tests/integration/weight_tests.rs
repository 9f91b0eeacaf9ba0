//! Integration tests: WeightSensor against the simulated HX711.

use cupscale::config::{Calibration, WeightConfig};
use cupscale::error::{SensorError, TimeoutPhase};
use cupscale::sensors::WeightSensor;
use embedded_hal::digital::ErrorKind;

use crate::mock_hw::{BrokenPin, SimBus, SimClock, SimInput, SimOutput};

type SimWeight = WeightSensor<SimInput, SimOutput, SimClock>;

const UNITY: Calibration = Calibration {
    offset: 0,
    multiplier: 1000,
};

fn sensor(bus: &SimBus) -> SimWeight {
    WeightSensor::new(bus.clock(), WeightConfig::default())
}

/// Initialized driver; the discard read consumes a zero sample.
fn ready_sensor(bus: &SimBus) -> SimWeight {
    bus.push_samples(&[0]);
    let mut s = sensor(bus);
    s.init(bus.dout(), bus.sck()).unwrap();
    s
}

// ── Lifecycle ─────────────────────────────────────────────────

#[test]
fn uninitialized_operations_fail_without_touching_pins() {
    let bus = SimBus::new();
    let mut s = sensor(&bus);

    assert!(!s.is_initialized());
    assert_eq!(s.read_raw(), Err(SensorError::NotInitialized));
    assert_eq!(s.read_weight(UNITY), Err(SensorError::NotInitialized));
    assert_eq!(s.tare(), Err(SensorError::NotInitialized));
    assert_eq!(s.read_raw_or_zero(), 0);
    assert_eq!(s.read_weight_or_zero(UNITY), 0);
    assert_eq!(s.raw_debug(), 0);
    assert_eq!(s.tare_offset(), 0);
    assert_eq!(bus.pin_ops(), 0);
}

#[test]
fn init_discards_one_conversion() {
    let bus = SimBus::new();
    bus.push_samples(&[111, 5000]);
    let mut s = sensor(&bus);
    s.init(bus.dout(), bus.sck()).unwrap();

    assert!(s.is_initialized());
    assert_eq!(bus.sck_edges(), 25);
    assert_eq!(s.read_raw(), Ok(5000));
}

#[test]
fn init_brings_sck_low_before_first_pulse() {
    let bus = SimBus::new();
    bus.park_sck_high();
    bus.push_samples(&[111, 0x12_3456]);
    let mut s = sensor(&bus);
    s.init(bus.dout(), bus.sck()).unwrap();

    assert!(!bus.state().hx711.sck_high, "PD_SCK left high after init");
    // A pin left high would swallow the first rising edge.
    assert_eq!(bus.sck_edges(), 25);
    assert_eq!(s.read_raw(), Ok(0x12_3456));
}

#[test]
fn init_tolerates_absent_device() {
    let bus = SimBus::new();
    bus.set_hx711_ready(false);
    let mut s = sensor(&bus);

    let before = bus.now_us();
    s.init(bus.dout(), bus.sck()).unwrap();

    assert!(s.is_initialized());
    assert_eq!(bus.sck_edges(), 0);
    assert!(bus.now_us() - before >= 100_000);
}

#[test]
fn broken_data_line_fails_init() {
    let bus = SimBus::new();
    let mut s: WeightSensor<BrokenPin, SimOutput, SimClock> =
        WeightSensor::new(bus.clock(), WeightConfig::default());

    assert_eq!(
        s.init(BrokenPin, bus.sck()).err(),
        Some(SensorError::Gpio(ErrorKind::Other))
    );
    assert!(!s.is_initialized());
}

#[test]
fn failed_reinit_keeps_previous_pins_in_service() {
    let bus = SimBus::new();
    let mut s = ready_sensor(&bus);
    bus.push_samples(&[400; 5]);
    s.tare().unwrap();

    bus.set_read_fault(true);
    assert_eq!(
        s.init(bus.dout(), bus.sck()).err(),
        Some(SensorError::Gpio(ErrorKind::Other))
    );
    bus.set_read_fault(false);

    assert!(s.is_initialized());
    assert_eq!(s.tare_offset(), 400);
    bus.push_samples(&[777]);
    assert_eq!(s.read_raw(), Ok(777));
}

#[test]
fn reinit_clears_tare_and_hands_back_pins() {
    let bus = SimBus::new();
    let mut s = ready_sensor(&bus);
    bus.push_samples(&[400; 5]);
    assert_eq!(s.tare(), Ok(400));

    bus.push_samples(&[0]);
    let previous = s.init(bus.dout(), bus.sck()).unwrap();
    assert!(previous.is_some());
    assert_eq!(s.tare_offset(), 0);
}

// ── Bit protocol ──────────────────────────────────────────────

#[test]
fn exactly_25_clock_pulses_per_read() {
    let bus = SimBus::new();
    let mut s = ready_sensor(&bus);
    bus.push_samples(&[0x12_3456, 0xAB_CDEF, 0x00_0001]);

    for _ in 0..3 {
        let before = bus.sck_edges();
        s.read_raw().unwrap();
        assert_eq!(bus.sck_edges() - before, 25);
    }
    assert!(bus.state().hx711.transactions.iter().all(|&n| n == 25));
    assert!(!bus.state().hx711.sck_high, "PD_SCK left high");
}

#[test]
fn samples_are_sign_extended() {
    let bus = SimBus::new();
    let mut s = ready_sensor(&bus);
    bus.push_samples(&[0x12_3456, 0x7F_FFFF, 0x80_0000, 0xFF_FFFF, 0xAB_CDEF]);

    assert_eq!(s.read_raw(), Ok(0x12_3456));
    assert_eq!(s.read_raw(), Ok(8_388_607));
    assert_eq!(s.read_raw(), Ok(-8_388_608));
    assert_eq!(s.read_raw(), Ok(-1));
    assert_eq!(s.read_raw(), Ok(0xAB_CDEF - (1 << 24)));
}

#[test]
fn not_ready_times_out_without_clocking() {
    let bus = SimBus::new();
    let mut s = ready_sensor(&bus);
    bus.set_hx711_ready(false);

    let edges = bus.sck_edges();
    let before = bus.now_us();
    assert_eq!(
        s.read_raw(),
        Err(SensorError::Timeout(TimeoutPhase::DataReady))
    );
    let spent = bus.now_us() - before;

    assert_eq!(bus.sck_edges(), edges);
    // Millisecond granularity: the deadline lands within 1 ms of 100 ms.
    assert!((99_000..101_000).contains(&spent), "waited {spent}us");
    assert_eq!(s.read_raw_or_zero(), 0);
    assert_eq!(s.read_weight_or_zero(UNITY), 0);
}

#[test]
fn ready_wait_survives_millisecond_wrap() {
    let bus = SimBus::starting_at_us((u64::from(u32::MAX) - 20) * 1000);
    let mut s = ready_sensor(&bus);
    bus.set_hx711_ready(false);

    let before = bus.now_us();
    assert!(s.read_raw().is_err());
    assert!(bus.now_us() - before >= 99_000);
}

#[test]
fn raw_debug_matches_read_raw() {
    let bus = SimBus::new();
    let mut s = ready_sensor(&bus);
    bus.push_samples(&[0xFF_FF00]);

    assert_eq!(s.raw_debug(), -256);
}

// ── Tare ──────────────────────────────────────────────────────

#[test]
fn tare_averages_five_samples() {
    let bus = SimBus::new();
    let mut s = ready_sensor(&bus);
    bus.push_samples(&[100, 200, 300, 400, 510, 9999]);

    let edges = bus.sck_edges();
    assert_eq!(s.tare(), Ok(302));
    assert_eq!(s.tare_offset(), 302);
    assert_eq!(bus.sck_edges() - edges, 5 * 25);
}

#[test]
fn tare_of_negative_samples_truncates_toward_zero() {
    let bus = SimBus::new();
    let mut s = ready_sensor(&bus);
    // -1, -2, -2, -2, -2 → sum -9 → -1
    bus.push_samples(&[0xFF_FFFF, 0xFF_FFFE, 0xFF_FFFE, 0xFF_FFFE, 0xFF_FFFE]);

    assert_eq!(s.tare(), Ok(-1));
}

#[test]
fn reading_at_tare_point_weighs_zero() {
    let bus = SimBus::new();
    let mut s = ready_sensor(&bus);
    bus.push_samples(&[48_000; 5]);
    s.tare().unwrap();

    bus.push_samples(&[48_000]);
    let cal = Calibration {
        offset: 0,
        multiplier: 2_345,
    };
    assert_eq!(s.read_weight(cal), Ok(0));
}

#[test]
fn failed_tare_keeps_previous_offset() {
    let bus = SimBus::new();
    let mut s = ready_sensor(&bus);
    bus.push_samples(&[700; 5]);
    s.tare().unwrap();

    bus.set_hx711_ready(false);
    assert_eq!(
        s.tare(),
        Err(SensorError::Timeout(TimeoutPhase::DataReady))
    );
    assert_eq!(s.tare_offset(), 700);
}

// ── Conversion ────────────────────────────────────────────────

#[test]
fn weight_applies_tare_offset_and_multiplier() {
    let bus = SimBus::new();
    let mut s = ready_sensor(&bus);
    bus.push_samples(&[10_000; 5]);
    s.tare().unwrap();

    // (260_000 - 10_000 - 50_000) * 2 / 1000 = 400
    bus.push_samples(&[260_000]);
    let cal = Calibration {
        offset: 50_000,
        multiplier: 2,
    };
    assert_eq!(s.read_weight(cal), Ok(400));
}

#[test]
fn weight_is_clamped_to_capacity() {
    let bus = SimBus::new();
    let mut s = ready_sensor(&bus);
    bus.push_samples(&[0x7F_FFFF, 0x80_0000]);

    assert_eq!(s.read_weight(UNITY), Ok(1000));
    assert_eq!(s.read_weight(UNITY), Ok(0));
}

#[test]
fn custom_capacity_is_honoured() {
    let bus = SimBus::new();
    bus.push_samples(&[0, 9_000]);
    let config = WeightConfig {
        capacity_g: 5000,
        ..WeightConfig::default()
    };
    let mut s: SimWeight = WeightSensor::new(bus.clock(), config);
    s.init(bus.dout(), bus.sck()).unwrap();

    assert_eq!(s.read_weight(UNITY), Ok(5000));
}

#[test]
fn zero_multiplier_rejected_before_bus_traffic() {
    let bus = SimBus::new();
    let mut s = ready_sensor(&bus);
    bus.push_samples(&[1234]);

    let ops = bus.pin_ops();
    let cal = Calibration {
        offset: 0,
        multiplier: 0,
    };
    assert_eq!(s.read_weight(cal), Err(SensorError::InvalidCalibration));
    assert_eq!(s.read_weight_or_zero(cal), 0);
    assert_eq!(bus.pin_ops(), ops);
}
