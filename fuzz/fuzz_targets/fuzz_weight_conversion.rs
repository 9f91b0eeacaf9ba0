//! Fuzz target: 24-bit sample decoding and gram conversion
//!
//! Feeds arbitrary shifted words, tare points and calibrations through
//! `sign_extend_24` and `grams_from_raw`, verifying:
//! - No panics or arithmetic overflow under arbitrary inputs
//! - Sign extension always lands in the 24-bit signed range
//! - Grams never leave `[0, capacity]`
//! - A zero multiplier is always rejected
//!
//! cargo fuzz run fuzz_weight_conversion

#![no_main]

use cupscale::config::Calibration;
use cupscale::sensors::weight::{grams_from_raw, sign_extend_24};
use libfuzzer_sys::fuzz_target;

fn word(data: &[u8], at: usize) -> u32 {
    let mut b = [0u8; 4];
    for (i, slot) in b.iter_mut().enumerate() {
        *slot = data.get(at + i).copied().unwrap_or(0);
    }
    u32::from_le_bytes(b)
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let shifted = word(data, 0);
    let tare = word(data, 4) as i32;
    let cal = Calibration {
        offset: word(data, 8) as i32,
        multiplier: word(data, 12) as i32,
    };
    let capacity = word(data, 16) % 100_000 + 1;

    let raw = sign_extend_24(shifted);
    assert!((-(1 << 23)..(1 << 23)).contains(&raw), "raw {raw} out of range");

    match grams_from_raw(raw, tare, cal, capacity) {
        Ok(grams) => {
            assert_ne!(cal.multiplier, 0);
            assert!(grams <= capacity, "{grams}g above {capacity}g");
        }
        Err(_) => assert_eq!(cal.multiplier, 0),
    }
});
