//! Fuzz target: persisted `Calibration` decoding
//!
//! Drives `Calibration::from_bytes` with arbitrary bytes, verifying:
//! - No panics on truncated or corrupt blobs
//! - Anything that decodes re-encodes to a blob that decodes identically
//!
//! cargo fuzz run fuzz_calibration_blob

#![no_main]

use cupscale::config::Calibration;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(cal) = Calibration::from_bytes(data) else {
        return;
    };

    let mut buf = [0u8; 16];
    let encoded = cal.to_bytes(&mut buf).expect("two varints fit in 16 bytes");
    let again = Calibration::from_bytes(encoded).expect("re-decode");
    assert_eq!(again, cal);
});
