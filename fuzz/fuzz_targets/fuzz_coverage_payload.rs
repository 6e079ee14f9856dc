#![no_main]

use covboard_core::http::codecov::extract_coverage;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary response bodies: extraction either yields a number or errors
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        if let Ok(report) = extract_coverage(&value) {
            assert!(!report.coverage_percentage.is_nan());
        }
    }
});
