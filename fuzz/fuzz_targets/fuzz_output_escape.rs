#![no_main]
use covboard_core::output::actions::{escape_data, escape_property};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let escaped = escape_data(s);
        assert!(!escaped.contains('\n') && !escaped.contains('\r'));

        let property = escape_property(s);
        assert!(!property.contains(':') && !property.contains(','));
    }
});
