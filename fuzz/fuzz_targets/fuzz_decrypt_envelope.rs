#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 { return; }
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = mongoba::crypto::is_encrypted(s);
        // Must fail cleanly or decrypt; never panic
        let _ = mongoba::crypto::decrypt(s, "fuzz");
    }
});
