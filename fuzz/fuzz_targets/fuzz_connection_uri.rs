#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 4096 { return; }
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(d) = mongoba::connection::ConnectionDescriptor::from_uri(s) {
            let _ = d.redacted();
        }
    }
});
