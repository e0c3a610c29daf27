#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 16384 { return; }
    if let Ok(s) = std::str::from_utf8(data) {
        // Anything that parses must serialize and parse back to the same sets
        if let Ok(sets) = mongoba::serializer::deserialize(s) {
            let text = mongoba::serializer::serialize(&sets, false).expect("serialize parsed sets");
            let again = mongoba::serializer::deserialize(&text).expect("reparse own output");
            assert_eq!(sets.len(), again.len());
        }
        let _ = mongoba::serializer::reformat(s, true);
    }
});
