#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(definition) = serial_date::RecurrenceDefinition::from_json(s) {
            let json = definition
                .to_json()
                .expect("parsed definition must serialize");
            let reparsed = serial_date::RecurrenceDefinition::from_json(&json)
                .expect("serialized output must be parseable");
            assert_eq!(definition, reparsed, "roundtrip changed the definition");
            assert_eq!(json, reparsed.to_json().unwrap(), "serialization not idempotent");
        }
    }
});
