#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Parsing and expanding should never panic, only return Ok or Err
        if let Ok(definition) = serial_date::RecurrenceDefinition::from_json(s) {
            let _ = definition.expand();
        }
    }
});
