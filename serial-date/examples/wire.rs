//! Reading and writing the JSON exchange format.

use jiff::tz::TimeZone;
use serial_date::{RecurrenceDefinition, SerialDate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Every working day at 09:00 Berlin time through March 2026,
    // skipping 2026-03-04.
    let payload = r#"{
        "start": "1772438400000",
        "end": "1772442000000",
        "pattern": {"type": "DAILY", "everyworkingday": true},
        "seriesenddate": "1774908000000",
        "exceptions": ["1772611200000"],
        "parentseries": "standup"
    }"#;

    let definition = RecurrenceDefinition::from_json_in(payload, TimeZone::get("Europe/Berlin")?)?;
    println!("Parsed: {definition}");

    let series = SerialDate::new(definition);
    for date in series.dates()? {
        println!("  {date}");
    }

    // Numbers and instants go back out as decimal strings
    let value = series.definition().to_json_value()?;
    println!("\n{}", serde_json::to_string_pretty(&value)?);

    Ok(())
}
