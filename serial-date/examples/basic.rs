//! Basic serial-date walkthrough: build, expand, query, describe.

use std::collections::BTreeSet;

use jiff::civil::Date;
use serial_date::{EndCondition, Pattern, RecurrenceDefinition, SerialDate, WeekOfMonth, Weekday};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A one-hour meeting on the first and last Friday of every month
    let start: jiff::Zoned = "2026-10-19T14:00:00+02:00[Europe/Berlin]".parse()?;
    let end: jiff::Zoned = "2026-10-19T15:00:00+02:00[Europe/Berlin]".parse()?;
    let until = EndCondition::until_day(Date::new(2027, 3, 31)?, start.time_zone())?;
    let definition = RecurrenceDefinition::builder(start, end)
        .pattern(Pattern::MonthlyByWeekday {
            interval: 1,
            weeks_of_month: BTreeSet::from([WeekOfMonth::First, WeekOfMonth::Last]),
            weekday: Weekday::Friday,
        })
        .end_condition(until)
        .build()?;
    println!("Definition: {definition}");

    // The series is computed on first access and kept
    let series = SerialDate::new(definition);
    println!("\nOccurrences:");
    for (from, to) in series.spans()? {
        println!("  {from} .. {}", to.time());
    }
    println!("Cut short by the ceiling: {}", series.has_too_many_dates()?);

    // Queries reuse the stored series
    let now: jiff::Zoned = "2026-12-01T00:00:00+01:00[Europe/Berlin]".parse()?;
    if let Some(next) = series.next_after(&now)? {
        println!("\nNext after {now}: {next}");
    }
    let january_from: jiff::Zoned = "2027-01-01T00:00:00+01:00[Europe/Berlin]".parse()?;
    let january_to: jiff::Zoned = "2027-02-01T00:00:00+01:00[Europe/Berlin]".parse()?;
    println!(
        "In January 2027: {}",
        series.between(&january_from, &january_to)?.len()
    );

    Ok(())
}
