//! Per-pattern expansion tests against hand-computed calendars.

use std::collections::BTreeSet;

use jiff::civil::Date;
use jiff::tz::TimeZone;
use jiff::{Timestamp, Zoned};
use serial_date::{
    DailyStep, EndCondition, Month, Pattern, RecurrenceDefinition, WeekOfMonth, Weekday,
    MAX_OCCURRENCES,
};

fn z(s: &str) -> Zoned {
    s.parse().expect("valid zoned datetime")
}

fn d(y: i16, m: i8, day: i8) -> Date {
    Date::new(y, m, day).unwrap()
}

fn at(s: &str) -> Timestamp {
    s.parse().expect("valid timestamp")
}

/// `Until` the given UTC day.
fn until(y: i16, m: i8, day: i8) -> EndCondition {
    EndCondition::until_day(d(y, m, day), &TimeZone::UTC).unwrap()
}

/// A one-hour entry starting at `start`.
fn definition(start: &str, pattern: Pattern, end_condition: EndCondition) -> RecurrenceDefinition {
    let start = z(start);
    let end = start.checked_add(jiff::Span::new().hours(1)).unwrap();
    RecurrenceDefinition::builder(start, end)
        .pattern(pattern)
        .end_condition(end_condition)
        .build()
        .unwrap()
}

fn dates(definition: &RecurrenceDefinition) -> Vec<Date> {
    definition
        .expand()
        .unwrap()
        .dates()
        .iter()
        .map(|z| z.date())
        .collect()
}

// =============================================================================
// Single
// =============================================================================

#[test]
fn single_yields_start_regardless_of_end_condition() {
    for end_condition in [
        EndCondition::Single,
        EndCondition::Count(10),
        until(2030, 1, 1),
        until(2020, 1, 1),
    ] {
        let def = definition("2026-03-02T09:00:00+00:00[UTC]", Pattern::None, end_condition);
        let expansion = def.expand().unwrap();
        assert_eq!(expansion.dates(), &[z("2026-03-02T09:00:00+00:00[UTC]")]);
        assert!(!expansion.too_many_dates());
    }
}

#[test]
fn single_with_start_as_exception_is_empty() {
    let start = z("2026-03-02T09:00:00+00:00[UTC]");
    let def = RecurrenceDefinition::builder(start.clone(), start.clone())
        .exception(start.timestamp())
        .build()
        .unwrap();
    assert!(def.expand().unwrap().is_empty());
}

// =============================================================================
// Daily
// =============================================================================

#[test]
fn daily_interval() {
    let def = definition(
        "2026-03-30T09:00:00+00:00[UTC]",
        Pattern::Daily(DailyStep::Interval(3)),
        EndCondition::Count(4),
    );
    assert_eq!(
        dates(&def),
        vec![d(2026, 3, 30), d(2026, 4, 2), d(2026, 4, 5), d(2026, 4, 8)]
    );
}

#[test]
fn every_working_day_until() {
    // 2026-10-23 is a Friday
    let def = definition(
        "2026-10-23T08:30:00+00:00[UTC]",
        Pattern::Daily(DailyStep::EveryWorkingDay),
        until(2026, 10, 28),
    );
    assert_eq!(
        dates(&def),
        vec![d(2026, 10, 23), d(2026, 10, 26), d(2026, 10, 27), d(2026, 10, 28)]
    );
}

#[test]
fn wall_clock_time_survives_dst_change() {
    // Berlin switches to summer time on 2026-03-29.
    let def = definition(
        "2026-03-27T09:00:00+01:00[Europe/Berlin]",
        Pattern::Daily(DailyStep::Interval(1)),
        EndCondition::Count(4),
    );
    let expansion = def.expand().unwrap();
    assert_eq!(
        expansion.dates(),
        &[
            z("2026-03-27T09:00:00+01:00[Europe/Berlin]"),
            z("2026-03-28T09:00:00+01:00[Europe/Berlin]"),
            z("2026-03-29T09:00:00+02:00[Europe/Berlin]"),
            z("2026-03-30T09:00:00+02:00[Europe/Berlin]"),
        ]
    );
}

// =============================================================================
// Weekly
// =============================================================================

#[test]
fn weekly_wraparound_jumps_interval_weeks() {
    // Start on Thursday 2026-10-22: nothing left in this week's {mon, wed},
    // so the series opens two weeks later.
    let def = definition(
        "2026-10-22T09:00:00+00:00[UTC]",
        Pattern::Weekly {
            interval: 2,
            weekdays: BTreeSet::from([Weekday::Monday, Weekday::Wednesday]),
        },
        EndCondition::Count(4),
    );
    let got = dates(&def);
    assert_eq!(
        got,
        vec![d(2026, 11, 2), d(2026, 11, 4), d(2026, 11, 16), d(2026, 11, 18)]
    );

    let deltas: Vec<i32> = got
        .windows(2)
        .map(|w| w[0].until(w[1]).unwrap().get_days())
        .collect();
    assert_eq!(deltas, vec![2, 12, 2]);
}

#[test]
fn weekly_includes_start_day_when_selected() {
    // Monday start, {monday, friday}
    let def = definition(
        "2026-10-19T18:00:00+00:00[UTC]",
        Pattern::Weekly {
            interval: 1,
            weekdays: BTreeSet::from([Weekday::Friday, Weekday::Monday]),
        },
        EndCondition::Count(3),
    );
    assert_eq!(
        dates(&def),
        vec![d(2026, 10, 19), d(2026, 10, 23), d(2026, 10, 26)]
    );
}

#[test]
fn weekly_with_no_weekdays_is_vacuous() {
    let def = definition(
        "2026-10-19T18:00:00+00:00[UTC]",
        Pattern::Weekly {
            interval: 1,
            weekdays: BTreeSet::new(),
        },
        until(2027, 1, 1),
    );
    let expansion = def.expand().unwrap();
    assert!(expansion.is_empty());
    assert!(!expansion.too_many_dates());
}

// =============================================================================
// Monthly
// =============================================================================

#[test]
fn monthly_by_day_clamps_short_months() {
    let def = definition(
        "2026-01-31T10:00:00+00:00[UTC]",
        Pattern::MonthlyByDay {
            interval: 1,
            day_of_month: 31,
        },
        EndCondition::Count(6),
    );
    assert_eq!(
        dates(&def),
        vec![
            d(2026, 1, 31),
            d(2026, 2, 28),
            d(2026, 3, 31),
            d(2026, 4, 30),
            d(2026, 5, 31),
            d(2026, 6, 30),
        ]
    );
}

#[test]
fn monthly_by_day_clamps_to_leap_day() {
    let def = definition(
        "2028-01-31T10:00:00+00:00[UTC]",
        Pattern::MonthlyByDay {
            interval: 1,
            day_of_month: 31,
        },
        EndCondition::Count(3),
    );
    assert_eq!(
        dates(&def),
        vec![d(2028, 1, 31), d(2028, 2, 29), d(2028, 3, 31)]
    );
}

#[test]
fn monthly_by_day_with_interval() {
    let def = definition(
        "2026-11-20T10:00:00+00:00[UTC]",
        Pattern::MonthlyByDay {
            interval: 2,
            day_of_month: 15,
        },
        until(2027, 6, 30),
    );
    // 20 > 15, so the first occurrence is next month.
    assert_eq!(
        dates(&def),
        vec![d(2026, 12, 15), d(2027, 2, 15), d(2027, 4, 15), d(2027, 6, 15)]
    );
}

#[test]
fn monthly_by_weekday_first_and_last_friday() {
    let def = definition(
        "2026-10-19T09:00:00+00:00[UTC]",
        Pattern::MonthlyByWeekday {
            interval: 1,
            weeks_of_month: BTreeSet::from([WeekOfMonth::Last, WeekOfMonth::First]),
            weekday: Weekday::Friday,
        },
        EndCondition::Count(5),
    );
    assert_eq!(
        dates(&def),
        vec![
            d(2026, 10, 30),
            d(2026, 11, 6),
            d(2026, 11, 27),
            d(2026, 12, 4),
            d(2026, 12, 25),
        ]
    );
}

#[test]
fn monthly_by_weekday_every_other_month() {
    let def = definition(
        "2026-01-01T09:00:00+00:00[UTC]",
        Pattern::MonthlyByWeekday {
            interval: 2,
            weeks_of_month: BTreeSet::from([WeekOfMonth::Third]),
            weekday: Weekday::Wednesday,
        },
        EndCondition::Count(3),
    );
    assert_eq!(
        dates(&def),
        vec![d(2026, 1, 21), d(2026, 3, 18), d(2026, 5, 20)]
    );
}

#[test]
fn monthly_by_weekday_never_repeats_a_collapsed_date() {
    // February 2026 has four Mondays, so fourth == last there.
    let def = definition(
        "2026-02-01T09:00:00+00:00[UTC]",
        Pattern::MonthlyByWeekday {
            interval: 1,
            weeks_of_month: BTreeSet::from([WeekOfMonth::Fourth, WeekOfMonth::Last]),
            weekday: Weekday::Monday,
        },
        EndCondition::Count(4),
    );
    assert_eq!(
        dates(&def),
        vec![d(2026, 2, 23), d(2026, 3, 23), d(2026, 3, 30), d(2026, 4, 27)]
    );
}

// =============================================================================
// Yearly
// =============================================================================

#[test]
fn yearly_by_day_follows_leap_years() {
    let def = definition(
        "2027-03-01T00:00:00+00:00[UTC]",
        Pattern::YearlyByDay {
            month: Month::February,
            day_of_month: 29,
        },
        EndCondition::Count(3),
    );
    // March is past February, so 2027 is skipped.
    assert_eq!(
        dates(&def),
        vec![d(2028, 2, 29), d(2029, 2, 28), d(2030, 2, 28)]
    );
}

#[test]
fn yearly_by_weekday() {
    let def = definition(
        "2026-06-01T12:00:00+00:00[UTC]",
        Pattern::YearlyByWeekday {
            month: Month::May,
            week_of_month: WeekOfMonth::Second,
            weekday: Weekday::Sunday,
        },
        until(2028, 12, 31),
    );
    assert_eq!(dates(&def), vec![d(2027, 5, 9), d(2028, 5, 14)]);
}

// =============================================================================
// Individual
// =============================================================================

#[test]
fn individual_dates_are_generated_in_order() {
    let def = definition(
        "2026-01-05T14:00:00+00:00[UTC]",
        Pattern::Individual {
            dates: BTreeSet::from([
                at("2026-09-01T14:00:00Z"),
                at("2026-02-01T14:00:00Z"),
                at("2026-05-01T14:00:00Z"),
            ]),
        },
        EndCondition::Single,
    );
    let expansion = def.expand().unwrap();
    assert_eq!(
        expansion.dates(),
        &[
            z("2026-02-01T14:00:00+00:00[UTC]"),
            z("2026-05-01T14:00:00+00:00[UTC]"),
            z("2026-09-01T14:00:00+00:00[UTC]"),
        ]
    );
}

#[test]
fn individual_dates_keep_their_own_time_of_day() {
    // 14:30Z is 16:30 in Berlin summer time, 11:00Z is 12:00 in winter
    let def = definition(
        "2026-01-05T09:00:00+01:00[Europe/Berlin]",
        Pattern::Individual {
            dates: BTreeSet::from([at("2026-04-05T14:30:00Z"), at("2026-11-20T11:00:00Z")]),
        },
        EndCondition::Single,
    );
    assert_eq!(
        def.expand().unwrap().dates(),
        &[
            z("2026-04-05T16:30:00+02:00[Europe/Berlin]"),
            z("2026-11-20T12:00:00+01:00[Europe/Berlin]"),
        ]
    );
}

#[test]
fn individual_count_takes_the_smaller_of_count_and_list() {
    let pattern = Pattern::Individual {
        dates: BTreeSet::from([
            at("2026-09-01T14:00:00Z"),
            at("2026-02-01T14:00:00Z"),
            at("2026-05-01T14:00:00Z"),
        ]),
    };
    let short = definition(
        "2026-01-05T14:00:00+00:00[UTC]",
        pattern.clone(),
        EndCondition::Count(2),
    );
    assert_eq!(dates(&short), vec![d(2026, 2, 1), d(2026, 5, 1)]);

    let long = definition(
        "2026-01-05T14:00:00+00:00[UTC]",
        pattern,
        EndCondition::Count(10),
    );
    assert_eq!(dates(&long).len(), 3);
}

#[test]
fn individual_ignores_until_boundary() {
    let def = definition(
        "2026-01-05T14:00:00+00:00[UTC]",
        Pattern::Individual {
            dates: BTreeSet::from([at("2026-02-01T14:00:00Z"), at("2027-05-01T14:00:00Z")]),
        },
        until(2026, 3, 1),
    );
    assert_eq!(dates(&def), vec![d(2026, 2, 1), d(2027, 5, 1)]);
}

#[test]
fn long_individual_list_stops_at_ceiling_without_flag() {
    let first = at("2026-01-01T12:00:00Z");
    let listed: BTreeSet<Timestamp> = (0..150)
        .map(|i| first.checked_add(jiff::Span::new().hours(24 * i)).unwrap())
        .collect();
    for end_condition in [EndCondition::Single, until(2026, 2, 1)] {
        let def = definition(
            "2026-01-01T12:00:00+00:00[UTC]",
            Pattern::Individual {
                dates: listed.clone(),
            },
            end_condition,
        );
        let expansion = def.expand().unwrap();
        assert_eq!(expansion.len(), MAX_OCCURRENCES);
        assert!(!expansion.too_many_dates());
    }
}

#[test]
fn empty_individual_list_is_vacuous() {
    let def = definition(
        "2026-01-05T14:00:00+00:00[UTC]",
        Pattern::Individual {
            dates: BTreeSet::new(),
        },
        EndCondition::Count(3),
    );
    assert!(def.expand().unwrap().is_empty());
}

// =============================================================================
// Ceiling
// =============================================================================

#[test]
fn until_beyond_ceiling_sets_flag() {
    let def = definition(
        "2026-01-01T09:00:00+00:00[UTC]",
        Pattern::Daily(DailyStep::Interval(1)),
        until(2026, 4, 11),
    );
    let expansion = def.expand().unwrap();
    assert_eq!(expansion.len(), MAX_OCCURRENCES);
    assert!(expansion.too_many_dates());
    assert_eq!(expansion.dates().last().unwrap().date(), d(2026, 4, 10));
}

#[test]
fn until_reached_exactly_at_ceiling_does_not_set_flag() {
    // 2026-04-10 is the 100th day of the year.
    let def = definition(
        "2026-01-01T09:00:00+00:00[UTC]",
        Pattern::Daily(DailyStep::Interval(1)),
        until(2026, 4, 10),
    );
    let expansion = def.expand().unwrap();
    assert_eq!(expansion.len(), MAX_OCCURRENCES);
    assert!(!expansion.too_many_dates());
}

#[test]
fn count_above_ceiling_is_clamped_silently() {
    let def = definition(
        "2026-01-01T09:00:00+00:00[UTC]",
        Pattern::Daily(DailyStep::Interval(1)),
        EndCondition::Count(500),
    );
    let expansion = def.expand().unwrap();
    assert_eq!(expansion.len(), MAX_OCCURRENCES);
    assert!(!expansion.too_many_dates());
}

#[test]
fn until_instant_is_compared_by_day() {
    // The boundary sits late on the 28th; the 09:00 occurrence that day is kept.
    let def = definition(
        "2026-10-26T09:00:00+00:00[UTC]",
        Pattern::Daily(DailyStep::Interval(1)),
        EndCondition::Until(at("2026-10-28T05:00:00Z")),
    );
    assert_eq!(
        dates(&def),
        vec![d(2026, 10, 26), d(2026, 10, 27), d(2026, 10, 28)]
    );

    // 23:30Z on the 28th is already the 29th in Berlin.
    let def = definition(
        "2026-10-26T09:00:00+01:00[Europe/Berlin]",
        Pattern::Daily(DailyStep::Interval(1)),
        EndCondition::Until(at("2026-10-28T23:30:00Z")),
    );
    assert_eq!(dates(&def).last(), Some(&d(2026, 10, 29)));
}

#[test]
fn until_before_first_occurrence_is_empty() {
    let def = definition(
        "2026-06-01T09:00:00+00:00[UTC]",
        Pattern::Daily(DailyStep::Interval(1)),
        until(2026, 5, 1),
    );
    let expansion = def.expand().unwrap();
    assert!(expansion.is_empty());
    assert!(!expansion.too_many_dates());
}

// =============================================================================
// Large intervals and the calendar edge
// =============================================================================

#[test]
fn huge_daily_interval_ends_the_series_at_the_calendar_edge() {
    for end_condition in [EndCondition::Count(1), EndCondition::Count(3), until(2030, 1, 1)] {
        let def = definition(
            "2026-03-02T09:00:00+00:00[UTC]",
            Pattern::Daily(DailyStep::Interval(10_000_000)),
            end_condition,
        );
        let expansion = def.expand().unwrap();
        assert_eq!(expansion.dates(), &[z("2026-03-02T09:00:00+00:00[UTC]")]);
        assert!(!expansion.too_many_dates());
    }
}

#[test]
fn huge_weekly_and_monthly_intervals_end_the_series() {
    // 2026-10-19 is a Monday
    let weekly = definition(
        "2026-10-19T09:00:00+00:00[UTC]",
        Pattern::Weekly {
            interval: 2_000_000,
            weekdays: BTreeSet::from([Weekday::Monday]),
        },
        EndCondition::Count(3),
    );
    assert_eq!(dates(&weekly), vec![d(2026, 10, 19)]);

    let monthly = definition(
        "2026-01-31T09:00:00+00:00[UTC]",
        Pattern::MonthlyByDay {
            interval: u32::MAX,
            day_of_month: 31,
        },
        EndCondition::Count(3),
    );
    assert_eq!(dates(&monthly), vec![d(2026, 1, 31)]);

    let by_weekday = definition(
        "2026-01-01T09:00:00+00:00[UTC]",
        Pattern::MonthlyByWeekday {
            interval: u32::MAX,
            weeks_of_month: BTreeSet::from([WeekOfMonth::First]),
            weekday: Weekday::Friday,
        },
        EndCondition::Count(3),
    );
    assert_eq!(dates(&by_weekday), vec![d(2026, 1, 2)]);
}

#[test]
fn count_reached_on_the_last_representable_day() {
    let def = definition(
        "9999-12-30T09:00:00+00:00[UTC]",
        Pattern::Daily(DailyStep::Interval(2)),
        EndCondition::Count(1),
    );
    assert_eq!(
        def.expand().unwrap().dates(),
        &[z("9999-12-30T09:00:00+00:00[UTC]")]
    );
}

#[test]
fn series_running_into_the_calendar_edge_stops_there() {
    let def = definition(
        "9999-12-29T09:00:00+00:00[UTC]",
        Pattern::Daily(DailyStep::Interval(1)),
        EndCondition::Count(5),
    );
    let expansion = def.expand().unwrap();
    assert_eq!(dates(&def), vec![d(9999, 12, 29), d(9999, 12, 30)]);
    assert!(!expansion.too_many_dates());

    let yearly = definition(
        "9997-06-01T09:00:00+00:00[UTC]",
        Pattern::YearlyByDay {
            month: Month::January,
            day_of_month: 1,
        },
        EndCondition::Count(10),
    );
    assert_eq!(dates(&yearly), vec![d(9998, 1, 1), d(9999, 1, 1)]);
}

// =============================================================================
// Exceptions
// =============================================================================

#[test]
fn exceptions_are_not_backfilled() {
    let start = z("2026-03-02T09:00:00+00:00[UTC]");
    let end = z("2026-03-02T10:00:00+00:00[UTC]");
    let build = |exceptions: Vec<jiff::Timestamp>| {
        RecurrenceDefinition::builder(start.clone(), end.clone())
            .pattern(Pattern::Daily(DailyStep::Interval(1)))
            .end_condition(EndCondition::Count(5))
            .exceptions(exceptions)
            .build()
            .unwrap()
    };

    let plain = build(vec![]).expand().unwrap();
    assert_eq!(plain.len(), 5);

    let cancelled = build(vec![z("2026-03-04T09:00:00+00:00[UTC]").timestamp()])
        .expand()
        .unwrap();
    assert_eq!(cancelled.len(), 4);
    assert_eq!(
        cancelled.dates().last().unwrap(),
        &z("2026-03-06T09:00:00+00:00[UTC]")
    );
    assert!(!cancelled
        .dates()
        .contains(&z("2026-03-04T09:00:00+00:00[UTC]")));
}

#[test]
fn exception_at_another_time_of_day_is_ignored() {
    let start = z("2026-03-02T09:00:00+00:00[UTC]");
    let def = RecurrenceDefinition::builder(start.clone(), start.clone())
        .pattern(Pattern::Daily(DailyStep::Interval(1)))
        .end_condition(EndCondition::Count(3))
        .exception(z("2026-03-03T00:00:00+00:00[UTC]").timestamp())
        .build()
        .unwrap();
    assert_eq!(def.expand().unwrap().len(), 3);
}

#[test]
fn exceptions_do_not_clear_the_ceiling_flag() {
    let start = z("2026-01-01T09:00:00+00:00[UTC]");
    let def = RecurrenceDefinition::builder(start.clone(), start.clone())
        .pattern(Pattern::Daily(DailyStep::Interval(1)))
        .end_condition(until(2027, 1, 1))
        .exception(start.timestamp())
        .build()
        .unwrap();
    let expansion = def.expand().unwrap();
    assert_eq!(expansion.len(), MAX_OCCURRENCES - 1);
    assert!(expansion.too_many_dates());
}

// =============================================================================
// Whole day
// =============================================================================

#[test]
fn whole_day_entries_start_at_midnight() {
    let start = z("2026-03-02T15:30:00+01:00[Europe/Berlin]");
    let def = RecurrenceDefinition::builder(start.clone(), start)
        .whole_day(true)
        .pattern(Pattern::Weekly {
            interval: 1,
            weekdays: BTreeSet::from([Weekday::Monday]),
        })
        .end_condition(EndCondition::Count(2))
        .build()
        .unwrap();
    assert_eq!(def.start(), &z("2026-03-02T00:00:00+01:00[Europe/Berlin]"));
    assert_eq!(def.end(), &z("2026-03-03T00:00:00+01:00[Europe/Berlin]"));
    assert_eq!(
        def.expand().unwrap().dates(),
        &[
            z("2026-03-02T00:00:00+01:00[Europe/Berlin]"),
            z("2026-03-09T00:00:00+01:00[Europe/Berlin]"),
        ]
    );
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn builder_rejects_invalid_fields() {
    let start = z("2026-03-02T09:00:00+00:00[UTC]");
    let earlier = z("2026-03-01T09:00:00+00:00[UTC]");

    let cases = [
        RecurrenceDefinition::builder(start.clone(), earlier),
        RecurrenceDefinition::builder(start.clone(), start.clone())
            .pattern(Pattern::Daily(DailyStep::Interval(0))),
        RecurrenceDefinition::builder(start.clone(), start.clone()).pattern(
            Pattern::MonthlyByDay {
                interval: 1,
                day_of_month: 32,
            },
        ),
        RecurrenceDefinition::builder(start.clone(), start.clone()).pattern(
            Pattern::YearlyByDay {
                month: Month::April,
                day_of_month: 0,
            },
        ),
        RecurrenceDefinition::builder(start.clone(), start.clone())
            .end_condition(EndCondition::Count(0)),
    ];
    for builder in cases {
        let err = builder.build().unwrap_err();
        assert!(
            matches!(err, serial_date::SerialDateError::InvalidDefinition(_)),
            "unexpected error {err:?}"
        );
    }
}
