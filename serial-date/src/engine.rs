//! Occurrence generation.
//!
//! One fixed loop drives every pattern: find the first date, then keep
//! stepping while the end condition allows it. Each pattern contributes
//! only three hooks, dispatched with a `match` on [`Pattern`]:
//! [`is_any_date_possible`], `first_cursor` and `next_cursor`.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use jiff::civil::Date;
use jiff::tz::TimeZone;
use jiff::{Timestamp, Zoned};
use tracing::{debug, trace};

use crate::calendar::{
    add_days, add_months, at_time_of, clamp_day, is_working_day, monday_of_week,
    nth_weekday_of_month,
};
use crate::definition::{
    DailyStep, EndCondition, Pattern, RecurrenceDefinition, WeekOfMonth, Weekday,
};
use crate::error::{Result, SerialDateError};
use crate::filter::apply_exceptions;

/// Hard ceiling on generated occurrences, whatever the end condition.
pub const MAX_OCCURRENCES: usize = 100;

/// The occurrence ceiling used for one expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionLimit(usize);

impl ExpansionLimit {
    pub const fn new(max_occurrences: usize) -> Self {
        Self(max_occurrences)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

impl Default for ExpansionLimit {
    fn default() -> Self {
        Self(MAX_OCCURRENCES)
    }
}

/// Generator output before exceptions are removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSeries {
    pub occurrences: Vec<Zoned>,
    /// The `Until` boundary was not reached before the ceiling.
    pub too_many_dates: bool,
}

/// The final series: strictly increasing, exceptions removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    dates: Vec<Zoned>,
    too_many_dates: bool,
}

impl Expansion {
    pub fn dates(&self) -> &[Zoned] {
        &self.dates
    }

    pub fn too_many_dates(&self) -> bool {
        self.too_many_dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn into_dates(self) -> Vec<Zoned> {
        self.dates
    }
}

/// Generate, then filter. Exceptions never cause a replacement date to be
/// generated, and the ceiling is applied to the unfiltered sequence.
pub fn expand(definition: &RecurrenceDefinition, limit: ExpansionLimit) -> Result<Expansion> {
    let raw = generate(definition, limit)?;
    let generated = raw.occurrences.len();
    let dates = apply_exceptions(raw.occurrences, definition.exceptions());
    if dates.len() < generated {
        debug!(
            removed = generated - dates.len(),
            remaining = dates.len(),
            "exceptions removed occurrences"
        );
    }
    Ok(Expansion {
        dates,
        too_many_dates: raw.too_many_dates,
    })
}

/// Run the generation loop for `definition`.
///
/// A step that would leave the range jiff can represent ends the series
/// the same way an exhausted end condition does.
pub fn generate(definition: &RecurrenceDefinition, limit: ExpansionLimit) -> Result<RawSeries> {
    let pattern = definition.pattern();
    let start = definition.start();
    let tz = definition.time_zone();
    let until = definition.until_date();
    debug!(
        pattern = pattern.kind(),
        end_condition = %definition.end_condition(),
        start = %start,
        "expanding serial date"
    );

    if !is_any_date_possible(pattern) {
        debug!(pattern = pattern.kind(), "pattern can never produce a date");
        return Ok(RawSeries::default());
    }

    let mut series = RawSeries::default();
    let mut cursor = within_calendar(first_cursor(pattern, start)).flatten();
    while let Some(current) = cursor {
        match continuation(definition, until, limit, current.date, series.occurrences.len()) {
            Step::Emit => {}
            Step::Stop => break,
            Step::Capped => {
                debug!(limit = limit.get(), "occurrence ceiling reached before series end");
                series.too_many_dates = true;
                break;
            }
        }

        let occurrence = match current.exact {
            Some(instant) => instant.to_zoned(tz.clone()),
            None => match within_calendar(at_time_of(current.date, start)) {
                Some(occurrence) => occurrence,
                None => break,
            },
        };
        trace!(%occurrence, "occurrence");
        series.occurrences.push(occurrence);

        if !wants_more(definition, limit, series.occurrences.len()) {
            break;
        }
        cursor = within_calendar(next_cursor(pattern, current, tz)).flatten();
    }

    Ok(series)
}

/// False for patterns whose required sets are empty; such series are
/// vacuously empty rather than invalid.
pub fn is_any_date_possible(pattern: &Pattern) -> bool {
    match pattern {
        Pattern::Weekly { weekdays, .. } => !weekdays.is_empty(),
        Pattern::MonthlyByWeekday { weeks_of_month, .. } => !weeks_of_month.is_empty(),
        Pattern::Individual { dates } => !dates.is_empty(),
        Pattern::None
        | Pattern::Daily(_)
        | Pattern::MonthlyByDay { .. }
        | Pattern::YearlyByDay { .. }
        | Pattern::YearlyByWeekday { .. } => true,
    }
}

/// Loop position: the current date plus a slot index, used as the
/// `weeks_of_month` position for monthly-by-weekday and the list position
/// for individual dates. Individual entries also carry their exact instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    date: Date,
    slot: usize,
    exact: Option<Timestamp>,
}

impl Cursor {
    fn at(date: Date) -> Option<Self> {
        Some(Self {
            date,
            slot: 0,
            exact: None,
        })
    }

    fn slotted(date: Date, slot: usize) -> Self {
        Self {
            date,
            slot,
            exact: None,
        }
    }

    fn listed(instant: Timestamp, slot: usize, tz: &TimeZone) -> Self {
        Self {
            date: instant.to_zoned(tz.clone()).date(),
            slot,
            exact: Some(instant),
        }
    }
}

enum Step {
    Emit,
    Stop,
    Capped,
}

/// Maps a calendar range error to "no further date".
fn within_calendar<T>(step: Result<T>) -> Option<T> {
    match step {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, "calendar range exhausted");
            None
        }
    }
}

fn continuation(
    definition: &RecurrenceDefinition,
    until: Option<Date>,
    limit: ExpansionLimit,
    date: Date,
    emitted: usize,
) -> Step {
    let cap = limit.get();
    let below = |n: usize| if emitted < n { Step::Emit } else { Step::Stop };

    match (definition.pattern(), definition.end_condition()) {
        (Pattern::None, _) => below(1),
        // Individual dates run until the list is exhausted; only an explicit
        // count shortens them. The ceiling still holds, without the flag.
        (Pattern::Individual { .. }, EndCondition::Count(n)) => below((*n as usize).min(cap)),
        (Pattern::Individual { .. }, _) => below(cap),
        (_, EndCondition::Single) => below(1),
        (_, EndCondition::Count(n)) => below((*n as usize).min(cap)),
        (_, EndCondition::Until(_)) => match until.map(|until| date.cmp(&until)) {
            Some(Ordering::Greater) | None => Step::Stop,
            _ if emitted >= cap => Step::Capped,
            _ => Step::Emit,
        },
    }
}

/// Whether another step could still be emitted after `emitted` occurrences.
/// Date-bounded series always look one step ahead to detect the ceiling.
fn wants_more(definition: &RecurrenceDefinition, limit: ExpansionLimit, emitted: usize) -> bool {
    let cap = limit.get();
    match (definition.pattern(), definition.end_condition()) {
        (Pattern::None, _) => false,
        (Pattern::Individual { .. }, EndCondition::Count(n)) => emitted < (*n as usize).min(cap),
        (Pattern::Individual { .. }, _) => emitted < cap,
        (_, EndCondition::Single) => false,
        (_, EndCondition::Count(n)) => emitted < (*n as usize).min(cap),
        (_, EndCondition::Until(_)) => true,
    }
}

fn first_cursor(pattern: &Pattern, start: &Zoned) -> Result<Option<Cursor>> {
    let tz = start.time_zone();
    let start = start.date();
    match pattern {
        Pattern::None | Pattern::Daily(DailyStep::Interval(_)) => Ok(Cursor::at(start)),

        Pattern::Daily(DailyStep::EveryWorkingDay) => Ok(Cursor::at(next_working_day(start)?)),

        Pattern::Weekly { interval, weekdays } => {
            let from = start.weekday().to_monday_zero_offset();
            match weekdays.iter().find(|wd| wd.days_from_monday() >= from) {
                Some(wd) => Ok(Cursor::at(add_days(
                    start,
                    (wd.days_from_monday() - from) as i64,
                )?)),
                None => Ok(Cursor::at(jump_weeks(start, *interval, weekdays)?)),
            }
        }

        Pattern::MonthlyByDay { day_of_month, .. } => {
            let (year, month) = if start.day() > *day_of_month as i8 {
                add_months(start.year(), start.month(), 1)?
            } else {
                (start.year(), start.month())
            };
            Ok(Cursor::at(clamp_day(year, month, *day_of_month)?))
        }

        Pattern::MonthlyByWeekday {
            weeks_of_month,
            weekday,
            ..
        } => {
            let weeks: Vec<WeekOfMonth> = weeks_of_month.iter().copied().collect();
            for (slot, week) in weeks.iter().enumerate() {
                let date = nth_weekday_of_month(start.year(), start.month(), *weekday, *week)?;
                if date >= start {
                    return Ok(Some(Cursor::slotted(date, slot)));
                }
            }
            let (year, month) = add_months(start.year(), start.month(), 1)?;
            Ok(Cursor::at(nth_weekday_of_month(
                year, month, *weekday, weeks[0],
            )?))
        }

        Pattern::YearlyByDay {
            month,
            day_of_month,
        } => {
            let target = (month.number(), *day_of_month as i8);
            let year = if (start.month(), start.day()) > target {
                next_year(start.year())?
            } else {
                start.year()
            };
            Ok(Cursor::at(clamp_day(year, month.number(), *day_of_month)?))
        }

        Pattern::YearlyByWeekday {
            month,
            week_of_month,
            weekday,
        } => {
            let date = nth_weekday_of_month(start.year(), month.number(), *weekday, *week_of_month)?;
            if date >= start {
                return Ok(Cursor::at(date));
            }
            let year = next_year(start.year())?;
            Ok(Cursor::at(nth_weekday_of_month(
                year,
                month.number(),
                *weekday,
                *week_of_month,
            )?))
        }

        Pattern::Individual { dates } => Ok(dates.first().map(|t| Cursor::listed(*t, 0, tz))),
    }
}

fn next_cursor(pattern: &Pattern, current: Cursor, tz: &TimeZone) -> Result<Option<Cursor>> {
    let date = current.date;
    match pattern {
        Pattern::None => Ok(None),

        Pattern::Daily(DailyStep::Interval(interval)) => {
            Ok(Cursor::at(add_days(date, *interval as i64)?))
        }

        Pattern::Daily(DailyStep::EveryWorkingDay) => {
            Ok(Cursor::at(next_working_day(add_days(date, 1)?)?))
        }

        Pattern::Weekly { interval, weekdays } => {
            let from = date.weekday().to_monday_zero_offset();
            match weekdays.iter().find(|wd| wd.days_from_monday() > from) {
                Some(wd) => Ok(Cursor::at(add_days(
                    date,
                    (wd.days_from_monday() - from) as i64,
                )?)),
                None => Ok(Cursor::at(jump_weeks(date, *interval, weekdays)?)),
            }
        }

        Pattern::MonthlyByDay {
            interval,
            day_of_month,
        } => {
            let (year, month) = add_months(date.year(), date.month(), *interval as i64)?;
            Ok(Cursor::at(clamp_day(year, month, *day_of_month)?))
        }

        Pattern::MonthlyByWeekday {
            interval,
            weeks_of_month,
            weekday,
        } => {
            let weeks: Vec<WeekOfMonth> = weeks_of_month.iter().copied().collect();
            let (mut year, mut month) = (date.year(), date.month());
            let mut slot = current.slot;
            // Fourth and last can name the same day; skip it instead of
            // emitting a duplicate. At most one skip per month can happen.
            for _ in 0..=weeks.len() {
                slot += 1;
                if slot >= weeks.len() {
                    (year, month) = add_months(year, month, *interval as i64)?;
                    slot = 0;
                }
                let candidate = nth_weekday_of_month(year, month, *weekday, weeks[slot])?;
                if candidate != date {
                    return Ok(Some(Cursor::slotted(candidate, slot)));
                }
            }
            Err(SerialDateError::calendar(format!(
                "no distinct monthly occurrence after {date}"
            )))
        }

        Pattern::YearlyByDay {
            month,
            day_of_month,
        } => Ok(Cursor::at(clamp_day(
            next_year(date.year())?,
            month.number(),
            *day_of_month,
        )?)),

        Pattern::YearlyByWeekday {
            month,
            week_of_month,
            weekday,
        } => Ok(Cursor::at(nth_weekday_of_month(
            next_year(date.year())?,
            month.number(),
            *weekday,
            *week_of_month,
        )?)),

        Pattern::Individual { dates } => {
            let slot = current.slot + 1;
            Ok(dates
                .iter()
                .nth(slot)
                .map(|t| Cursor::listed(*t, slot, tz)))
        }
    }
}

/// `date` itself when it is Monday to Friday, otherwise the following Monday.
fn next_working_day(mut date: Date) -> Result<Date> {
    while !is_working_day(date) {
        date = add_days(date, 1)?;
    }
    Ok(date)
}

/// First selected weekday of the week `interval` weeks after `date`'s week.
fn jump_weeks(date: Date, interval: u32, weekdays: &BTreeSet<Weekday>) -> Result<Date> {
    let monday = add_days(monday_of_week(date)?, interval as i64 * 7)?;
    let first = weekdays
        .first()
        .ok_or_else(|| SerialDateError::calendar("weekly pattern without weekdays"))?;
    add_days(monday, first.days_from_monday() as i64)
}

fn next_year(year: i16) -> Result<i16> {
    year.checked_add(1)
        .ok_or_else(|| SerialDateError::calendar(format!("year overflow after {year}")))
}
