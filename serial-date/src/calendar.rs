//! Civil-date arithmetic shared by the per-pattern hooks.
//!
//! Everything here works on `jiff::civil::Date` and never looks at time
//! zones; the engine re-attaches the start's wall-clock time afterwards.

use jiff::civil::Date;
use jiff::{Span, Zoned};

use crate::definition::{WeekOfMonth, Weekday};
use crate::error::{Result, SerialDateError};

/// Number of days in the given month.
pub fn days_in_month(year: i16, month: i8) -> Result<i8> {
    Ok(Date::new(year, month, 1)?.days_in_month())
}

/// The `day`-th of the month, or the month's last day if it is shorter.
pub fn clamp_day(year: i16, month: i8, day: u8) -> Result<Date> {
    let last = days_in_month(year, month)?;
    let day = (day as i8).min(last);
    Ok(Date::new(year, month, day)?)
}

/// Shift a (year, month) pair by `months`, keeping the month in 1..=12.
pub fn add_months(year: i16, month: i8, months: i64) -> Result<(i16, i8)> {
    let index = year as i64 * 12 + (month as i64 - 1) + months;
    let year = i16::try_from(index.div_euclid(12))
        .map_err(|_| SerialDateError::calendar(format!("year overflow adding {months} months")))?;
    let month = index.rem_euclid(12) as i8 + 1;
    Ok((year, month))
}

/// `date` shifted by `days`; an error when either the span or the result
/// leaves jiff's supported range.
pub fn add_days(date: Date, days: i64) -> Result<Date> {
    Ok(date.checked_add(Span::new().try_days(days)?)?)
}

/// Monday of the ISO week containing `date`.
pub fn monday_of_week(date: Date) -> Result<Date> {
    let offset = date.weekday().to_monday_zero_offset();
    add_days(date, -(offset as i64))
}

pub fn is_working_day(date: Date) -> bool {
    Weekday::from_jiff(date.weekday()).is_working_day()
}

/// The given ordinal `weekday` of a month. `Fourth` always exists, and
/// `Last` may coincide with it in months that hold only four of that weekday.
pub fn nth_weekday_of_month(
    year: i16,
    month: i8,
    weekday: Weekday,
    week: WeekOfMonth,
) -> Result<Date> {
    let target = weekday.days_from_monday();
    let n = match week {
        WeekOfMonth::First => 0,
        WeekOfMonth::Second => 1,
        WeekOfMonth::Third => 2,
        WeekOfMonth::Fourth => 3,
        WeekOfMonth::Last => {
            let last = Date::new(year, month, days_in_month(year, month)?)?;
            let back = (last.weekday().to_monday_zero_offset() - target).rem_euclid(7);
            return Ok(Date::new(year, month, last.day() - back)?);
        }
    };
    let first = Date::new(year, month, 1)?;
    let forward = (target - first.weekday().to_monday_zero_offset()).rem_euclid(7);
    Ok(Date::new(year, month, 1 + forward + 7 * n)?)
}

/// `date` at the wall-clock time of `reference`, in the reference's zone.
pub fn at_time_of(date: Date, reference: &Zoned) -> Result<Zoned> {
    let dt = date.to_datetime(reference.time());
    Ok(dt.to_zoned(reference.time_zone().clone())?)
}
