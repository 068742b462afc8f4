use std::fmt;

use crate::definition::*;

impl fmt::Display for RecurrenceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern())?;

        // Single entries ignore the end condition, and individual dates only
        // honour an explicit count.
        match (self.pattern(), self.end_condition()) {
            (Pattern::None, _) | (Pattern::Individual { .. }, EndCondition::Single) => {}
            (_, EndCondition::Count(1)) => write!(f, ", 1 time")?,
            (_, EndCondition::Count(n)) => write!(f, ", {n} times")?,
            (Pattern::Individual { .. }, EndCondition::Until(_)) => {}
            (_, EndCondition::Single) => write!(f, ", once")?,
            (_, EndCondition::Until(_)) => {
                if let Some(date) = self.until_date() {
                    write!(f, " until {date}")?;
                }
            }
        }

        match self.exceptions().len() {
            0 => {}
            1 => write!(f, " except 1 date")?,
            n => write!(f, " except {n} dates")?,
        }

        if self.is_whole_day() {
            write!(f, " (all day)")?;
        }

        Ok(())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::None => write!(f, "once"),
            Pattern::Daily(DailyStep::Interval(1)) => write!(f, "every day"),
            Pattern::Daily(DailyStep::Interval(n)) => write!(f, "every {n} days"),
            Pattern::Daily(DailyStep::EveryWorkingDay) => write!(f, "every working day"),
            Pattern::Weekly { interval, weekdays } => {
                write_every(f, *interval, "week", "weeks")?;
                write!(f, " on ")?;
                write_list(f, weekdays.iter().map(|wd| wd.as_str()))
            }
            Pattern::MonthlyByDay {
                interval,
                day_of_month,
            } => {
                write_every(f, *interval, "month", "months")?;
                write!(f, " on the {}{}", day_of_month, ordinal_suffix(*day_of_month))
            }
            Pattern::MonthlyByWeekday {
                interval,
                weeks_of_month,
                weekday,
            } => {
                write_every(f, *interval, "month", "months")?;
                write!(f, " on the ")?;
                write_list(f, weeks_of_month.iter().map(|w| w.as_str()))?;
                write!(f, " {}", weekday.as_str())
            }
            Pattern::YearlyByDay {
                month,
                day_of_month,
            } => write!(f, "every year on {} {day_of_month}", month.as_str()),
            Pattern::YearlyByWeekday {
                month,
                week_of_month,
                weekday,
            } => write!(
                f,
                "every year on the {} {} of {}",
                week_of_month.as_str(),
                weekday.as_str(),
                month.as_str()
            ),
            Pattern::Individual { dates } => {
                write!(f, "on ")?;
                write_list(f, dates.iter())
            }
        }
    }
}

impl fmt::Display for EndCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndCondition::Single => write!(f, "single"),
            EndCondition::Count(n) => write!(f, "count({n})"),
            EndCondition::Until(instant) => write!(f, "until({instant})"),
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn write_every(f: &mut fmt::Formatter<'_>, interval: u32, one: &str, many: &str) -> fmt::Result {
    if interval == 1 {
        write!(f, "every {one}")
    } else {
        write!(f, "every {interval} {many}")
    }
}

fn write_list<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = T>,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn ordinal_suffix(n: u8) -> &'static str {
    match n % 100 {
        11..=13 => "th",
        _ => match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}
