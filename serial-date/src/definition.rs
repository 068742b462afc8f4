use std::collections::BTreeSet;

use jiff::civil::Date;
use jiff::tz::TimeZone;
use jiff::{Span, Timestamp, Unit, Zoned};

use crate::error::{Result, SerialDateError};

/// An immutable description of a recurring calendar entry.
///
/// Built once through [`RecurrenceDefinition::builder`] (or the wire adapter)
/// and never mutated afterwards. Occurrences are derived from it by the
/// engine; memoizing them is the job of [`crate::SerialDate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceDefinition {
    start: Zoned,
    end: Zoned,
    whole_day: bool,
    pattern: Pattern,
    end_condition: EndCondition,
    exceptions: BTreeSet<Timestamp>,
    metadata: SeriesMetadata,
}

impl RecurrenceDefinition {
    /// Start building a definition for an entry spanning `start..end`.
    pub fn builder(start: Zoned, end: Zoned) -> DefinitionBuilder {
        DefinitionBuilder {
            start,
            end,
            whole_day: false,
            pattern: Pattern::None,
            end_condition: EndCondition::Single,
            exceptions: BTreeSet::new(),
            metadata: SeriesMetadata::default(),
        }
    }

    /// A non-recurring entry.
    pub fn single(start: Zoned, end: Zoned) -> Result<Self> {
        Self::builder(start, end).build()
    }

    pub fn start(&self) -> &Zoned {
        &self.start
    }

    pub fn end(&self) -> &Zoned {
        &self.end
    }

    pub fn is_whole_day(&self) -> bool {
        self.whole_day
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn end_condition(&self) -> &EndCondition {
        &self.end_condition
    }

    pub fn exceptions(&self) -> &BTreeSet<Timestamp> {
        &self.exceptions
    }

    pub fn metadata(&self) -> &SeriesMetadata {
        &self.metadata
    }

    /// The calendar every occurrence is computed in.
    pub fn time_zone(&self) -> &TimeZone {
        self.start.time_zone()
    }

    /// The last day that may hold an occurrence, for `Until` series.
    pub fn until_date(&self) -> Option<Date> {
        match self.end_condition {
            EndCondition::Until(instant) => Some(instant.to_zoned(self.time_zone().clone()).date()),
            EndCondition::Single | EndCondition::Count(_) => None,
        }
    }

    /// Length of one occurrence, in calendar units up to days so that
    /// whole-day entries always end on the following midnight.
    pub fn occurrence_span(&self) -> Result<Span> {
        Ok(self.start.until((Unit::Day, &self.end))?)
    }
}

/// Chained construction of a [`RecurrenceDefinition`]; `build` validates.
#[derive(Debug, Clone)]
pub struct DefinitionBuilder {
    start: Zoned,
    end: Zoned,
    whole_day: bool,
    pattern: Pattern,
    end_condition: EndCondition,
    exceptions: BTreeSet<Timestamp>,
    metadata: SeriesMetadata,
}

impl DefinitionBuilder {
    pub fn whole_day(mut self, whole_day: bool) -> Self {
        self.whole_day = whole_day;
        self
    }

    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn end_condition(mut self, end_condition: EndCondition) -> Self {
        self.end_condition = end_condition;
        self
    }

    pub fn exception(mut self, instant: Timestamp) -> Self {
        self.exceptions.insert(instant);
        self
    }

    pub fn exceptions(mut self, instants: impl IntoIterator<Item = Timestamp>) -> Self {
        self.exceptions.extend(instants);
        self
    }

    pub fn metadata(mut self, metadata: SeriesMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Validate the collected fields and normalize whole-day entries to
    /// `midnight..next midnight`.
    pub fn build(self) -> Result<RecurrenceDefinition> {
        let (start, end) = if self.whole_day {
            let tz = self.start.time_zone().clone();
            let day = self.start.date();
            (day.to_zoned(tz.clone())?, day.tomorrow()?.to_zoned(tz)?)
        } else {
            (self.start, self.end)
        };

        if end < start {
            return Err(SerialDateError::invalid(format!(
                "end {end} is before start {start}"
            )));
        }
        self.pattern.validate()?;
        if let EndCondition::Count(0) = self.end_condition {
            return Err(SerialDateError::invalid("occurrence count must be at least 1"));
        }

        Ok(RecurrenceDefinition {
            start,
            end,
            whole_day: self.whole_day,
            pattern: self.pattern,
            end_condition: self.end_condition,
            exceptions: self.exceptions,
            metadata: self.metadata,
        })
    }
}

/// The repetition rule. Each variant carries only the fields it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// A single, non-repeating entry.
    None,
    Daily(DailyStep),
    Weekly {
        interval: u32,
        weekdays: BTreeSet<Weekday>,
    },
    /// `every N months on the D-th`, clamped to the month's last day.
    MonthlyByDay { interval: u32, day_of_month: u8 },
    /// `every N months on the first and last friday`.
    MonthlyByWeekday {
        interval: u32,
        weeks_of_month: BTreeSet<WeekOfMonth>,
        weekday: Weekday,
    },
    YearlyByDay { month: Month, day_of_month: u8 },
    YearlyByWeekday {
        month: Month,
        week_of_month: WeekOfMonth,
        weekday: Weekday,
    },
    /// An explicit list of instants, emitted as given.
    Individual { dates: BTreeSet<Timestamp> },
}

impl Pattern {
    /// Short stable name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily(DailyStep::Interval(_)) => "daily",
            Self::Daily(DailyStep::EveryWorkingDay) => "working_days",
            Self::Weekly { .. } => "weekly",
            Self::MonthlyByDay { .. } => "monthly_by_day",
            Self::MonthlyByWeekday { .. } => "monthly_by_weekday",
            Self::YearlyByDay { .. } => "yearly_by_day",
            Self::YearlyByWeekday { .. } => "yearly_by_weekday",
            Self::Individual { .. } => "individual",
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Self::Daily(DailyStep::Interval(interval))
            | Self::Weekly { interval, .. }
            | Self::MonthlyByWeekday { interval, .. } => check_interval(*interval),
            Self::MonthlyByDay {
                interval,
                day_of_month,
            } => {
                check_interval(*interval)?;
                check_day_of_month(*day_of_month)
            }
            Self::YearlyByDay { day_of_month, .. } => check_day_of_month(*day_of_month),
            Self::None
            | Self::Daily(DailyStep::EveryWorkingDay)
            | Self::YearlyByWeekday { .. }
            | Self::Individual { .. } => Ok(()),
        }
    }
}

fn check_interval(interval: u32) -> Result<()> {
    if interval == 0 {
        return Err(SerialDateError::invalid("interval must be at least 1"));
    }
    Ok(())
}

fn check_day_of_month(day: u8) -> Result<()> {
    if !(1..=31).contains(&day) {
        return Err(SerialDateError::invalid(format!(
            "day of month {day} is outside 1..=31"
        )));
    }
    Ok(())
}

/// The two mutually exclusive daily modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyStep {
    /// Every N days.
    Interval(u32),
    /// Monday through Friday.
    EveryWorkingDay,
}

/// The rule that stops generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndCondition {
    /// Exactly one occurrence.
    Single,
    /// At most N occurrences (clamped to the expansion limit).
    Count(u32),
    /// No occurrence on a day after the one holding this instant, read in
    /// the definition's time zone. The instant itself is kept as given.
    Until(Timestamp),
}

impl EndCondition {
    /// `Until` the given day, stored as its midnight in `tz`.
    pub fn until_day(date: Date, tz: &TimeZone) -> Result<Self> {
        Ok(Self::Until(date.to_zoned(tz.clone())?.timestamp()))
    }
}

/// Opaque fields carried for the authoring side; the engine ignores them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesMetadata {
    pub current_till_end: Option<bool>,
    pub parent_series: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }

    pub fn to_jiff(self) -> jiff::civil::Weekday {
        match self {
            Self::Monday => jiff::civil::Weekday::Monday,
            Self::Tuesday => jiff::civil::Weekday::Tuesday,
            Self::Wednesday => jiff::civil::Weekday::Wednesday,
            Self::Thursday => jiff::civil::Weekday::Thursday,
            Self::Friday => jiff::civil::Weekday::Friday,
            Self::Saturday => jiff::civil::Weekday::Saturday,
            Self::Sunday => jiff::civil::Weekday::Sunday,
        }
    }

    pub fn from_jiff(wd: jiff::civil::Weekday) -> Self {
        match wd {
            jiff::civil::Weekday::Monday => Self::Monday,
            jiff::civil::Weekday::Tuesday => Self::Tuesday,
            jiff::civil::Weekday::Wednesday => Self::Wednesday,
            jiff::civil::Weekday::Thursday => Self::Thursday,
            jiff::civil::Weekday::Friday => Self::Friday,
            jiff::civil::Weekday::Saturday => Self::Saturday,
            jiff::civil::Weekday::Sunday => Self::Sunday,
        }
    }

    /// Days since the Monday of the same week.
    pub fn days_from_monday(self) -> i8 {
        self.to_jiff().to_monday_zero_offset()
    }

    pub fn is_working_day(self) -> bool {
        !matches!(self, Self::Saturday | Self::Sunday)
    }
}

/// Ordinal position of a weekday within its month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum WeekOfMonth {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl WeekOfMonth {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Second => "second",
            Self::Third => "third",
            Self::Fourth => "fourth",
            Self::Last => "last",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::January => "january",
            Self::February => "february",
            Self::March => "march",
            Self::April => "april",
            Self::May => "may",
            Self::June => "june",
            Self::July => "july",
            Self::August => "august",
            Self::September => "september",
            Self::October => "october",
            Self::November => "november",
            Self::December => "december",
        }
    }

    pub fn number(self) -> i8 {
        match self {
            Self::January => 1,
            Self::February => 2,
            Self::March => 3,
            Self::April => 4,
            Self::May => 5,
            Self::June => 6,
            Self::July => 7,
            Self::August => 8,
            Self::September => 9,
            Self::October => 10,
            Self::November => 11,
            Self::December => 12,
        }
    }

    pub fn from_number(n: i8) -> Option<Self> {
        match n {
            1 => Some(Self::January),
            2 => Some(Self::February),
            3 => Some(Self::March),
            4 => Some(Self::April),
            5 => Some(Self::May),
            6 => Some(Self::June),
            7 => Some(Self::July),
            8 => Some(Self::August),
            9 => Some(Self::September),
            10 => Some(Self::October),
            11 => Some(Self::November),
            12 => Some(Self::December),
            _ => None,
        }
    }
}
