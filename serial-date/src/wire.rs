//! JSON exchange format shared with the authoring widget and the store.
//!
//! Every number and instant travels as a decimal string; instants are epoch
//! milliseconds. `seriesenddate` and individual dates are kept as the exact
//! instants received, so a payload reads back the way it was written.

use std::collections::BTreeSet;

use jiff::tz::TimeZone;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::definition::*;
use crate::error::{Result, SerialDateError};

/// The wire shape of a [`RecurrenceDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireDefinition {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub wholeday: bool,
    pub pattern: WirePattern,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exceptions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seriesenddate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seriesoccurrences: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currenttillend: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parentseries: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePattern {
    #[serde(rename = "type")]
    pub kind: PatternType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub everyworkingday: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekdays: Option<Vec<Weekday>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dayofmonth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weeksofmonth: Option<Vec<WeekOfMonth>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<Month>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dates: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PatternType {
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Individual,
}

/// Parse a wire payload, reading epoch milliseconds in `tz`.
#[tracing::instrument(skip(json, tz), fields(json_len = json.len()))]
pub fn parse(json: &str, tz: &TimeZone) -> Result<RecurrenceDefinition> {
    let wire: WireDefinition =
        serde_json::from_str(json).map_err(|e| SerialDateError::malformed(e.to_string()))?;
    let definition = wire.into_definition(tz)?;
    debug!(pattern = definition.pattern().kind(), "parsed serial date");
    Ok(definition)
}

/// Render a definition as a wire payload.
pub fn serialize(definition: &RecurrenceDefinition) -> Result<String> {
    let wire = WireDefinition::from_definition(definition)?;
    serde_json::to_string(&wire).map_err(|e| SerialDateError::malformed(e.to_string()))
}

impl WireDefinition {
    pub fn into_definition(self, tz: &TimeZone) -> Result<RecurrenceDefinition> {
        let start = parse_instant("start", &self.start)?.to_zoned(tz.clone());
        let end = parse_instant("end", &self.end)?.to_zoned(tz.clone());
        let pattern = self.pattern.into_pattern()?;

        let end_condition = match (self.seriesenddate, self.seriesoccurrences) {
            (Some(_), Some(_)) => {
                return Err(SerialDateError::malformed(
                    "seriesenddate and seriesoccurrences are mutually exclusive",
                ))
            }
            (Some(until), None) => EndCondition::Until(parse_instant("seriesenddate", &until)?),
            (None, Some(count)) => {
                EndCondition::Count(non_negative("seriesoccurrences", &count)?)
            }
            (None, None) => EndCondition::Single,
        };

        let exceptions = self
            .exceptions
            .unwrap_or_default()
            .iter()
            .map(|e| parse_instant("exceptions", e))
            .collect::<Result<Vec<_>>>()?;

        RecurrenceDefinition::builder(start, end)
            .whole_day(self.wholeday)
            .pattern(pattern)
            .end_condition(end_condition)
            .exceptions(exceptions)
            .metadata(SeriesMetadata {
                current_till_end: self.currenttillend,
                parent_series: self.parentseries,
            })
            .build()
    }

    pub fn from_definition(definition: &RecurrenceDefinition) -> Result<Self> {
        let (seriesenddate, seriesoccurrences) = match definition.end_condition() {
            EndCondition::Single => (None, None),
            EndCondition::Count(n) => (None, Some(n.to_string())),
            EndCondition::Until(instant) => (Some(format_instant(*instant)), None),
        };
        let exceptions = if definition.exceptions().is_empty() {
            None
        } else {
            Some(definition.exceptions().iter().map(|t| format_instant(*t)).collect())
        };
        let metadata = definition.metadata();

        Ok(Self {
            start: format_instant(definition.start().timestamp()),
            end: format_instant(definition.end().timestamp()),
            wholeday: definition.is_whole_day(),
            pattern: WirePattern::from_pattern(definition.pattern()),
            exceptions,
            seriesenddate,
            seriesoccurrences,
            currenttillend: metadata.current_till_end,
            parentseries: metadata.parent_series.clone(),
        })
    }
}

impl WirePattern {
    fn new(kind: PatternType) -> Self {
        Self {
            kind,
            interval: None,
            everyworkingday: None,
            weekdays: None,
            dayofmonth: None,
            weeksofmonth: None,
            month: None,
            dates: None,
        }
    }

    pub fn into_pattern(self) -> Result<Pattern> {
        let WirePattern {
            kind,
            interval,
            everyworkingday,
            weekdays,
            dayofmonth,
            weeksofmonth,
            month,
            dates,
        } = self;
        let step = || -> Result<u32> {
            let raw = interval.as_deref().ok_or_else(|| missing("interval"))?;
            non_negative("interval", raw)
        };

        match kind {
            PatternType::None => Ok(Pattern::None),

            PatternType::Daily => {
                if everyworkingday == Some(true) {
                    Ok(Pattern::Daily(DailyStep::EveryWorkingDay))
                } else {
                    Ok(Pattern::Daily(DailyStep::Interval(step()?)))
                }
            }

            PatternType::Weekly => Ok(Pattern::Weekly {
                interval: step()?,
                weekdays: weekdays.ok_or_else(|| missing("weekdays"))?.into_iter().collect(),
            }),

            PatternType::Monthly => match (dayofmonth, weeksofmonth) {
                (Some(day), _) => Ok(Pattern::MonthlyByDay {
                    interval: step()?,
                    day_of_month: day_of_month(&day)?,
                }),
                (None, Some(weeks)) => Ok(Pattern::MonthlyByWeekday {
                    interval: step()?,
                    weeks_of_month: weeks.into_iter().collect(),
                    weekday: first_weekday(weekdays)?,
                }),
                (None, None) => Err(missing("dayofmonth or weeksofmonth")),
            },

            PatternType::Yearly => {
                let month = month.ok_or_else(|| missing("month"))?;
                match (dayofmonth, weeksofmonth) {
                    (Some(day), _) => Ok(Pattern::YearlyByDay {
                        month,
                        day_of_month: day_of_month(&day)?,
                    }),
                    (None, Some(weeks)) => Ok(Pattern::YearlyByWeekday {
                        month,
                        week_of_month: weeks.first().copied().ok_or_else(|| missing("weeksofmonth"))?,
                        weekday: first_weekday(weekdays)?,
                    }),
                    (None, None) => Err(missing("dayofmonth or weeksofmonth")),
                }
            }

            PatternType::Individual => {
                let dates = dates
                    .ok_or_else(|| missing("dates"))?
                    .iter()
                    .map(|d| parse_instant("dates", d))
                    .collect::<Result<BTreeSet<Timestamp>>>()?;
                Ok(Pattern::Individual { dates })
            }
        }
    }

    pub fn from_pattern(pattern: &Pattern) -> Self {
        match pattern {
            Pattern::None => Self::new(PatternType::None),
            Pattern::Daily(DailyStep::Interval(n)) => Self {
                interval: Some(n.to_string()),
                ..Self::new(PatternType::Daily)
            },
            Pattern::Daily(DailyStep::EveryWorkingDay) => Self {
                everyworkingday: Some(true),
                ..Self::new(PatternType::Daily)
            },
            Pattern::Weekly { interval, weekdays } => Self {
                interval: Some(interval.to_string()),
                weekdays: Some(weekdays.iter().copied().collect()),
                ..Self::new(PatternType::Weekly)
            },
            Pattern::MonthlyByDay {
                interval,
                day_of_month,
            } => Self {
                interval: Some(interval.to_string()),
                dayofmonth: Some(day_of_month.to_string()),
                ..Self::new(PatternType::Monthly)
            },
            Pattern::MonthlyByWeekday {
                interval,
                weeks_of_month,
                weekday,
            } => Self {
                interval: Some(interval.to_string()),
                weeksofmonth: Some(weeks_of_month.iter().copied().collect()),
                weekdays: Some(vec![*weekday]),
                ..Self::new(PatternType::Monthly)
            },
            Pattern::YearlyByDay {
                month,
                day_of_month,
            } => Self {
                month: Some(*month),
                dayofmonth: Some(day_of_month.to_string()),
                ..Self::new(PatternType::Yearly)
            },
            Pattern::YearlyByWeekday {
                month,
                week_of_month,
                weekday,
            } => Self {
                month: Some(*month),
                weeksofmonth: Some(vec![*week_of_month]),
                weekdays: Some(vec![*weekday]),
                ..Self::new(PatternType::Yearly)
            },
            Pattern::Individual { dates } => Self {
                dates: Some(dates.iter().map(|t| format_instant(*t)).collect()),
                ..Self::new(PatternType::Individual)
            },
        }
    }
}

fn missing(field: &str) -> SerialDateError {
    SerialDateError::malformed(format!("missing mandatory field '{field}'"))
}

fn parse_number(field: &str, raw: &str) -> Result<i64> {
    raw.parse::<i64>().map_err(|e| {
        SerialDateError::malformed(format!("{field}: '{raw}' is not a decimal integer: {e}"))
    })
}

/// A count-like field. Negative values are well-formed but not valid.
fn non_negative(field: &str, raw: &str) -> Result<u32> {
    let n = parse_number(field, raw)?;
    u32::try_from(n).map_err(|_| SerialDateError::invalid(format!("{field} {n} is out of range")))
}

fn day_of_month(raw: &str) -> Result<u8> {
    let n = parse_number("dayofmonth", raw)?;
    u8::try_from(n)
        .map_err(|_| SerialDateError::invalid(format!("day of month {n} is outside 1..=31")))
}

fn first_weekday(weekdays: Option<Vec<Weekday>>) -> Result<Weekday> {
    weekdays
        .and_then(|w| w.first().copied())
        .ok_or_else(|| missing("weekdays"))
}

fn parse_instant(field: &str, raw: &str) -> Result<Timestamp> {
    let millis = parse_number(field, raw)?;
    Timestamp::from_millisecond(millis)
        .map_err(|e| SerialDateError::malformed(format!("{field}: {millis} ms is out of range: {e}")))
}

fn format_instant(instant: Timestamp) -> String {
    instant.as_millisecond().to_string()
}
