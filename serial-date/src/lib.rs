//! Occurrence expansion for recurring calendar entries.
//!
//! A [`RecurrenceDefinition`] describes one entry (start, end, whole-day
//! flag), how it repeats ([`Pattern`]), when the series stops
//! ([`EndCondition`]) and which instants are cancelled. The engine turns it
//! into the ascending list of occurrence instants, capped at
//! [`MAX_OCCURRENCES`]; [`SerialDate`] memoizes that list.
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeSet;
//! use serial_date::{EndCondition, Pattern, RecurrenceDefinition, SerialDate, Weekday};
//!
//! let start: jiff::Zoned = "2026-10-19T09:00:00+00:00[UTC]".parse().unwrap();
//! let end: jiff::Zoned = "2026-10-19T10:00:00+00:00[UTC]".parse().unwrap();
//! let definition = RecurrenceDefinition::builder(start, end)
//!     .pattern(Pattern::Weekly {
//!         interval: 1,
//!         weekdays: BTreeSet::from([Weekday::Monday, Weekday::Thursday]),
//!     })
//!     .end_condition(EndCondition::Count(4))
//!     .build()
//!     .unwrap();
//!
//! let series = SerialDate::new(definition);
//! assert_eq!(series.dates().unwrap().len(), 4);
//! println!("{}", series.definition()); // "every week on monday, thursday, 4 times"
//! ```

pub mod cache;
pub mod calendar;
pub mod definition;
pub mod display;
pub mod engine;
pub mod error;
pub mod filter;
#[cfg(feature = "serde")]
pub mod wire;

pub use cache::SerialDate;
pub use definition::{
    DailyStep, DefinitionBuilder, EndCondition, Month, Pattern, RecurrenceDefinition,
    SeriesMetadata, WeekOfMonth, Weekday,
};
pub use engine::{Expansion, ExpansionLimit, MAX_OCCURRENCES};
pub use error::{Result, SerialDateError};

#[cfg(feature = "serde")]
use jiff::tz::TimeZone;

// --- RecurrenceDefinition convenience methods ---

impl RecurrenceDefinition {
    /// Expand without memoizing. Prefer [`SerialDate`] for repeated queries.
    pub fn expand(&self) -> Result<Expansion> {
        engine::expand(self, ExpansionLimit::default())
    }

    /// Parse a wire payload whose instants are read in UTC.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        wire::parse(json, &TimeZone::UTC)
    }

    /// Parse a wire payload whose instants are read in `tz`.
    #[cfg(feature = "serde")]
    pub fn from_json_in(json: &str, tz: TimeZone) -> Result<Self> {
        wire::parse(json, &tz)
    }

    /// Render this definition in the wire format.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String> {
        wire::serialize(self)
    }

    #[cfg(feature = "serde")]
    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        let wire = wire::WireDefinition::from_definition(self)?;
        serde_json::to_value(wire).map_err(|e| SerialDateError::malformed(e.to_string()))
    }
}

#[cfg(feature = "serde")]
impl std::str::FromStr for RecurrenceDefinition {
    type Err = SerialDateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_json(s)
    }
}
