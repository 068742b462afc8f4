use std::sync::OnceLock;

use jiff::Zoned;

use crate::definition::RecurrenceDefinition;
use crate::engine::{self, Expansion, ExpansionLimit};
use crate::error::Result;

/// A [`RecurrenceDefinition`] together with its lazily computed series.
///
/// The first query runs the engine and stores the outcome; every later
/// query reads the stored value. There is no invalidation: the definition
/// is immutable, so a different series needs a new `SerialDate`.
///
/// The cell is a [`OnceLock`], so concurrent first access from several
/// threads still computes the series exactly once.
#[derive(Debug, Clone)]
pub struct SerialDate {
    definition: RecurrenceDefinition,
    limit: ExpansionLimit,
    expansion: OnceLock<Result<Expansion>>,
}

impl SerialDate {
    pub fn new(definition: RecurrenceDefinition) -> Self {
        Self::with_limit(definition, ExpansionLimit::default())
    }

    /// Use a ceiling other than [`crate::MAX_OCCURRENCES`].
    pub fn with_limit(definition: RecurrenceDefinition, limit: ExpansionLimit) -> Self {
        Self {
            definition,
            limit,
            expansion: OnceLock::new(),
        }
    }

    pub fn definition(&self) -> &RecurrenceDefinition {
        &self.definition
    }

    pub fn limit(&self) -> ExpansionLimit {
        self.limit
    }

    /// Whether the series has been computed yet.
    pub fn is_computed(&self) -> bool {
        self.expansion.get().is_some()
    }

    pub fn expansion(&self) -> Result<&Expansion> {
        self.expansion
            .get_or_init(|| engine::expand(&self.definition, self.limit))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Occurrence start instants, ascending, exceptions removed.
    pub fn dates(&self) -> Result<&[Zoned]> {
        Ok(self.expansion()?.dates())
    }

    /// True when an `Until` series was cut short by the occurrence ceiling.
    pub fn has_too_many_dates(&self) -> Result<bool> {
        Ok(self.expansion()?.too_many_dates())
    }

    /// `(start, end)` of every occurrence; each lasts as long as the
    /// definition's own `start..end`.
    pub fn spans(&self) -> Result<Vec<(Zoned, Zoned)>> {
        let span = self.definition.occurrence_span()?;
        self.dates()?
            .iter()
            .map(|start| Ok((start.clone(), start.checked_add(span)?)))
            .collect()
    }

    /// Occurrences in the half-open range `[from, to)`.
    pub fn between(&self, from: &Zoned, to: &Zoned) -> Result<&[Zoned]> {
        let dates = self.dates()?;
        let lo = dates.partition_point(|d| d.timestamp() < from.timestamp());
        let hi = dates.partition_point(|d| d.timestamp() < to.timestamp());
        Ok(&dates[lo..hi.max(lo)])
    }

    /// First occurrence strictly after `instant`.
    pub fn next_after(&self, instant: &Zoned) -> Result<Option<&Zoned>> {
        let dates = self.dates()?;
        let idx = dates.partition_point(|d| d.timestamp() <= instant.timestamp());
        Ok(dates.get(idx))
    }

    /// Whether `instant` is one of the final occurrences.
    pub fn contains(&self, instant: &Zoned) -> Result<bool> {
        Ok(self
            .dates()?
            .binary_search_by(|d| d.timestamp().cmp(&instant.timestamp()))
            .is_ok())
    }

    pub fn into_definition(self) -> RecurrenceDefinition {
        self.definition
    }
}

impl From<RecurrenceDefinition> for SerialDate {
    fn from(definition: RecurrenceDefinition) -> Self {
        Self::new(definition)
    }
}
