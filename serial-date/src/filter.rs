use std::collections::BTreeSet;

use jiff::{Timestamp, Zoned};

/// Remove every occurrence whose instant is listed in `exceptions`.
///
/// Matching is on the exact instant: an exception on the right day but at
/// a different time of day does not suppress anything. Order is preserved.
pub fn apply_exceptions(raw: Vec<Zoned>, exceptions: &BTreeSet<Timestamp>) -> Vec<Zoned> {
    if exceptions.is_empty() {
        return raw;
    }
    raw.into_iter()
        .filter(|occurrence| !exceptions.contains(&occurrence.timestamp()))
        .collect()
}
