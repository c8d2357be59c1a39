//! Blacklist filtering and deduplication of catalog records.

use std::collections::{BTreeSet, HashSet};

/// Unique raw records that are not blacklisted, in first-seen order.
///
/// Comparison is exact and case-sensitive.
pub fn filter_blacklisted<'a, R, B>(blacklist: B, raw: R) -> impl Iterator<Item = &'a str>
where
    R: IntoIterator<Item = &'a str>,
    B: IntoIterator<Item = &'a str>,
{
    let blocked: HashSet<&'a str> = blacklist.into_iter().collect();
    let mut seen: HashSet<&'a str> = HashSet::new();
    raw.into_iter()
        .filter(move |record| seen.insert(*record) && !blocked.contains(*record))
}

/// Collapse cleaned records into a set, discarding empty strings.
pub fn dedup<I>(records: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = String>,
{
    records.into_iter().filter(|record| !record.is_empty()).collect()
}
