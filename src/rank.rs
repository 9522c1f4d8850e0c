//! Ordering of finalized statistics.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::stats::Statistics;

/// Metric used to order statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Keep the current order
    #[default]
    Random,
    Calls,
    BytesSent,
    QueryTime,
    LockTime,
    RowsSent,
    RowsExamined,
    Killed,
    MinTime,
    MaxTime,
    MeanTime,
    P50,
    P95,
    Concurrency,
}

impl SortKey {
    pub const ALL: [SortKey; 14] = [
        SortKey::Random,
        SortKey::Calls,
        SortKey::BytesSent,
        SortKey::QueryTime,
        SortKey::LockTime,
        SortKey::RowsSent,
        SortKey::RowsExamined,
        SortKey::Killed,
        SortKey::MinTime,
        SortKey::MaxTime,
        SortKey::MeanTime,
        SortKey::P50,
        SortKey::P95,
        SortKey::Concurrency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Random => "random",
            SortKey::Calls => "calls",
            SortKey::BytesSent => "bytes_sent",
            SortKey::QueryTime => "query_time",
            SortKey::LockTime => "lock_time",
            SortKey::RowsSent => "rows_sent",
            SortKey::RowsExamined => "rows_examined",
            SortKey::Killed => "killed",
            SortKey::MinTime => "min_time",
            SortKey::MaxTime => "max_time",
            SortKey::MeanTime => "mean_time",
            SortKey::P50 => "p50",
            SortKey::P95 => "p95",
            SortKey::Concurrency => "concurrency",
        }
    }

    fn compare(&self, a: &Statistics, b: &Statistics) -> Ordering {
        match self {
            SortKey::Random => Ordering::Equal,
            SortKey::Calls => a.calls.cmp(&b.calls),
            SortKey::BytesSent => a.cum_bytes_sent.cmp(&b.cum_bytes_sent),
            SortKey::QueryTime => a.cum_query_time.total_cmp(&b.cum_query_time),
            SortKey::LockTime => a.cum_lock_time.total_cmp(&b.cum_lock_time),
            SortKey::RowsSent => a.cum_rows_sent.cmp(&b.cum_rows_sent),
            SortKey::RowsExamined => a.cum_rows_examined.cmp(&b.cum_rows_examined),
            SortKey::Killed => a.cum_killed.cmp(&b.cum_killed),
            SortKey::MinTime => a.min_time.total_cmp(&b.min_time),
            SortKey::MaxTime => a.max_time.total_cmp(&b.max_time),
            SortKey::MeanTime => a.mean_time.total_cmp(&b.mean_time),
            SortKey::P50 => a.p50_time.total_cmp(&b.p50_time),
            SortKey::P95 => a.p95_time.total_cmp(&b.p95_time),
            SortKey::Concurrency => a.concurrency.total_cmp(&b.concurrency),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| Error::UnknownSortKey(s.to_string()))
    }
}

/// Stable ascending sort on `key`, then reversed in place when `reverse` is
/// set.
pub fn sort_statistics(stats: &mut [Statistics], key: SortKey, reverse: bool) {
    if key != SortKey::Random {
        stats.sort_by(|a, b| key.compare(a, b));
    }
    if reverse {
        stats.reverse();
    }
}

/// Sorts by a key given by name. An unknown name leaves `stats` untouched;
/// callers usually retry with [`SortKey::Random`].
pub fn rank(stats: &mut [Statistics], key: &str, reverse: bool) -> Result<(), Error> {
    let key = key.parse::<SortKey>()?;
    sort_statistics(stats, key, reverse);
    Ok(())
}
