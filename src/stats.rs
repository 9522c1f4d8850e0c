use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::query::Query;

/// Aggregated statistics for one query fingerprint.
///
/// Times are in seconds. The `mean_time`, `p50_time`, `p95_time`,
/// `stddev_time` and `concurrency` fields are only meaningful after
/// [`Statistics::finalize`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub hash: String,
    pub fingerprint: String,
    /// Schema of the first record seen with this hash
    pub schema: String,
    pub calls: u64,
    /// Calls that ended with a non-zero `last_errno`
    pub cum_errored: u64,
    pub cum_killed: u64,
    pub cum_query_time: f64,
    pub cum_lock_time: f64,
    pub cum_rows_sent: u64,
    pub cum_rows_examined: u64,
    pub cum_bytes_sent: u64,
    /// Share of the log's real duration spent running this query, in percent
    pub concurrency: f64,
    pub min_time: f64,
    pub max_time: f64,
    pub mean_time: f64,
    pub p50_time: f64,
    pub p95_time: f64,
    pub stddev_time: f64,
    /// Every per-call query time. Order is unspecified until finalized.
    #[serde(skip)]
    pub query_times: Vec<f64>,
}

impl Statistics {
    /// Entry for a hash seen for the first time.
    pub fn new(hash: String, fingerprint: String, query: &Query) -> Self {
        Self {
            hash,
            fingerprint,
            schema: query.schema.clone(),
            calls: 1,
            cum_errored: u64::from(query.last_errno != 0),
            cum_killed: query.killed,
            cum_query_time: query.query_time,
            cum_lock_time: query.lock_time,
            cum_rows_sent: query.rows_sent,
            cum_rows_examined: query.rows_examined,
            cum_bytes_sent: query.bytes_sent,
            min_time: query.query_time,
            max_time: query.query_time,
            mean_time: query.query_time,
            query_times: vec![query.query_time],
            ..Default::default()
        }
    }

    /// Adds one more call. The schema is kept from the first record.
    pub fn add(&mut self, query: &Query) {
        self.calls += 1;
        self.cum_errored += u64::from(query.last_errno != 0);
        self.cum_killed += query.killed;
        self.cum_query_time += query.query_time;
        self.cum_lock_time += query.lock_time;
        self.cum_rows_sent += query.rows_sent;
        self.cum_rows_examined += query.rows_examined;
        self.cum_bytes_sent += query.bytes_sent;
        self.query_times.push(query.query_time);

        if query.query_time > self.max_time {
            self.max_time = query.query_time;
        }
        if query.query_time < self.min_time {
            self.min_time = query.query_time;
        }
    }

    /// Computes the derived fields. `real_duration` is the time span covered
    /// by the whole log.
    pub fn finalize(&mut self, real_duration: Duration) {
        self.query_times.sort_by(f64::total_cmp);

        self.mean_time = if self.calls > 0 {
            self.cum_query_time / self.calls as f64
        } else {
            0.0
        };
        self.p50_time = percentile(&self.query_times, 0.50);
        self.p95_time = percentile(&self.query_times, 0.95);
        self.stddev_time = std_deviation(&self.query_times);

        let seconds = real_duration.as_secs_f64();
        self.concurrency = if seconds > 0.0 {
            self.cum_query_time / seconds * 100.0
        } else {
            0.0
        };
    }
}

/// Nearest-rank percentile of ascending `sorted` samples, at index
/// `floor(p * (n - 1))`.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = (p * (sorted.len() - 1) as f64).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Population standard deviation.
pub fn std_deviation(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Time span between the first and the last record of a log. Zero when a
/// bound is missing or the log goes backwards.
pub fn real_duration(first: Option<DateTime<Utc>>, last: Option<DateTime<Utc>>) -> Duration {
    match (first, last) {
        (Some(first), Some(last)) => (last - first).to_std().unwrap_or_default(),
        _ => Duration::ZERO,
    }
}
