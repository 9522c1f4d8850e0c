//! Groups query records by fingerprint hash.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::config::DigestConfig;
use crate::fingerprint::Fingerprinter;
use crate::parser::Parser;
use crate::query::Query;
use crate::stats::Statistics;

/// What [`Digest::run`] saw while draining a parser.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Records aggregated
    pub queries: usize,
    /// Timestamp of the first timestamped record, in log order
    pub first: Option<DateTime<Utc>>,
    /// Timestamp of the last timestamped record, in log order
    pub last: Option<DateTime<Utc>>,
    /// Wall clock time spent digesting
    pub elapsed: Duration,
}

/// Shared `hash → Statistics` table fed by concurrent tasks.
#[derive(Debug, Clone)]
pub struct Digest {
    fingerprinter: Arc<Fingerprinter>,
    table: Arc<Mutex<HashMap<String, Statistics>>>,
    max_in_flight: usize,
}

impl Default for Digest {
    fn default() -> Self {
        Self::new(&DigestConfig::default())
    }
}

impl Digest {
    pub fn new(config: &DigestConfig) -> Self {
        Self {
            fingerprinter: Arc::new(Fingerprinter::new()),
            table: Arc::new(Mutex::new(HashMap::new())),
            max_in_flight: config.max_in_flight.max(1),
        }
    }

    /// Adds one record to its group. The fingerprint is computed outside the
    /// lock; the read-modify-write of the entry happens under it.
    pub fn record(&self, query: &Query) {
        let fingerprint = self.fingerprinter.fingerprint(&query.query);
        let hash = Fingerprinter::hash(&fingerprint);

        let mut table = self.table.lock();
        match table.get_mut(&hash) {
            Some(stats) => stats.add(query),
            None => {
                let stats = Statistics::new(hash.clone(), fingerprint, query);
                table.insert(hash, stats);
            }
        }
    }

    /// Number of distinct hashes seen so far.
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drains `parser`, aggregating every record in its own task.
    ///
    /// At most `max_in_flight` tasks run at once. Every task has been joined
    /// when this returns.
    pub async fn run(&self, parser: &mut Parser) -> RunSummary {
        let start = Instant::now();
        let permits = Arc::new(Semaphore::new(self.max_in_flight));
        let mut tasks = JoinSet::new();
        let mut summary = RunSummary::default();

        while let Some(query) = parser.next().await {
            summary.queries += 1;
            if let Some(ts) = query.timestamp {
                if summary.first.is_none() {
                    summary.first = Some(ts);
                }
                summary.last = Some(ts);
            }

            let permit = match permits.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!("digest semaphore closed: {}", e);
                    break;
                }
            };
            let digest = self.clone();
            tasks.spawn(async move {
                digest.record(&query);
                drop(permit);
            });

            while let Some(res) = tasks.try_join_next() {
                log_join_error(res);
            }
        }

        while let Some(res) = tasks.join_next().await {
            log_join_error(res);
        }
        debug!("no more queries, digest done");

        summary.elapsed = start.elapsed();
        summary
    }

    /// Finalized copy of every group, in no particular order.
    pub fn statistics(&self, real_duration: Duration) -> Vec<Statistics> {
        let table = self.table.lock();
        table
            .values()
            .cloned()
            .map(|mut stats| {
                stats.finalize(real_duration);
                stats
            })
            .collect()
    }

    /// Consumes the digest and finalizes every group without copying them.
    pub fn finish(self, real_duration: Duration) -> Vec<Statistics> {
        let table = std::mem::take(&mut *self.table.lock());
        table
            .into_values()
            .map(|mut stats| {
                stats.finalize(real_duration);
                stats
            })
            .collect()
    }
}

fn log_join_error(res: Result<(), tokio::task::JoinError>) {
    if let Err(e) = res {
        error!("digest task failed: {}", e);
    }
}
