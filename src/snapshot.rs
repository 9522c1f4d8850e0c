//! Serializable digest results, for callers that keep a cache next to the
//! log file.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::server::Server;
use crate::stats::Statistics;

/// Finished digest of one log file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Source file identity, usually its path
    pub file: String,
    /// When the digest was taken
    pub date: DateTime<Utc>,
    /// Time span covered by the log
    pub real_duration: Duration,
    /// Content hash of the source file, computed by the caller
    pub hash: String,
    pub server: Server,
    pub data: Vec<Statistics>,
}

impl Snapshot {
    pub fn new(
        file: impl Into<String>,
        hash: impl Into<String>,
        real_duration: Duration,
        server: Server,
        data: Vec<Statistics>,
    ) -> Self {
        Self {
            file: file.into(),
            date: Utc::now(),
            real_duration,
            hash: hash.into(),
            server,
            data,
        }
    }

    /// Whether the snapshot still describes a source whose content hash is
    /// `source_hash`.
    pub fn is_valid_for(&self, source_hash: &str) -> bool {
        !self.hash.is_empty() && self.hash == source_hash
    }
}
