use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::Error;

/// A single query record rebuilt from one block of the slow query log.
///
/// Fields the log does not carry stay at their zero value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub timestamp: Option<DateTime<Utc>>,
    pub user: String,
    pub host: String,
    pub id: u64,
    pub schema: String,
    pub last_errno: u64,
    pub killed: u64,
    /// Execution time, in seconds
    pub query_time: f64,
    /// Lock wait time, in seconds
    pub lock_time: f64,
    pub rows_sent: u64,
    pub rows_examined: u64,
    pub rows_affected: u64,
    pub bytes_sent: u64,
    pub qc_hit: bool,
    /// Raw SQL text: every body line of the block, concatenated
    pub query: String,
}

impl Query {
    /// Returns true when every field holds its zero value.
    pub fn is_empty(&self) -> bool {
        *self == Query::default()
    }
}

/// Database flavour that produced the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    MySql,
    MariaDb,
    Pxc,
    Percona,
}

impl Kind {
    /// Every kind, in the order they are listed to users.
    pub const ALL: [Kind; 4] = [Kind::MySql, Kind::MariaDb, Kind::Pxc, Kind::Percona];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::MySql => "mysql",
            Kind::MariaDb => "mariadb",
            Kind::Pxc => "pxc",
            Kind::Percona => "percona",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Kind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| Error::UnknownKind(s.to_string()))
    }
}
