use chrono::{DateTime, Utc};
use regex::Regex;

use super::{next_value, Grammar};
use crate::error::FieldError;
use crate::query::Query;

/// MySQL and Percona XtraDB Cluster.
///
/// ```text
/// # Time: 2021-03-23T14:38:32.489447Z
/// # User@Host: root[root] @  [172.18.0.1]  Id:     9
/// # Query_time: 0.000328  Lock_time: 0.000013 Rows_sent: 1  Rows_examined: 1
/// ```
#[derive(Debug, Clone)]
pub struct MySql {
    brackets: Regex,
}

impl Default for MySql {
    fn default() -> Self {
        Self::new()
    }
}

impl MySql {
    pub fn new() -> Self {
        Self {
            brackets: bracket_pattern(),
        }
    }
}

impl Grammar for MySql {
    fn parse_timestamp(&self, tokens: &[&str]) -> Result<DateTime<Utc>, FieldError> {
        parse_rfc3339(tokens)
    }

    fn parse_user_host(&self, line: &str, query: &mut Query) -> Result<(), FieldError> {
        bracketed_user_host(&self.brackets, line, query)
    }
}

pub(super) fn bracket_pattern() -> Regex {
    Regex::new(r"\[(.*?)\]").expect("valid bracket pattern")
}

/// RFC 3339 timestamp with fractional seconds, as printed by MySQL 5.7+.
pub(super) fn parse_rfc3339(tokens: &[&str]) -> Result<DateTime<Utc>, FieldError> {
    let value = next_value(tokens, "time")?;
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| FieldError::InvalidTimestamp {
            value: value.to_string(),
            source,
        })
}

/// First bracket pair is the user, second is the host. Spacing between them
/// varies, so the pairs are located on the whole line.
pub(super) fn bracketed_user_host(
    brackets: &Regex,
    line: &str,
    query: &mut Query,
) -> Result<(), FieldError> {
    let mut items = brackets.captures_iter(line).map(|c| c[1].to_string());

    match (items.next(), items.next()) {
        (Some(user), Some(host)) => {
            query.user = user;
            query.host = host;
            Ok(())
        }
        (Some(user), None) => {
            query.user = user;
            Err(FieldError::MalformedUserHost(line.to_string()))
        }
        _ => Err(FieldError::MalformedUserHost(line.to_string())),
    }
}
