//! Header line grammars for each slow query log dialect.
//!
//! All dialects print `# Key: value` pairs separated by a variable amount of
//! spaces. They disagree on the `# Time:` format and on how the
//! `# User@Host:` line lays out user, host and connection id.

mod mariadb;
mod mysql;
mod percona;

pub use mariadb::MariaDb;
pub use mysql::MySql;
pub use percona::Percona;

use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::FieldError;
use crate::query::{Kind, Query};

/// Header keywords, in matching order.
///
/// Tokens are matched by substring, so `query_time:` and `lock_time:` must
/// be tried before the bare `time:`.
const KEYWORDS: [(&str, Key); 13] = [
    ("query_time:", Key::QueryTime),
    ("lock_time:", Key::LockTime),
    ("time:", Key::Time),
    ("rows_sent:", Key::RowsSent),
    ("rows_examined:", Key::RowsExamined),
    ("rows_affected:", Key::RowsAffected),
    ("user@host:", Key::UserHost),
    ("id:", Key::Id),
    ("schema:", Key::Schema),
    ("last_errno:", Key::LastErrno),
    ("killed:", Key::Killed),
    ("bytes_sent:", Key::BytesSent),
    ("qc_hit:", Key::QcHit),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    QueryTime,
    LockTime,
    Time,
    RowsSent,
    RowsExamined,
    RowsAffected,
    UserHost,
    Id,
    Schema,
    LastErrno,
    Killed,
    BytesSent,
    QcHit,
}

impl Key {
    fn classify(token: &str) -> Option<Key> {
        let token = token.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(keyword, _)| token.contains(keyword))
            .map(|(_, key)| *key)
    }
}

/// Dialect specific header parsing.
///
/// Implementors only describe what differs between dialects; the token walk
/// in [`Grammar::parse_header_line`] is shared.
pub trait Grammar {
    /// Parses the value of a `# Time:` header. `tokens` starts right after
    /// the keyword.
    fn parse_timestamp(&self, tokens: &[&str]) -> Result<DateTime<Utc>, FieldError>;

    /// Extracts user, host and, when the dialect prints it there, the id
    /// from a whole `# User@Host:` line.
    fn parse_user_host(&self, line: &str, query: &mut Query) -> Result<(), FieldError>;

    /// Whether a standalone `Id:` / `Thread_id:` token carries the
    /// connection id.
    fn reads_id_keyword(&self) -> bool {
        true
    }

    /// Fills `query` with every field recognized on `line`.
    ///
    /// A field that fails to convert is left untouched and reported in the
    /// returned list; the rest of the line is still parsed.
    fn parse_header_line(&self, line: &str, query: &mut Query) -> Vec<FieldError> {
        let parts: Vec<&str> = line.split(' ').collect();
        let mut errors = Vec::new();

        for (idx, part) in parts.iter().enumerate() {
            let Some(key) = Key::classify(part) else {
                continue;
            };
            let rest = &parts[idx + 1..];

            let outcome = match key {
                Key::QueryTime => parse_value(rest, "query_time").map(|v| query.query_time = v),
                Key::LockTime => parse_value(rest, "lock_time").map(|v| query.lock_time = v),
                Key::Time => self.parse_timestamp(rest).map(|t| query.timestamp = Some(t)),
                Key::RowsSent => parse_value(rest, "rows_sent").map(|v| query.rows_sent = v),
                Key::RowsExamined => {
                    parse_value(rest, "rows_examined").map(|v| query.rows_examined = v)
                }
                Key::RowsAffected => {
                    parse_value(rest, "rows_affected").map(|v| query.rows_affected = v)
                }
                Key::UserHost => self.parse_user_host(line, query),
                Key::Id if self.reads_id_keyword() => parse_value(rest, "id").map(|v| query.id = v),
                Key::Id => Ok(()),
                Key::Schema => {
                    query.schema = schema_value(rest).to_string();
                    Ok(())
                }
                Key::LastErrno => parse_value(rest, "last_errno").map(|v| query.last_errno = v),
                Key::Killed => parse_value(rest, "killed").map(|v| query.killed = v),
                Key::BytesSent => parse_value(rest, "bytes_sent").map(|v| query.bytes_sent = v),
                Key::QcHit => next_value(rest, "qc_hit")
                    .map(|v| query.qc_hit = !v.eq_ignore_ascii_case("no")),
            };

            if let Err(e) = outcome {
                errors.push(e);
            }
        }

        errors
    }
}

/// Grammar selected from a [`Kind`] when a parser is built.
#[derive(Debug, Clone)]
pub enum Dialect {
    MySql(MySql),
    MariaDb(MariaDb),
    Percona(Percona),
}

impl Dialect {
    pub fn new(kind: Kind) -> Self {
        match kind {
            Kind::MySql | Kind::Pxc => Dialect::MySql(MySql::new()),
            Kind::MariaDb => Dialect::MariaDb(MariaDb::new()),
            Kind::Percona => Dialect::Percona(Percona),
        }
    }
}

impl Grammar for Dialect {
    fn parse_timestamp(&self, tokens: &[&str]) -> Result<DateTime<Utc>, FieldError> {
        match self {
            Dialect::MySql(g) => g.parse_timestamp(tokens),
            Dialect::MariaDb(g) => g.parse_timestamp(tokens),
            Dialect::Percona(g) => g.parse_timestamp(tokens),
        }
    }

    fn parse_user_host(&self, line: &str, query: &mut Query) -> Result<(), FieldError> {
        match self {
            Dialect::MySql(g) => g.parse_user_host(line, query),
            Dialect::MariaDb(g) => g.parse_user_host(line, query),
            Dialect::Percona(g) => g.parse_user_host(line, query),
        }
    }

    fn reads_id_keyword(&self) -> bool {
        match self {
            Dialect::MySql(g) => g.reads_id_keyword(),
            Dialect::MariaDb(g) => g.reads_id_keyword(),
            Dialect::Percona(g) => g.reads_id_keyword(),
        }
    }
}

/// First non-empty token. Dialects pad values with a variable number of
/// spaces (`Id:     9`).
pub(crate) fn next_value<'a>(
    tokens: &[&'a str],
    field: &'static str,
) -> Result<&'a str, FieldError> {
    tokens
        .iter()
        .copied()
        .find(|t| !t.is_empty())
        .ok_or(FieldError::MissingValue { field })
}

fn parse_value<T: ParseField>(tokens: &[&str], field: &'static str) -> Result<T, FieldError> {
    T::parse_field(next_value(tokens, field)?, field)
}

/// `Schema:` may be printed with nothing after it, directly followed by the
/// next key.
fn schema_value<'a>(tokens: &[&'a str]) -> &'a str {
    match tokens.first() {
        Some(t) if !t.ends_with(':') => t,
        _ => "",
    }
}

trait ParseField: Sized {
    fn parse_field(value: &str, field: &'static str) -> Result<Self, FieldError>;
}

impl ParseField for u64 {
    fn parse_field(value: &str, field: &'static str) -> Result<Self, FieldError> {
        u64::from_str(value).map_err(|source| FieldError::InvalidInteger {
            field,
            value: value.to_string(),
            source,
        })
    }
}

impl ParseField for f64 {
    fn parse_field(value: &str, field: &'static str) -> Result<Self, FieldError> {
        f64::from_str(value).map_err(|source| FieldError::InvalidFloat {
            field,
            value: value.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_prefers_specific_time_keys() {
        assert_eq!(Key::classify("Query_time:"), Some(Key::QueryTime));
        assert_eq!(Key::classify("Lock_time:"), Some(Key::LockTime));
        assert_eq!(Key::classify("Time:"), Some(Key::Time));
        assert_eq!(Key::classify("Thread_id:"), Some(Key::Id));
        assert_eq!(Key::classify("Tmp_tables:"), None);
        assert_eq!(Key::classify(""), None);
    }

    #[test]
    fn test_next_value_skips_padding() {
        assert_eq!(next_value(&["", "", "9"], "id").unwrap(), "9");
        assert_eq!(
            next_value(&["", ""], "id").unwrap_err(),
            FieldError::MissingValue { field: "id" }
        );
    }

    #[test]
    fn test_schema_value() {
        assert_eq!(schema_value(&["client-prod", "", "Last_errno:"]), "client-prod");
        assert_eq!(schema_value(&["", "", "QC_hit:", "No"]), "");
        assert_eq!(schema_value(&["QC_hit:", "No"]), "");
        assert_eq!(schema_value(&[]), "");
    }

    #[test]
    fn test_conversion_error_keeps_zero_and_continues() {
        let dialect = Dialect::new(Kind::MySql);
        let mut q = Query::default();
        let errors = dialect.parse_header_line(
            "# Query_time: abc  Lock_time: 0.5  Rows_sent: x1  Rows_examined: 7",
            &mut q,
        );

        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], FieldError::InvalidFloat { field: "query_time", .. }));
        assert!(matches!(errors[1], FieldError::InvalidInteger { field: "rows_sent", .. }));
        assert_eq!(q.query_time, 0.0);
        assert_eq!(q.lock_time, 0.5);
        assert_eq!(q.rows_sent, 0);
        assert_eq!(q.rows_examined, 7);
    }

    #[test]
    fn test_missing_trailing_value() {
        let dialect = Dialect::new(Kind::MariaDb);
        let mut q = Query::default();
        let errors = dialect.parse_header_line("# Bytes_sent:", &mut q);
        assert_eq!(errors, vec![FieldError::MissingValue { field: "bytes_sent" }]);
    }

    #[test]
    fn test_qc_hit() {
        let dialect = Dialect::new(Kind::Percona);
        let mut q = Query::default();
        assert!(dialect
            .parse_header_line("# QC_Hit: Yes  Full_scan: No", &mut q)
            .is_empty());
        assert!(q.qc_hit);

        assert!(dialect.parse_header_line("# QC_Hit: No", &mut q).is_empty());
        assert!(!q.qc_hit);
    }

    #[test]
    fn test_pxc_uses_mysql_grammar() {
        assert!(matches!(Dialect::new(Kind::Pxc), Dialect::MySql(_)));
        assert!(matches!(Dialect::new(Kind::MariaDb), Dialect::MariaDb(_)));
        assert!(matches!(Dialect::new(Kind::Percona), Dialect::Percona(_)));
    }
}
