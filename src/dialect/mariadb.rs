use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;

use super::mysql::{bracket_pattern, bracketed_user_host};
use super::Grammar;
use crate::error::FieldError;
use crate::query::Query;

const TIME_FORMAT: &str = "%y%m%d %H:%M:%S";

/// MariaDB.
///
/// ```text
/// # Time: 210323 11:31:57
/// # User@Host: hugo[hugo] @  [172.18.0.3]
/// # Thread_id: 12794  Schema:   QC_hit: No
/// # Query_time: 0.000035  Lock_time: 0.000000  Rows_sent: 0  Rows_examined: 0
/// # Rows_affected: 0  Bytes_sent: 11
/// ```
#[derive(Debug, Clone)]
pub struct MariaDb {
    brackets: Regex,
}

impl Default for MariaDb {
    fn default() -> Self {
        Self::new()
    }
}

impl MariaDb {
    pub fn new() -> Self {
        Self {
            brackets: bracket_pattern(),
        }
    }
}

impl Grammar for MariaDb {
    /// Compact local time, read as UTC. The hour is space padded
    /// (`210323  1:02:03`), hence the non-empty token lookup.
    fn parse_timestamp(&self, tokens: &[&str]) -> Result<DateTime<Utc>, FieldError> {
        let value = tokens
            .iter()
            .filter(|t| !t.is_empty())
            .take(2)
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        if value.is_empty() {
            return Err(FieldError::MissingValue { field: "time" });
        }

        NaiveDateTime::parse_from_str(&value, TIME_FORMAT)
            .map(|dt| dt.and_utc())
            .map_err(|source| FieldError::InvalidTimestamp { value, source })
    }

    fn parse_user_host(&self, line: &str, query: &mut Query) -> Result<(), FieldError> {
        bracketed_user_host(&self.brackets, line, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn parse(line: &str) -> (Query, Vec<FieldError>) {
        let mut q = Query::default();
        let errors = MariaDb::new().parse_header_line(line, &mut q);
        (q, errors)
    }

    #[test]
    fn test_time() {
        let (q, errors) = parse("# Time: 210323 11:31:57");
        assert!(errors.is_empty());
        assert_eq!(
            q.timestamp,
            Some(Utc.with_ymd_and_hms(2021, 3, 23, 11, 31, 57).unwrap())
        );
    }

    #[test]
    fn test_time_space_padded_hour() {
        let (q, errors) = parse("# Time: 210323  1:02:03");
        assert!(errors.is_empty());
        assert_eq!(
            q.timestamp,
            Some(Utc.with_ymd_and_hms(2021, 3, 23, 1, 2, 3).unwrap())
        );
    }

    #[test]
    fn test_invalid_time() {
        let (q, errors) = parse("# Time: 2021-03-23T14:38:32.489447Z");
        assert_eq!(q.timestamp, None);
        assert!(matches!(errors[..], [FieldError::InvalidTimestamp { .. }]));
    }

    #[test]
    fn test_user_host() {
        let (q, errors) = parse("# User@Host: hugo[hugo] @  [172.18.0.3]");
        assert!(errors.is_empty());
        assert_eq!(q.user, "hugo");
        assert_eq!(q.host, "172.18.0.3");
    }

    #[test]
    fn test_id_schema_qc_hit() {
        let (q, errors) = parse("# Thread_id: 12794  Schema:   QC_hit: No");
        assert!(errors.is_empty());
        assert_eq!(
            q,
            Query {
                id: 12794,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_id_with_wide_padding() {
        let (q, errors) = parse("# Thread_id:        42  Schema: shop  QC_hit: Yes");
        assert!(errors.is_empty());
        assert_eq!(q.id, 42);
        assert_eq!(q.schema, "shop");
        assert!(q.qc_hit);
    }

    #[test]
    fn test_times_and_rows() {
        let (q, errors) =
            parse("# Query_time: 0.000035  Lock_time: 0.000000  Rows_sent: 0  Rows_examined: 0");
        assert!(errors.is_empty());
        assert_eq!(q.query_time, 0.000035);
        assert_eq!(q.lock_time, 0.0);
        assert_eq!(q.rows_sent, 0);
        assert_eq!(q.rows_examined, 0);
    }

    #[test]
    fn test_rows_affected_bytes_sent() {
        let (q, errors) = parse("# Rows_affected: 0  Bytes_sent: 11");
        assert!(errors.is_empty());
        assert_eq!(q.rows_affected, 0);
        assert_eq!(q.bytes_sent, 11);
    }
}
