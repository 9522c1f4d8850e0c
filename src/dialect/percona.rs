use chrono::{DateTime, Utc};

use super::mysql::parse_rfc3339;
use super::{Grammar, ParseField};
use crate::error::FieldError;
use crate::query::Query;

/// Percona Server.
///
/// ```text
/// # Time: 2022-06-22T14:25:08.796525Z
/// # User@Host: user @  [127.0.0.1]  Id: 498200077
/// # Schema: schema_name  Last_errno: 0  Killed: 0
/// # Query_time: 5.390275  Lock_time: 0.000388  Rows_sent: 464  Rows_examined: 2057052  Rows_affected: 0
/// # Bytes_sent: 17781  Tmp_tables: 3  Tmp_disk_tables: 1  Tmp_table_sizes: 1060944
/// # InnoDB_trx_id: 1A2B3C
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Percona;

impl Grammar for Percona {
    fn parse_timestamp(&self, tokens: &[&str]) -> Result<DateTime<Utc>, FieldError> {
        parse_rfc3339(tokens)
    }

    /// The user is not always bracketed and the id follows the host on the
    /// same line.
    fn parse_user_host(&self, line: &str, query: &mut Query) -> Result<(), FieldError> {
        let items: Vec<&str> = line.split_whitespace().collect();
        let malformed = || FieldError::MalformedUserHost(line.to_string());

        let key = items
            .iter()
            .position(|t| t.to_lowercase().contains("user@host:"))
            .ok_or_else(malformed)?;
        let at = items[key..]
            .iter()
            .position(|t| *t == "@")
            .map(|p| p + key)
            .ok_or_else(malformed)?;
        let id_key = items[at..]
            .iter()
            .position(|t| t.eq_ignore_ascii_case("id:"))
            .map(|p| p + at);

        query.user = items[key + 1..at]
            .first()
            .map(|t| unbracket(t))
            .unwrap_or_default()
            .to_string();

        let host_tokens = &items[at + 1..id_key.unwrap_or(items.len())];
        query.host = host_tokens
            .iter()
            .filter(|t| t.starts_with('['))
            .map(|t| unbracket(t))
            .find(|h| !h.is_empty())
            .or_else(|| host_tokens.iter().copied().find(|t| !t.starts_with('[')))
            .unwrap_or_default()
            .to_string();

        if let Some(id_key) = id_key {
            if let Some(id) = items.get(id_key + 1) {
                query.id = u64::parse_field(id, "id")?;
            }
        }

        if query.user.is_empty() && query.host.is_empty() {
            return Err(malformed());
        }
        Ok(())
    }

    /// `InnoDB_trx_id:` would match the id keyword, so the id is only taken
    /// from the `User@Host:` line.
    fn reads_id_keyword(&self) -> bool {
        false
    }
}

/// `root[root]` → `root`, `[127.0.0.1]` → `127.0.0.1`, `user` → `user`.
fn unbracket(token: &str) -> &str {
    match (token.find('['), token.rfind(']')) {
        (Some(open), Some(close)) if open < close => {
            let inner = &token[open + 1..close];
            if inner.is_empty() && open > 0 {
                &token[..open]
            } else {
                inner
            }
        }
        _ => token,
    }
}
