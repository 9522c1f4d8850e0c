use std::io::Write;

use slowql::{Server, SortKey, Statistics};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Calls")]
    calls: u64,
    #[tabled(rename = "Cum Query Time")]
    cum_query_time: String,
    #[tabled(rename = "Mean")]
    mean_time: String,
    #[tabled(rename = "P50")]
    p50_time: String,
    #[tabled(rename = "P95")]
    p95_time: String,
    #[tabled(rename = "Concurrency")]
    concurrency: String,
    #[tabled(rename = "Hash")]
    hash: String,
    #[tabled(rename = "Fingerprint")]
    fingerprint: String,
}

impl Row {
    fn new(rank: usize, stats: &Statistics) -> Self {
        Self {
            rank,
            calls: stats.calls,
            cum_query_time: format!("{:.3}s", stats.cum_query_time),
            mean_time: format!("{:.3}s", stats.mean_time),
            p50_time: format!("{:.3}s", stats.p50_time),
            p95_time: format!("{:.3}s", stats.p95_time),
            concurrency: format!("{:.2}%", stats.concurrency),
            hash: stats.hash.clone(),
            fingerprint: truncate(&stats.fingerprint, 60),
        }
    }
}

/// Writes the server line and the `top` first statistics as a table.
pub fn print_report(
    server: &Server,
    stats: &[Statistics],
    order: SortKey,
    top: usize,
    writer: &mut dyn Write,
) -> anyhow::Result<()> {
    writeln!(
        writer,
        "Server: {} {} ({}), port {}, socket {}",
        server.binary, server.version, server.version_description, server.port, server.socket
    )?;
    writeln!(writer, "Sorted by: {}", order)?;
    writeln!(writer, "Showing top {} of {} queries", top.min(stats.len()), stats.len())?;

    let rows: Vec<Row> = stats
        .iter()
        .take(top)
        .enumerate()
        .map(|(i, s)| Row::new(i + 1, s))
        .collect();
    writeln!(writer, "{}", Table::new(rows))?;
    Ok(())
}

fn truncate(query: &str, max: usize) -> String {
    if query.chars().count() <= max {
        return query.to_string();
    }
    let mut q: String = query.chars().take(max - 3).collect();
    q.push_str("...");
    q
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("select 1", 60), "select 1");
        assert_eq!(truncate("abcdefghij", 6), "abc...");
    }

    #[test]
    fn test_print_report() {
        let stats = vec![
            Statistics {
                hash: "3858f62230ac3c915f300c664312c63f".to_string(),
                fingerprint: "select * from t where id = ?".to_string(),
                calls: 2,
                cum_query_time: 1.5,
                ..Default::default()
            },
            Statistics {
                hash: "2fb66bbfb88cdf9e07a3f1d1dfad71ab".to_string(),
                calls: 1,
                ..Default::default()
            },
        ];

        let mut out = Vec::new();
        print_report(&Server::unparsable(), &stats, SortKey::Calls, 1, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("Sorted by: calls"));
        assert!(out.contains("Showing top 1 of 2 queries"));
        assert!(out.contains("3858f62230ac3c915f300c664312c63f"));
        assert!(out.contains("1.500s"));
        assert!(!out.contains("2fb66bbfb88cdf9e07a3f1d1dfad71ab"));
    }
}
