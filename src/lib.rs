//! Slow query log parsing and digest for MySQL, MariaDB, Percona and PXC.
//!
//! A [`Parser`] streams [`Query`] records out of a log through two
//! background tasks (block scanner, record parser) linked by bounded
//! channels. A [`Digest`] groups the records by fingerprint hash into
//! [`Statistics`], which are then finalized and ordered with [`rank`].
//!
//! ```no_run
//! use slowql::{digest_log, rank, Config, Kind};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let file = tokio::fs::File::open("slow.log").await?;
//! let reader = tokio::io::BufReader::new(file);
//!
//! let mut report = digest_log(Kind::MariaDb, reader, &Config::default()).await?;
//! rank(&mut report.statistics, "query_time", true)?;
//!
//! for stats in report.statistics.iter().take(3) {
//!     println!("{} calls, {:.3}s: {}", stats.calls, stats.cum_query_time, stats.fingerprint);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dialect;
pub mod digest;
pub mod error;
pub mod fingerprint;
pub mod parser;
pub mod query;
pub mod rank;
pub mod scanner;
pub mod server;
pub mod snapshot;
pub mod stats;

use std::time::Duration;

use tokio::io::AsyncBufRead;
use tracing::info;

pub use config::{Config, DigestConfig, ParserConfig};
pub use digest::{Digest, RunSummary};
pub use error::{Error, FieldError, Result};
pub use fingerprint::Fingerprinter;
pub use parser::Parser;
pub use query::{Kind, Query};
pub use rank::{rank, sort_statistics, SortKey};
pub use server::Server;
pub use snapshot::Snapshot;
pub use stats::Statistics;

/// Outcome of [`digest_log`].
#[derive(Debug, Clone)]
pub struct DigestReport {
    pub server: Server,
    /// Finalized statistics, unordered
    pub statistics: Vec<Statistics>,
    /// Number of records parsed
    pub queries: usize,
    /// Time span between the first and last record of the log
    pub real_duration: Duration,
    /// Wall clock time spent digesting
    pub digest_duration: Duration,
}

/// Parses a whole log and returns its finalized statistics.
pub async fn digest_log<R>(kind: Kind, reader: R, config: &Config) -> Result<DigestReport>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    config.validate()?;

    let mut parser = Parser::with_config(kind, reader, &config.parser).await?;
    let digest = Digest::new(&config.digest);
    let summary = digest.run(&mut parser).await;

    info!("digest duration: {:?}", summary.elapsed);
    info!("parsed {} queries", summary.queries);
    info!("found {} different query hashes", digest.len());

    let real_duration = stats::real_duration(summary.first, summary.last);
    Ok(DigestReport {
        server: parser.server().clone(),
        statistics: digest.finish(real_duration),
        queries: summary.queries,
        real_duration,
        digest_duration: summary.elapsed,
    })
}
