mod report;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use slowql::{digest_log, sort_statistics, Config, Kind, SortKey};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Slow query log file to digest
    #[arg(short, long)]
    file: PathBuf,

    /// Database kind: mysql, mariadb, pxc or percona
    #[arg(short, long)]
    kind: Kind,

    /// Log level
    #[arg(short, long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Top queries to show
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u64).range(1..))]
    top: u64,

    /// How to sort queries. Use ? to see all the available values
    #[arg(long = "sort-by", default_value = "random")]
    sort_by: String,

    /// Sort by decreasing order
    #[arg(long)]
    dec: bool,

    /// Maximum number of aggregation tasks running at once
    #[arg(long, default_value_t = 1024)]
    max_in_flight: usize,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error | LogLevel::Fatal => "error",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.sort_by == "?" {
        println!("Available values:");
        for key in SortKey::ALL {
            println!("    {}", key);
        }
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(args.log_level.directive())),
        )
        .with_writer(io::stderr)
        .init();

    let order = match args.sort_by.parse::<SortKey>() {
        Ok(order) => order,
        Err(e) => {
            warn!("{}", e);
            SortKey::Random
        }
    };

    if tracing::enabled!(Level::INFO) {
        match count_lines(&args.file) {
            Ok(lines) => info!("log file has {} lines", lines),
            Err(e) => warn!("cannot count lines in log file: {}", e),
        }
    }

    let file = tokio::fs::File::open(&args.file)
        .await
        .with_context(|| format!("cannot open log file {}", args.file.display()))?;
    debug!("{} successfully opened", args.file.display());

    let mut config = Config::default();
    config.digest.max_in_flight = args.max_in_flight;

    let mut report = digest_log(args.kind, tokio::io::BufReader::new(file), &config).await?;
    sort_statistics(&mut report.statistics, order, args.dec);

    let top = usize::try_from(args.top).unwrap_or(usize::MAX);
    report::print_report(&report.server, &report.statistics, order, top, &mut io::stdout())?;

    debug!("end of program, exiting");
    Ok(())
}

fn count_lines(path: &Path) -> io::Result<usize> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut count = 0;
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(count);
        }
        count += buf.iter().filter(|&&b| b == b'\n').count();
        let len = buf.len();
        reader.consume(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from([
            "slowql-digest", "-f", "slow.log", "-k", "mariadb", "-l", "debug", "--top", "5",
            "--sort-by", "p95", "--dec",
        ])
        .unwrap();

        assert_eq!(args.kind, Kind::MariaDb);
        assert!(matches!(args.log_level, LogLevel::Debug));
        assert_eq!(args.top, 5);
        assert_eq!(args.sort_by, "p95");
        assert!(args.dec);
    }

    #[test]
    fn test_parse_args_rejects_bad_values() {
        assert!(Args::try_parse_from(["slowql-digest", "-f", "x", "-k", "plop"]).is_err());
        assert!(Args::try_parse_from(["slowql-digest", "-k", "mysql"]).is_err());
        assert!(
            Args::try_parse_from(["slowql-digest", "-f", "x", "-k", "mysql", "--top", "0"]).is_err()
        );
    }

    #[test]
    fn test_fatal_maps_to_error() {
        assert_eq!(LogLevel::Fatal.directive(), "error");
        assert_eq!(LogLevel::Trace.directive(), "trace");
    }

    #[test]
    fn test_count_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "a\nb\nc\n").unwrap();
        assert_eq!(count_lines(file.path()).unwrap(), 3);
    }
}
