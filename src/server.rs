//! Server metadata carried by the first lines of a slow query log.
//!
//! ```text
//! /usr/sbin/mysqld, Version: 8.0.23 (MySQL Community Server - GPL). started with:
//! Tcp port: 3306  Unix socket: /var/run/mysqld/mysqld.sock
//! Time                 Id Command    Argument
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Value used for every string field when the header cannot be parsed.
pub const UNPARSABLE: &str = "unable to parse line";

/// Number of leading lines that carry server metadata.
pub const HEADER_LINES: usize = 3;

/// Database instance that wrote the log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub binary: String,
    pub port: u16,
    pub socket: String,
    pub version: String,
    pub version_short: String,
    pub version_description: String,
}

impl Server {
    /// The placeholder returned when the header is not understood.
    pub fn unparsable() -> Self {
        Self {
            binary: UNPARSABLE.to_string(),
            port: 0,
            socket: UNPARSABLE.to_string(),
            version: UNPARSABLE.to_string(),
            version_short: UNPARSABLE.to_string(),
            version_description: UNPARSABLE.to_string(),
        }
    }
}

/// Parses the metadata header. Holds its compiled patterns.
#[derive(Debug, Clone)]
pub struct ServerMetaParser {
    version: Regex,
    network: Regex,
}

impl Default for ServerMetaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerMetaParser {
    pub fn new() -> Self {
        Self {
            version: Regex::new(
                r"^([^,]+),\s+Version:\s+([0-9\.]+)([A-Za-z0-9-]+)\s+\((.*)\)\. started",
            )
            .expect("valid version pattern"),
            network: Regex::new(r"Tcp port:\s*(\d+)\s+Unix socket:\s*(.*)$")
                .expect("valid network pattern"),
        }
    }

    /// Best effort: anything that does not match yields [`Server::unparsable`].
    pub fn parse(&self, lines: &[String]) -> Server {
        match self.try_parse(lines) {
            Some(server) => server,
            None => {
                warn!("cannot parse server metadata header, using placeholders");
                Server::unparsable()
            }
        }
    }

    fn try_parse(&self, lines: &[String]) -> Option<Server> {
        let versions = self.version.captures(lines.first()?)?;
        let net = self.network.captures(lines.get(1)?)?;

        let version_short = versions[2].to_string();
        Some(Server {
            binary: versions[1].to_string(),
            version: format!("{}{}", version_short, &versions[3]),
            version_short,
            version_description: versions[4].to_string(),
            port: net[1].parse().ok()?,
            socket: net[2].trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_parse_mysql_header() {
        let srv = ServerMetaParser::new().parse(&lines(&[
            "/usr/sbin/mysqld, Version: 8.0.23 (MySQL Community Server - GPL). started with:",
            "Tcp port: 3306  Unix socket: /var/run/mysqld/mysqld.sock",
            "Time                 Id Command    Argument",
        ]));

        assert_eq!(
            srv,
            Server {
                binary: "/usr/sbin/mysqld".to_string(),
                port: 3306,
                socket: "/var/run/mysqld/mysqld.sock".to_string(),
                version: "8.0.23".to_string(),
                version_short: "8.0.2".to_string(),
                version_description: "MySQL Community Server - GPL".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_mariadb_header() {
        let srv = ServerMetaParser::new().parse(&lines(&[
            "/opt/bitnami/mariadb/sbin/mysqld, Version: 10.5.9-MariaDB (Source distribution). started with:",
            "Tcp port: 3306  Unix socket: /opt/bitnami/mariadb/tmp/mysql.sock",
            "Time\t\t    Id Command\tArgument",
        ]));

        assert_eq!(srv.binary, "/opt/bitnami/mariadb/sbin/mysqld");
        assert_eq!(srv.port, 3306);
        assert_eq!(srv.socket, "/opt/bitnami/mariadb/tmp/mysql.sock");
        assert_eq!(srv.version, "10.5.9-MariaDB");
        assert_eq!(srv.version_short, "10.5.9");
        assert_eq!(srv.version_description, "Source distribution");
    }

    #[test]
    fn test_parse_percona_header() {
        let srv = ServerMetaParser::new().parse(&lines(&[
            "/usr/sbin/mysqld, Version: 5.7.29-32-log (Percona Server (GPL), Release 32, Revision 56bce88). started with:",
            "Tcp port: 3306  Unix socket: /tmp/mysql.sock",
            "Time                 Id Command    Argument",
        ]));

        assert_eq!(srv.version, "5.7.29-32-log");
        assert_eq!(srv.version_short, "5.7.29");
        assert_eq!(
            srv.version_description,
            "Percona Server (GPL), Release 32, Revision 56bce88"
        );
        assert_eq!(srv.socket, "/tmp/mysql.sock");
    }

    #[test]
    fn test_parse_unparsable_header() {
        let srv = ServerMetaParser::new().parse(&lines(&[
            "Version: 8.0.23 (MySQL Community Server - GPL). started with:",
            "Tcp port: 3306",
            "Time                 Id Command    Argument",
        ]));
        assert_eq!(srv, Server::unparsable());
    }

    #[test]
    fn test_parse_missing_network_line() {
        let srv = ServerMetaParser::new().parse(&lines(&[
            "/usr/sbin/mysqld, Version: 8.0.23 (MySQL Community Server - GPL). started with:",
            "Tcp port: 3306",
        ]));
        assert_eq!(srv, Server::unparsable());
    }

    #[test]
    fn test_parse_short_input() {
        assert_eq!(ServerMetaParser::new().parse(&[]), Server::unparsable());
    }
}
