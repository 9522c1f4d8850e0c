use tokio::io::AsyncBufRead;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::ParserConfig;
use crate::dialect::{Dialect, Grammar};
use crate::error::Result;
use crate::query::{Kind, Query};
use crate::scanner::{Block, Scanner};
use crate::server::{Server, ServerMetaParser};

/// Turns blocks into [`Query`] records with one dialect grammar.
#[derive(Debug, Clone)]
pub struct RecordParser {
    dialect: Dialect,
}

impl RecordParser {
    pub fn new(kind: Kind) -> Self {
        Self {
            dialect: Dialect::new(kind),
        }
    }

    /// Parses one block. Headers go through the grammar, body lines are
    /// concatenated as they are. Field errors are logged and skipped.
    pub fn parse_block(&self, block: &Block) -> Query {
        let mut query = Query::default();

        for line in block.lines() {
            if line.is_empty() {
                continue;
            }
            if line.starts_with('#') {
                for e in self.dialect.parse_header_line(line, &mut query) {
                    warn!("{}", e);
                }
            } else {
                query.query.push_str(line);
            }
        }

        query
    }

    /// Translates blocks until the block queue is closed, then closes the
    /// record queue by dropping `queries`.
    pub async fn run(self, mut blocks: mpsc::Receiver<Block>, queries: mpsc::Sender<Query>) {
        let mut parsed = 0usize;

        while let Some(block) = blocks.recv().await {
            let query = self.parse_block(&block);
            if query.is_empty() {
                debug!("block without any field dropped: {:?}", block.lines());
                continue;
            }
            if queries.send(query).await.is_err() {
                debug!("query receiver dropped, parsing stopped");
                return;
            }
            parsed += 1;
        }
        debug!("parsing done, {} queries sent", parsed);
    }
}

/// Streaming slow query log parser.
///
/// Building one reads the server metadata header, then starts the scanner
/// and the record parser as background tasks. Records are pulled with
/// [`Parser::next`].
#[derive(Debug)]
pub struct Parser {
    kind: Kind,
    server: Server,
    queries: mpsc::Receiver<Query>,
}

impl Parser {
    /// Parser with the default queue sizes.
    pub async fn new<R>(kind: Kind, reader: R) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        Self::start(kind, reader, &ParserConfig::default()).await
    }

    pub async fn with_config<R>(kind: Kind, reader: R, config: &ParserConfig) -> Result<Self>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        config.validate()?;
        Ok(Self::start(kind, reader, config).await)
    }

    async fn start<R>(kind: Kind, reader: R, config: &ParserConfig) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let mut scanner = Scanner::new(reader);
        let server = ServerMetaParser::new().parse(&scanner.read_header().await);
        debug!("server metadata: {:?}", server);

        let (block_tx, block_rx) = mpsc::channel(config.block_queue_capacity);
        let (query_tx, query_rx) = mpsc::channel(config.record_queue_capacity);

        tokio::spawn(scanner.run(block_tx));
        tokio::spawn(RecordParser::new(kind).run(block_rx, query_tx));
        debug!("{} parser started", kind);

        Self {
            kind,
            server,
            queries: query_rx,
        }
    }

    /// Next record, or `None` once the whole source has been parsed.
    pub async fn next(&mut self) -> Option<Query> {
        self.queries.recv().await
    }

    pub fn server(&self) -> &Server {
        &self.server
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }
}
