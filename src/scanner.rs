//! Splits the raw log into blocks, one block per query record.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::server::HEADER_LINES;

/// Every line describing one query record: `#` headers followed by SQL text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    lines: Vec<String>,
}

impl Block {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn push(&mut self, line: String) {
        self.lines.push(line);
    }
}

/// Line-oriented reader over a slow query log.
pub struct Scanner<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin> Scanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Reads the leading server metadata lines. Returns fewer lines if the
    /// source is shorter or unreadable.
    pub async fn read_header(&mut self) -> Vec<String> {
        let mut header = Vec::with_capacity(HEADER_LINES);
        while header.len() < HEADER_LINES {
            match self.lines.next_line().await {
                Ok(Some(line)) => header.push(line),
                Ok(None) => break,
                Err(e) => {
                    error!("cannot read server metadata header: {}", e);
                    break;
                }
            }
        }
        header
    }

    /// Sends every block of the rest of the source on `blocks`.
    ///
    /// A header line opens a new block only when it follows body text;
    /// consecutive headers belong to the same record. The channel is closed
    /// when this returns, which is the end-of-stream signal downstream.
    pub async fn run(mut self, blocks: mpsc::Sender<Block>) {
        let mut block = Block::default();
        let mut in_query = false;
        let mut sent = 0usize;

        loop {
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    error!("scanning stopped early: {}", e);
                    break;
                }
            };

            if line.contains("SET timestamp") {
                continue;
            }

            if line.starts_with('#') {
                if in_query {
                    in_query = false;
                    if !block.is_empty() {
                        if blocks.send(std::mem::take(&mut block)).await.is_err() {
                            debug!("block receiver dropped, scanning stopped");
                            return;
                        }
                        sent += 1;
                    }
                }
            } else {
                in_query = true;
            }
            block.push(line);
        }

        if !block.is_empty() {
            if blocks.send(block).await.is_err() {
                debug!("block receiver dropped before the last block");
                return;
            }
            sent += 1;
        }
        debug!("scanning done, {} blocks sent", sent);
    }
}
