//! Pipeline tuning.

use crate::error::{Error, Result};

/// Queue sizes of the parsing pipeline.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Blocks buffered between the scanner and the record parser
    pub block_queue_capacity: usize,
    /// Records buffered between the record parser and the consumer
    pub record_queue_capacity: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            block_queue_capacity: 4096,
            record_queue_capacity: 1024,
        }
    }
}

impl ParserConfig {
    pub fn validate(&self) -> Result<()> {
        if self.block_queue_capacity == 0 {
            return Err(Error::InvalidConfig(
                "block_queue_capacity must be > 0".to_string(),
            ));
        }
        if self.record_queue_capacity == 0 {
            return Err(Error::InvalidConfig(
                "record_queue_capacity must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fan-in settings of the digest.
#[derive(Debug, Clone)]
pub struct DigestConfig {
    /// Maximum number of aggregation tasks alive at once
    pub max_in_flight: usize,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 1024,
        }
    }
}

impl DigestConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_in_flight == 0 {
            return Err(Error::InvalidConfig("max_in_flight must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Everything [`crate::digest_log`] needs.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub parser: ParserConfig,
    pub digest: DigestConfig,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.parser.validate()?;
        self.digest.validate()
    }
}
