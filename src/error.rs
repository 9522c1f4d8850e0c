//! Error types.
//!
//! Header field failures are [`FieldError`]s: they are logged and the field
//! stays at its zero value. Everything a caller has to act on is an [`Error`].

use thiserror::Error;

/// A header token that could not be converted into its field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    /// The keyword was the last token of the line
    #[error("{field}: missing value")]
    MissingValue {
        /// Header keyword
        field: &'static str,
    },

    /// Integer conversion failed
    #[error("{field}: error converting {value:?} to int: {source}")]
    InvalidInteger {
        /// Header keyword
        field: &'static str,
        /// Raw token
        value: String,
        /// Underlying parse error
        source: std::num::ParseIntError,
    },

    /// Float conversion failed
    #[error("{field}: error converting {value:?} to float: {source}")]
    InvalidFloat {
        /// Header keyword
        field: &'static str,
        /// Raw token
        value: String,
        /// Underlying parse error
        source: std::num::ParseFloatError,
    },

    /// Timestamp conversion failed
    #[error("time: error converting {value:?} to time: {source}")]
    InvalidTimestamp {
        /// Raw token(s)
        value: String,
        /// Underlying parse error
        source: chrono::ParseError,
    },

    /// The `User@Host:` line does not carry the expected user and host
    #[error("user@host: cannot extract user and host from {0:?}")]
    MalformedUserHost(String),
}

/// Library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading the source failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The database kind is not one of the recognized dialects
    #[error("kind not recognised: {0}")]
    UnknownKind(String),

    /// The ranking key is not one of [`crate::SortKey::ALL`]
    #[error("unknown order {0:?}, use 'random'")]
    UnknownSortKey(String),

    /// A configuration value is out of bounds
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;
