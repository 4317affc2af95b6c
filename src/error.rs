//! Errors at the I/O boundary. Parsing and resolution never fail.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid glob pattern: {pattern}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("no input documents")]
    NoInput,

    #[error("unknown format: {0}. Use typescript or json")]
    UnknownFormat(String),

    #[error("failed to serialize output")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
