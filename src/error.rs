//! Error type shared by every stage of the splitter.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SplitError>;

#[derive(Error, Debug)]
pub enum SplitError {
    /// A start/end value was not an `H:M:S`-shaped triple of integers.
    #[error("malformed timestamp '{0}' (expected H:M:S)")]
    MalformedTimestamp(String),

    /// Total duration handed to the normalizer was negative or not finite.
    #[error("invalid total duration {0}")]
    InvalidDuration(f64),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config '{path}': {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The capability flags say the tool is not installed.
    #[error("{0} not found in PATH")]
    ToolMissing(&'static str),

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: &'static str,
        status: String,
        stderr: String,
    },

    #[error("failed to probe duration: {0}")]
    Probe(String),

    #[error("source audio not found: {0}")]
    NoSourceAudio(PathBuf),

    #[error("tracklist not found: {0} (run detect or run first)")]
    NoTracklist(PathBuf),
}

impl SplitError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
