use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// A line that does not fit the grammar of its family's decoder. Always
/// recovered: the line is counted as skipped and reading continues.
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("line is shorter than the {expected}-byte layout")]
    TooShort { expected: usize },
    #[error("missing {0}")]
    MissingField(&'static str),
    #[error("unparseable timestamp `{fragment}`: {source}")]
    InvalidTimestamp {
        fragment: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("unparseable offset `{0}`")]
    InvalidOffset(String),
    #[error("timestamp out of range")]
    OutOfRange,
    #[error("empty description")]
    EmptyDescription,
}

impl DecodeError {
    pub(crate) fn invalid_timestamp(fragment: &str, source: chrono::ParseError) -> Self {
        Self::InvalidTimestamp {
            fragment: fragment.to_string(),
            source,
        }
    }
}

/// A physical file or the session-history helper could not be read. The
/// affected input contributes zero events; the family keeps going.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot run session-history helper `{}`: {source}", program.display())]
    HelperSpawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("session-history helper `{}` exited with {status}: {stderr}", program.display())]
    HelperFailed {
        program: PathBuf,
        status: ExitStatus,
        stderr: String,
    },
}

/// Malformed window query at the command-line boundary.
#[derive(Debug, Error, PartialEq)]
pub enum QueryInputError {
    #[error(
        "expected `YYYY-MM-DD hh:mm:ss, N` (for example `2014-02-19 19:07:05, 3`), got `{0}`"
    )]
    MissingWindow(String),
    #[error("the date-time part `{0}` does not match `YYYY-MM-DD hh:mm:ss`")]
    InvalidDateTime(String),
    #[error("the window part `{0}` is not a non-negative whole number of seconds")]
    InvalidSeconds(String),
    #[error("a window of {0} seconds runs past the supported date range")]
    OutOfRange(i64),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("`jobs` must be at least 1")]
    ZeroJobs,
}
