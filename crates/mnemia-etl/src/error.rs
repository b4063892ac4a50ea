//! Error types for `mnemia-etl`.

use std::time::Duration;

use thiserror::Error;

/// Why a source adapter produced nothing.
///
/// These never escape a run: the pipeline logs them and records the run as
/// aborted.
#[derive(Debug, Error)]
pub enum SourceError {
  /// Network, connection, configuration or missing-file failure.
  #[error("source unavailable: {0}")]
  Unavailable(String),

  /// The origin answered but not in the expected shape (missing column,
  /// field, or unparsable payload).
  #[error("malformed source: {0}")]
  Malformed(String),

  #[error("timed out after {0:?}")]
  Timeout(Duration),

  #[error("source returned no candidates")]
  Empty,

  /// Both sides of a fallback chain failed.
  #[error("no network and no fallback (primary: {primary}; fallback: {fallback})")]
  Exhausted {
    primary:  Box<SourceError>,
    fallback: Box<SourceError>,
  },
}

impl SourceError {
  pub fn unavailable(e: impl std::fmt::Display) -> Self { Self::Unavailable(e.to_string()) }

  pub fn malformed(e: impl std::fmt::Display) -> Self { Self::Malformed(e.to_string()) }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
