//! Error types for `mnemia-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown source tag: {0:?}")]
  UnknownSourceTag(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
