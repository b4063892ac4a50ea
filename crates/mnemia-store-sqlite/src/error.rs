//! Error type for `mnemia-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] mnemia_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("category not found: {0:?}")]
  CategoryNotFound(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
