//! Multi-source ingestion for MnémIA.
//!
//! Each source adapter fetches raw candidate labels from one origin; the
//! [`pipeline::Pipeline`] normalizes and deduplicates them, hands them to any
//! [`mnemia_core::store::CanonicalStore`], and records a
//! [`report::RunReport`] per run. Source failures never escape a run.
//!
//! # Running one source
//!
//! ```rust,ignore
//! let store = SqliteStore::open("mnemia.db").await?;
//! let mut pipeline = Pipeline::new(store, Box::new(FileLog::new("etl_log.txt")));
//! let report = pipeline.run_kind(&config, SourceKind::Web).await;
//! ```

pub mod error;
pub mod fallback;
pub mod pipeline;
pub mod report;
pub mod settings;
pub mod sources;

pub use error::{Error, Result, SourceError};
pub use pipeline::{Pipeline, SourceKind};
pub use settings::EtlConfig;

#[cfg(test)]
mod tests;
