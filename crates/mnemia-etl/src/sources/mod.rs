//! Source adapters — one per external origin, all sharing the [`Source`]
//! contract.
//!
//! An adapter only fetches. Normalization, deduplication and persistence are
//! the pipeline's job, except for the CSV corpus whose per-file cleanup is
//! part of its contract (see [`corpus`]).

use std::future::Future;

use mnemia_core::source::SourceTag;

use crate::SourceError;

pub mod api;
pub mod corpus;
pub mod document;
pub mod mirror;
pub mod web;

/// Raw candidates delivered by one successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Harvest {
  /// Provenance of the candidates. A fallback chain reports the tag of the
  /// branch that actually supplied them.
  pub source:          SourceTag,
  pub candidates:      Vec<String>,
  /// Partial failures that did not abort the fetch (e.g. one API topic).
  pub failures:        Vec<String>,
  /// Set when the candidates come from a fallback branch: why the primary
  /// was abandoned.
  pub fallback_reason: Option<String>,
}

impl Harvest {
  pub fn new(source: SourceTag, candidates: Vec<String>) -> Self {
    Self {
      source,
      candidates,
      failures: Vec::new(),
      fallback_reason: None,
    }
  }
}

/// Something that can fetch raw candidate labels from one origin.
///
/// Implementations report every failure through [`SourceError`]; they never
/// panic and never write to the store.
pub trait Source: Send + Sync {
  /// The provenance tag used when this source succeeds on its own.
  fn tag(&self) -> SourceTag;

  fn fetch(&self) -> impl Future<Output = Result<Harvest, SourceError>> + Send + '_;
}
