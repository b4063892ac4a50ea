//! The `CanonicalStore` trait and the load bookkeeping it returns.
//!
//! The trait is implemented by storage backends (e.g. `mnemia-store-sqlite`).
//! The ETL crate depends on this abstraction, not on any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  label::{Category, CategoryLabels, Constraint, InspirationEntry},
  source::SourceTag,
};

// ─── Load bookkeeping ────────────────────────────────────────────────────────

/// What happened to a single row offered to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
  Inserted,
  /// A row with the same uniqueness key already existed; nothing changed.
  Ignored,
}

/// A row that failed to persist. The rest of its batch was unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
  pub label:   String,
  pub message: String,
}

/// Counters for one batch written inside a single transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
  pub inserted: usize,
  pub ignored:  usize,
  pub errors:   Vec<RowError>,
}

impl LoadReport {
  pub fn record(&mut self, outcome: LoadOutcome) {
    match outcome {
      LoadOutcome::Inserted => self.inserted += 1,
      LoadOutcome::Ignored => self.ignored += 1,
    }
  }

  pub fn record_error(&mut self, label: impl Into<String>, message: impl Into<String>) {
    self.errors.push(RowError {
      label:   label.into(),
      message: message.into(),
    });
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the canonical label store.
///
/// Inserts are "insert if absent": a uniqueness conflict is reported as
/// [`LoadOutcome::Ignored`], never as an error, and never overwrites the
/// provenance of the existing row. Inspiration labels are unique across all
/// sources; constraint labels are unique within their category.
pub trait CanonicalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Categories ────────────────────────────────────────────────────────

  /// Return the category called `name`, creating it if needed.
  fn ensure_category<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Category, Self::Error>> + Send + 'a;

  fn list_categories(
    &self,
  ) -> impl Future<Output = Result<Vec<Category>, Self::Error>> + Send + '_;

  // ── Inspiration pool — additive ───────────────────────────────────────

  /// Insert one label unless it is already present.
  fn load_inspiration(
    &self,
    source: SourceTag,
    label: String,
  ) -> impl Future<Output = Result<LoadOutcome, Self::Error>> + Send + '_;

  /// Insert a batch of labels in one transaction.
  ///
  /// Per-row failures are collected in the returned [`LoadReport`]; only a
  /// failure of the transaction itself yields `Err`.
  fn load_inspirations(
    &self,
    source: SourceTag,
    labels: Vec<String>,
  ) -> impl Future<Output = Result<LoadReport, Self::Error>> + Send + '_;

  fn list_inspirations(
    &self,
    source: Option<SourceTag>,
  ) -> impl Future<Output = Result<Vec<InspirationEntry>, Self::Error>> + Send + '_;

  /// Row counts per provenance tag, for end-of-run summaries.
  fn count_by_source(
    &self,
  ) -> impl Future<Output = Result<Vec<(SourceTag, usize)>, Self::Error>> + Send + '_;

  // ── Constraints — full replace ────────────────────────────────────────

  /// Replace the whole constraint table with `groups`, atomically.
  ///
  /// Existing constraints are deleted and the new ones inserted in the same
  /// transaction, so an interrupted run leaves the previous table intact.
  /// Categories are resolved or created by name and never deleted.
  fn replace_constraints(
    &self,
    groups: Vec<CategoryLabels>,
  ) -> impl Future<Output = Result<LoadReport, Self::Error>> + Send + '_;

  /// Constraints belonging to the category called `category`.
  fn list_constraints<'a>(
    &'a self,
    category: &'a str,
  ) -> impl Future<Output = Result<Vec<Constraint>, Self::Error>> + Send + 'a;
}
