//! Canonical records: categories, constraints and inspiration entries.
//!
//! All labels held by these types are already normalized; see
//! [`crate::normalize`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::source::SourceTag;

/// A named grouping of constraints (e.g. "parties_du_corps").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
  pub id:   i64,
  pub name: String,
}

/// A normalized label scoped to exactly one [`Category`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
  pub id:          i64,
  pub category_id: i64,
  pub label:       String,
}

/// A normalized label in the shared inspiration pool.
///
/// The label is globally unique across sources: the first source to insert
/// it owns the provenance tag forever after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspirationEntry {
  pub id:         i64,
  pub label:      String,
  pub source:     SourceTag,
  pub created_at: DateTime<Utc>,
}

/// Normalized, in-file-deduplicated labels destined for one category.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryLabels {
  pub category:  String,
  pub labels:    Vec<String>,
  /// Row count read from the origin before normalization.
  pub raw_count: usize,
}
