//! In-run deduplication of normalized labels.
//!
//! Scoped to a single run: nothing here looks at the canonical store, whose
//! own uniqueness constraint remains the authoritative guard.

use std::collections::HashSet;

/// Tracks labels already seen during one run.
#[derive(Debug, Default)]
pub struct Seen {
  labels: HashSet<String>,
}

impl Seen {
  pub fn new() -> Self { Self::default() }

  /// Returns `true` the first time `label` is offered.
  pub fn first_sighting(&mut self, label: &str) -> bool {
    if self.labels.contains(label) {
      return false;
    }
    self.labels.insert(label.to_owned());
    true
  }
}

/// Remove repeated labels, keeping the first occurrence of each.
pub fn dedup<I>(labels: I) -> Vec<String>
where
  I: IntoIterator<Item = String>,
{
  let mut seen = Seen::new();
  labels
    .into_iter()
    .filter(|label| seen.first_sighting(label))
    .collect()
}
