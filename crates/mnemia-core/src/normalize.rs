//! Text normalization — turns a raw candidate into its comparable form.
//!
//! Pipeline, in order:
//!   raw &str
//!     └─ NFC composition          (decomposed accents → precomposed)
//!          └─ trim + collapse     (whitespace runs → one space)
//!               └─ lower-case, then NFC again
//!                    └─ corrections (whole-word lexical fixes)
//!
//! The second composition is needed because lowercasing can expose a
//! precomposed form that has no upper-case counterpart (`T\u{308}` → `ẗ`).
//!
//! [`normalize`] is total and idempotent. An empty result means the candidate
//! must be rejected.

use std::{collections::HashMap, sync::LazyLock};

use regex::{Captures, Regex};
use unicode_normalization::UnicodeNormalization as _;

/// Phrases commonly typed without their diacritics, and their repaired form.
///
/// Longer phrases come first so that the alternation prefers them.
pub const CORRECTIONS: &[(&str, &str)] = &[
  ("tres rapide", "tr\u{e8}s rapide"),
  ("tres lent", "tr\u{e8}s lent"),
  ("tres", "tr\u{e8}s"),
  ("a genoux", "\u{e0} genoux"),
  ("allonge", "allong\u{e9}"),
];

struct Corrector {
  pattern:      Regex,
  replacements: HashMap<&'static str, &'static str>,
}

static CORRECTOR: LazyLock<Corrector> = LazyLock::new(|| {
  let alternation = CORRECTIONS
    .iter()
    .map(|(from, _)| regex::escape(from))
    .collect::<Vec<_>>()
    .join("|");
  // Built from a constant table; only an edit to CORRECTIONS can break it.
  let pattern = Regex::new(&format!(r"(?i)\b(?:{alternation})\b"))
    .expect("correction table compiles");
  Corrector {
    pattern,
    replacements: CORRECTIONS.iter().copied().collect(),
  }
});

/// Canonicalize `raw`. Never fails; may return an empty string.
pub fn normalize(raw: &str) -> String {
  if raw.is_empty() {
    return String::new();
  }

  let composed: String = raw.nfc().collect();
  let collapsed = composed.split_whitespace().collect::<Vec<_>>().join(" ");
  let lowered: String = collapsed.to_lowercase().nfc().collect();

  let corrector = &*CORRECTOR;
  corrector
    .pattern
    .replace_all(&lowered, |caps: &Captures<'_>| {
      let hit = caps[0].to_lowercase();
      corrector
        .replacements
        .get(hit.as_str())
        .map_or_else(|| caps[0].to_owned(), |fixed| (*fixed).to_owned())
    })
    .into_owned()
}

/// Normalize every candidate and drop the ones that come out empty.
///
/// Returns the surviving labels (input order preserved) and the number of
/// rejected candidates.
pub fn normalize_all<I, S>(raw: I) -> (Vec<String>, usize)
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let mut kept = Vec::new();
  let mut rejected = 0;
  for candidate in raw {
    let label = normalize(candidate.as_ref());
    if label.is_empty() {
      rejected += 1;
    } else {
      kept.push(label);
    }
  }
  (kept, rejected)
}
