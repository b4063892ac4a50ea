//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; source tags as their
//! kebab-case names.

use chrono::{DateTime, Utc};
use mnemia_core::{label::InspirationEntry, source::SourceTag};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── SourceTag ───────────────────────────────────────────────────────────────

pub fn encode_source(tag: SourceTag) -> &'static str { tag.as_str() }

pub fn decode_source(s: &str) -> Result<SourceTag> { Ok(SourceTag::parse(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `inspirations` row.
pub struct RawInspiration {
  pub id:         i64,
  pub label:      String,
  pub source:     String,
  pub created_at: String,
}

impl RawInspiration {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      label:      row.get(1)?,
      source:     row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_entry(self) -> Result<InspirationEntry> {
    Ok(InspirationEntry {
      id:         self.id,
      label:      self.label,
      source:     decode_source(&self.source)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
