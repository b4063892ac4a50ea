//! Relational mirror — one column of one table in a secondary SQLite file.
//!
//! There is no fallback: a missing file fails the run.

use std::path::PathBuf;

use mnemia_core::source::SourceTag;
use rusqlite::OpenFlags;

use crate::{
  SourceError,
  settings::EtlConfig,
  sources::{Harvest, Source},
};

pub struct MirrorSource {
  path:   PathBuf,
  table:  String,
  column: String,
}

impl MirrorSource {
  pub fn new(path: impl Into<PathBuf>, table: impl Into<String>, column: impl Into<String>) -> Self {
    Self {
      path:   path.into(),
      table:  table.into(),
      column: column.into(),
    }
  }

  pub fn from_config(config: &EtlConfig) -> Self {
    let m = &config.mirror;
    Self::new(config.resolve(&m.path), m.table.clone(), m.column.clone())
  }
}

/// `[A-Za-z_][A-Za-z0-9_]*`; anything else is refused rather than quoted.
fn is_identifier(s: &str) -> bool {
  let mut chars = s.chars();
  chars
    .next()
    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Source for MirrorSource {
  fn tag(&self) -> SourceTag { SourceTag::RelationalMirror }

  async fn fetch(&self) -> Result<Harvest, SourceError> {
    for ident in [&self.table, &self.column] {
      if !is_identifier(ident) {
        return Err(SourceError::Malformed(format!("invalid SQL identifier {ident:?}")));
      }
    }

    // Read-only open never creates the file, so absence surfaces here.
    let conn = tokio_rusqlite::Connection::open_with_flags(
      &self.path,
      OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .await
    .map_err(|e| SourceError::Unavailable(format!("{}: {e}", self.path.display())))?;

    let sql = format!(
      "SELECT CAST(\"{col}\" AS TEXT) FROM \"{table}\"",
      col = self.column,
      table = self.table,
    );

    let cells: Vec<Option<String>> = conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(SourceError::malformed)?;

    let candidates = cells.into_iter().map(Option::unwrap_or_default).collect();
    Ok(Harvest::new(SourceTag::RelationalMirror, candidates))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn secondary_db(dir: &std::path::Path) -> PathBuf {
    let path = dir.join("source_ref.db");
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn
      .execute_batch(
        "CREATE TABLE lexique_artistique (id INTEGER PRIMARY KEY, label TEXT);
         INSERT INTO lexique_artistique (label) VALUES ('Élan'), (NULL), ('  spirale '), (42);",
      )
      .unwrap();
    path
  }

  #[test]
  fn identifiers_are_validated() {
    assert!(is_identifier("lexique_artistique"));
    assert!(is_identifier("_x1"));
    assert!(!is_identifier("1x"));
    assert!(!is_identifier("label; DROP TABLE x"));
    assert!(!is_identifier(""));
  }

  #[tokio::test]
  async fn reads_every_row_of_the_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = secondary_db(dir.path());

    let harvest = MirrorSource::new(&path, "lexique_artistique", "label")
      .fetch()
      .await
      .unwrap();

    assert_eq!(harvest.source, SourceTag::RelationalMirror);
    assert_eq!(harvest.candidates, ["Élan", "", "  spirale ", "42"]);
  }

  #[tokio::test]
  async fn missing_database_is_a_hard_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.db");

    let err = MirrorSource::new(&path, "lexique_artistique", "label")
      .fetch()
      .await
      .unwrap_err();

    assert!(matches!(err, SourceError::Unavailable(_)));
    assert!(!path.exists());
  }

  #[tokio::test]
  async fn unknown_table_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let path = secondary_db(dir.path());

    let err = MirrorSource::new(&path, "absent", "label")
      .fetch()
      .await
      .unwrap_err();
    assert!(matches!(err, SourceError::Malformed(_)));
  }

  #[tokio::test]
  async fn hostile_identifier_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = secondary_db(dir.path());

    let err = MirrorSource::new(&path, "lexique_artistique", "label\" FROM x --")
      .fetch()
      .await
      .unwrap_err();
    assert!(matches!(err, SourceError::Malformed(_)));
  }
}
