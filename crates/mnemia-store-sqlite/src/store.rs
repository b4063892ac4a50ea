//! [`SqliteStore`] — the SQLite implementation of [`CanonicalStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use mnemia_core::{
  label::{Category, CategoryLabels, Constraint, InspirationEntry},
  source::SourceTag,
  store::{CanonicalStore, LoadOutcome, LoadReport},
};

use crate::{
  encode::{RawInspiration, decode_source, encode_dt, encode_source},
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// The canonical store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row helpers ─────────────────────────────────────────────────────────────
//
// These take a plain connection so they run equally inside or outside a
// transaction (`Transaction` derefs to `Connection`).

fn category_id(conn: &rusqlite::Connection, name: &str) -> rusqlite::Result<i64> {
  conn.execute(
    "INSERT INTO categories (name) VALUES (?1) ON CONFLICT (name) DO NOTHING",
    rusqlite::params![name],
  )?;
  conn.query_row(
    "SELECT id FROM categories WHERE name = ?1",
    rusqlite::params![name],
    |row| row.get(0),
  )
}

fn outcome(changed: usize) -> LoadOutcome {
  if changed == 0 { LoadOutcome::Ignored } else { LoadOutcome::Inserted }
}

fn insert_inspiration(
  conn:       &rusqlite::Connection,
  source:     &str,
  label:      &str,
  created_at: &str,
) -> rusqlite::Result<LoadOutcome> {
  // ON CONFLICT only absorbs the uniqueness clash; CHECK violations still
  // surface as row errors.
  let changed = conn.execute(
    "INSERT INTO inspirations (label, source, created_at) VALUES (?1, ?2, ?3)
     ON CONFLICT (label) DO NOTHING",
    rusqlite::params![label, source, created_at],
  )?;
  Ok(outcome(changed))
}

fn insert_constraint(
  conn:        &rusqlite::Connection,
  category_id: i64,
  label:       &str,
) -> rusqlite::Result<LoadOutcome> {
  let changed = conn.execute(
    "INSERT INTO constraints (category_id, label) VALUES (?1, ?2)
     ON CONFLICT (category_id, label) DO NOTHING",
    rusqlite::params![category_id, label],
  )?;
  Ok(outcome(changed))
}

// ─── CanonicalStore impl ─────────────────────────────────────────────────────

impl CanonicalStore for SqliteStore {
  type Error = Error;

  // ── Categories ────────────────────────────────────────────────────────────

  async fn ensure_category(&self, name: &str) -> Result<Category> {
    let name_owned = name.to_owned();
    let id = self
      .conn
      .call(move |conn| Ok(category_id(conn, &name_owned)?))
      .await?;

    Ok(Category { id, name: name.to_owned() })
  }

  async fn list_categories(&self) -> Result<Vec<Category>> {
    let categories = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY id")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(Category {
              id:   row.get(0)?,
              name: row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(categories)
  }

  // ── Inspiration pool ──────────────────────────────────────────────────────

  async fn load_inspiration(&self, source: SourceTag, label: String) -> Result<LoadOutcome> {
    let source_str = encode_source(source);
    let at_str     = encode_dt(Utc::now());

    let outcome = self
      .conn
      .call(move |conn| Ok(insert_inspiration(conn, source_str, &label, &at_str)?))
      .await?;
    Ok(outcome)
  }

  async fn load_inspirations(
    &self,
    source: SourceTag,
    labels: Vec<String>,
  ) -> Result<LoadReport> {
    let source_str = encode_source(source);
    let at_str     = encode_dt(Utc::now());

    let report = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut report = LoadReport::default();

        for label in &labels {
          match insert_inspiration(&tx, source_str, label, &at_str) {
            Ok(outcome) => report.record(outcome),
            Err(e) => report.record_error(label.as_str(), e.to_string()),
          }
        }

        tx.commit()?;
        Ok(report)
      })
      .await?;

    Ok(report)
  }

  async fn list_inspirations(&self, source: Option<SourceTag>) -> Result<Vec<InspirationEntry>> {
    let source_str = source.map(encode_source);

    let raws: Vec<RawInspiration> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(tag) = source_str {
          let mut stmt = conn.prepare(
            "SELECT id, label, source, created_at FROM inspirations
             WHERE source = ?1 ORDER BY id",
          )?;
          stmt
            .query_map(rusqlite::params![tag], RawInspiration::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(
            "SELECT id, label, source, created_at FROM inspirations ORDER BY id",
          )?;
          stmt
            .query_map([], RawInspiration::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawInspiration::into_entry).collect()
  }

  async fn count_by_source(&self) -> Result<Vec<(SourceTag, usize)>> {
    let raw: Vec<(String, i64)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT source, COUNT(*) FROM inspirations GROUP BY source ORDER BY source",
        )?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raw
      .into_iter()
      .map(|(tag, n)| Ok((decode_source(&tag)?, usize::try_from(n).unwrap_or(0))))
      .collect()
  }

  // ── Constraints ───────────────────────────────────────────────────────────

  async fn replace_constraints(&self, groups: Vec<CategoryLabels>) -> Result<LoadReport> {
    let report = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM constraints", [])?;

        let mut report = LoadReport::default();
        for group in &groups {
          let cat_id = match category_id(&tx, &group.category) {
            Ok(id) => id,
            Err(e) => {
              let message = format!("category {:?}: {e}", group.category);
              for label in &group.labels {
                report.record_error(label.as_str(), message.clone());
              }
              continue;
            }
          };

          for label in &group.labels {
            match insert_constraint(&tx, cat_id, label) {
              Ok(outcome) => report.record(outcome),
              Err(e) => report.record_error(label.as_str(), e.to_string()),
            }
          }
        }

        tx.commit()?;
        Ok(report)
      })
      .await?;

    Ok(report)
  }

  async fn list_constraints(&self, category: &str) -> Result<Vec<Constraint>> {
    let name = category.to_owned();

    let found: Option<Vec<Constraint>> = self
      .conn
      .call(move |conn| {
        let cat_id: Option<i64> = conn
          .query_row(
            "SELECT id FROM categories WHERE name = ?1",
            rusqlite::params![name],
            |row| row.get(0),
          )
          .optional()?;

        let Some(cat_id) = cat_id else {
          return Ok(None);
        };

        let mut stmt = conn.prepare(
          "SELECT id, category_id, label FROM constraints
           WHERE category_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![cat_id], |row| {
            Ok(Constraint {
              id:          row.get(0)?,
              category_id: row.get(1)?,
              label:       row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Some(rows))
      })
      .await?;

    found.ok_or_else(|| Error::CategoryNotFound(category.to_owned()))
  }
}
