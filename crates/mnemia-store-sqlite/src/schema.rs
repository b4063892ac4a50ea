//! SQL schema for the MnémIA canonical store.
//!
//! Executed once at connection startup. There is no migration path; the
//! version number is recorded in `PRAGMA user_version` for inspection only.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS categories (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL UNIQUE CHECK (length(name) > 0)
);

-- Rebuilt wholesale by every CSV run; see `replace_constraints`.
CREATE TABLE IF NOT EXISTS constraints (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    category_id  INTEGER NOT NULL REFERENCES categories(id),
    label        TEXT NOT NULL CHECK (length(label) > 0),
    UNIQUE (category_id, label)
);

-- Additive pool. The label alone is the uniqueness key: the first source to
-- insert a label keeps its provenance.
CREATE TABLE IF NOT EXISTS inspirations (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    label       TEXT NOT NULL UNIQUE CHECK (length(label) > 0),
    source      TEXT NOT NULL CHECK (source IN (
                  'api-fetch', 'csv', 'document-store',
                  'document-store-fallback', 'web-scrape', 'relational-mirror'
                )),
    created_at  TEXT NOT NULL   -- ISO 8601 UTC
);

CREATE INDEX IF NOT EXISTS constraints_category_idx ON constraints(category_id);
CREATE INDEX IF NOT EXISTS inspirations_source_idx  ON inspirations(source);

PRAGMA user_version = 1;
";
