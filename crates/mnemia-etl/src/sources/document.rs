//! Document store (MongoDB) and its JSON-file fallback.

use std::{path::PathBuf, time::Duration};

use mnemia_core::source::SourceTag;
use mongodb::{
  Client,
  bson::Document,
  options::ClientOptions,
};
use serde_json::Value;

use crate::{
  SourceError,
  fallback::Fallback,
  settings::EtlConfig,
  sources::{Harvest, Source},
};

// ─── Primary: MongoDB ────────────────────────────────────────────────────────

/// Reads the first `limit` documents of a collection, projecting one field.
pub struct MongoSource {
  uri:        Option<String>,
  database:   String,
  collection: String,
  field:      String,
  limit:      i64,
  timeout:    Duration,
}

impl MongoSource {
  pub fn from_config(config: &EtlConfig) -> Self {
    let ds = &config.document_store;
    Self {
      uri:        ds.uri.clone(),
      database:   ds.database.clone(),
      collection: ds.collection.clone(),
      field:      ds.field.clone(),
      limit:      ds.limit,
      timeout:    Duration::from_millis(ds.connect_timeout_ms),
    }
  }
}

impl Source for MongoSource {
  fn tag(&self) -> SourceTag { SourceTag::DocumentStore }

  async fn fetch(&self) -> Result<Harvest, SourceError> {
    let uri = self
      .uri
      .as_deref()
      .filter(|u| !u.trim().is_empty())
      .ok_or_else(|| SourceError::Unavailable("document store URI not configured".into()))?;

    let mut options = ClientOptions::parse(uri)
      .await
      .map_err(SourceError::unavailable)?;
    options.server_selection_timeout = Some(self.timeout);
    options.connect_timeout = Some(self.timeout);

    let client = Client::with_options(options).map_err(SourceError::unavailable)?;
    let collection = client
      .database(&self.database)
      .collection::<Document>(&self.collection);

    let mut projection = Document::new();
    projection.insert(self.field.as_str(), 1);

    let mut cursor = collection
      .find(Document::new())
      .projection(projection)
      .limit(self.limit)
      .await
      .map_err(SourceError::unavailable)?;

    let mut candidates = Vec::new();
    while cursor.advance().await.map_err(SourceError::unavailable)? {
      let doc = cursor
        .deserialize_current()
        .map_err(SourceError::malformed)?;
      candidates.push(doc.get_str(&self.field).unwrap_or_default().to_owned());
    }

    Ok(Harvest::new(SourceTag::DocumentStore, candidates))
  }
}

// ─── Fallback: JSON file ─────────────────────────────────────────────────────

/// A local JSON array of records, each exposing the label field.
///
/// Parsed structurally; elements that are not objects are skipped and a
/// missing or non-string field yields an empty candidate.
pub struct JsonFileSource {
  path:  PathBuf,
  field: String,
}

impl JsonFileSource {
  pub fn new(path: impl Into<PathBuf>, field: impl Into<String>) -> Self {
    Self { path: path.into(), field: field.into() }
  }
}

impl Source for JsonFileSource {
  fn tag(&self) -> SourceTag { SourceTag::DocumentStoreFallback }

  async fn fetch(&self) -> Result<Harvest, SourceError> {
    let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
      SourceError::Unavailable(format!("{}: {e}", self.path.display()))
    })?;

    let records: Vec<Value> = serde_json::from_str(&raw)
      .map_err(|e| SourceError::Malformed(format!("{}: {e}", self.path.display())))?;

    let candidates = records
      .iter()
      .filter(|r| r.is_object())
      .map(|r| {
        r.get(&self.field)
          .and_then(Value::as_str)
          .unwrap_or_default()
          .to_owned()
      })
      .collect();

    Ok(Harvest::new(SourceTag::DocumentStoreFallback, candidates))
  }
}

// ─── Chain ───────────────────────────────────────────────────────────────────

/// MongoDB first, the JSON snapshot if it fails or returns nothing.
pub fn chain(config: &EtlConfig) -> Fallback<MongoSource, JsonFileSource> {
  let ds = &config.document_store;
  Fallback::new(
    MongoSource::from_config(config),
    JsonFileSource::new(config.resolve(&ds.fallback_path), ds.field.clone()),
    Duration::from_millis(ds.fetch_timeout_ms),
  )
}
