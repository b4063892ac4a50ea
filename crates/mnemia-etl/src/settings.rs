//! Runtime configuration, deserialised from `mnemia.toml` and `MNEMIA_*`
//! environment variables.
//!
//! Every field has a default, so a missing file or section still yields a
//! usable configuration. Remote origins that are left unset (the document
//! store URI, the scrape URL) make their adapter fail fast and fall back.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

// ─── Top level ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
  /// Canonical SQLite store.
  pub store_path:     PathBuf,
  /// Append-only execution log.
  pub log_path:       PathBuf,
  /// Base directory for every relative input path below.
  pub data_dir:       PathBuf,
  pub api:            ApiConfig,
  pub csv:            CsvConfig,
  pub document_store: DocumentStoreConfig,
  pub web:            WebConfig,
  pub mirror:         MirrorConfig,
}

impl Default for EtlConfig {
  fn default() -> Self {
    Self {
      store_path:     PathBuf::from("mnemia.db"),
      log_path:       PathBuf::from("etl/etl_log.txt"),
      data_dir:       PathBuf::from("etl/data"),
      api:            ApiConfig::default(),
      csv:            CsvConfig::default(),
      document_store: DocumentStoreConfig::default(),
      web:            WebConfig::default(),
      mirror:         MirrorConfig::default(),
    }
  }
}

impl EtlConfig {
  /// Read `path` (optional) and overlay `MNEMIA_*` environment variables.
  ///
  /// Nested keys use `__`, e.g. `MNEMIA_DOCUMENT_STORE__URI`; list values
  /// such as `MNEMIA_API__TOPICS` are comma separated.
  pub fn load(path: &Path) -> Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("MNEMIA")
          .prefix_separator("_")
          .separator("__")
          .list_separator(",")
          .with_list_parse_key("api.topics")
          .try_parsing(true),
      )
      .build()?;

    Ok(settings.try_deserialize()?)
  }

  /// Resolve `path` against [`EtlConfig::data_dir`] unless it is absolute.
  pub fn resolve(&self, path: &Path) -> PathBuf {
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.data_dir.join(path)
    }
  }
}

// ─── Sections ────────────────────────────────────────────────────────────────

/// Word-association HTTP API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  pub base_url:      String,
  /// Seed words; one request is issued per topic.
  pub topics:        Vec<String>,
  pub max_per_topic: usize,
  pub timeout_secs:  u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url:      "https://api.datamuse.com/words".to_string(),
      topics:        ["mist", "light", "silence", "breath"]
        .map(String::from)
        .to_vec(),
      max_per_topic: 10,
      timeout_secs:  10,
    }
  }
}

/// One CSV file and the category its labels belong to.
#[derive(Debug, Clone, Deserialize)]
pub struct CsvFile {
  pub file:     PathBuf,
  pub category: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
  pub label_column: String,
  pub files:        Vec<CsvFile>,
}

impl Default for CsvConfig {
  fn default() -> Self {
    let file = |name: &str| CsvFile {
      file:     PathBuf::from(format!("{name}.csv")),
      category: name.to_string(),
    };
    Self {
      label_column: "label".to_string(),
      files:        vec![
        file("positions_dans_l_espace"),
        file("parties_du_corps"),
        file("vitesses_d_execution"),
      ],
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocumentStoreConfig {
  /// MongoDB connection string. Unset means "go straight to the fallback".
  pub uri:                Option<String>,
  pub database:           String,
  pub collection:         String,
  /// The single projected field holding the label.
  pub field:              String,
  pub limit:              i64,
  /// Server selection and connect timeout.
  pub connect_timeout_ms: u64,
  /// Upper bound for the whole primary attempt.
  pub fetch_timeout_ms:   u64,
  /// JSON array of `{ "<field>": "..." }` records.
  pub fallback_path:      PathBuf,
}

impl Default for DocumentStoreConfig {
  fn default() -> Self {
    Self {
      uri:                None,
      database:           "mnemia".to_string(),
      collection:         "poetic".to_string(),
      field:              "label".to_string(),
      limit:              20,
      connect_timeout_ms: 5_000,
      fetch_timeout_ms:   10_000,
      fallback_path:      PathBuf::from("mongo_sample.json"),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebConfig {
  /// Page to scrape. Unset means "go straight to the snapshot".
  pub url:           Option<String>,
  pub snapshot_path: PathBuf,
  pub timeout_secs:  u64,
  /// Inclusive bounds on the trimmed list-item text, in characters.
  pub min_len:       usize,
  pub max_len:       usize,
  pub max_items:     usize,
}

impl Default for WebConfig {
  fn default() -> Self {
    Self {
      url:           Some("https://www.cnd.fr".to_string()),
      snapshot_path: PathBuf::from("web_cnd_sample.html"),
      timeout_secs:  10,
      min_len:       2,
      max_len:       30,
      max_items:     10,
    }
  }
}

/// Secondary SQLite database mirrored into the inspiration pool.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
  pub path:   PathBuf,
  pub table:  String,
  pub column: String,
}

impl Default for MirrorConfig {
  fn default() -> Self {
    Self {
      path:   PathBuf::from("source_ref.db"),
      table:  "lexique_artistique".to_string(),
      column: "label".to_string(),
    }
  }
}
