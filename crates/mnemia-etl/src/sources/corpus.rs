//! CSV corpus — one file per constraint category.
//!
//! Unlike the inspiration sources, this adapter cleans its own output: each
//! file's labels are normalized, emptied labels dropped and in-file repeats
//! removed before the batch reaches the store. A missing file, or one
//! without the label column, is skipped without affecting the others.

use std::path::{Path, PathBuf};

use mnemia_core::{dedup::dedup, label::CategoryLabels, normalize::normalize};
use tracing::{debug, warn};

use crate::{SourceError, settings::EtlConfig};

/// A configured file, resolved against the data directory.
#[derive(Debug, Clone)]
pub struct CorpusFile {
  pub path:     PathBuf,
  pub category: String,
}

/// Result of reading the whole corpus.
#[derive(Debug, Clone, Default)]
pub struct CorpusHarvest {
  /// One entry per readable file, in configuration order.
  pub groups:   Vec<CategoryLabels>,
  /// Files that were skipped, with the reason.
  pub failures: Vec<String>,
}

impl CorpusHarvest {
  pub fn raw_count(&self) -> usize { self.groups.iter().map(|g| g.raw_count).sum() }

  pub fn kept_count(&self) -> usize { self.groups.iter().map(|g| g.labels.len()).sum() }
}

pub struct CsvCorpus {
  files:        Vec<CorpusFile>,
  label_column: String,
}

impl CsvCorpus {
  pub fn new(files: Vec<CorpusFile>, label_column: impl Into<String>) -> Self {
    Self { files, label_column: label_column.into() }
  }

  pub fn from_config(config: &EtlConfig) -> Self {
    let files = config
      .csv
      .files
      .iter()
      .map(|f| CorpusFile {
        path:     config.resolve(&f.file),
        category: f.category.clone(),
      })
      .collect();
    Self::new(files, config.csv.label_column.clone())
  }

  /// Read every file. Fails only when no file at all could be read, so that
  /// a run with nothing to load never clears the existing constraints.
  pub async fn fetch(&self) -> Result<CorpusHarvest, SourceError> {
    let mut harvest = CorpusHarvest::default();

    for file in &self.files {
      match read_labels(&file.path, &self.label_column).await {
        Ok(raw) => {
          let raw_count = raw.len();
          let cleaned = clean(&raw);
          for (from, to) in &cleaned.corrections {
            debug!(category = %file.category, raw = %from, clean = %to, "label corrected");
          }
          let before_dedup = cleaned.labels.len();
          let labels = dedup(cleaned.labels);
          debug!(
            file = %file.path.display(),
            raw = raw_count,
            empty = cleaned.empty,
            duplicates = before_dedup - labels.len(),
            "csv file cleaned"
          );
          harvest.groups.push(CategoryLabels {
            category: file.category.clone(),
            labels,
            raw_count,
          });
        }
        Err(e) => {
          warn!(file = %file.path.display(), error = %e, "csv file skipped");
          harvest.failures.push(format!("{}: {e}", file.path.display()));
        }
      }
    }

    if harvest.groups.is_empty() {
      return Err(SourceError::Unavailable(format!(
        "no readable CSV file among {} configured",
        self.files.len()
      )));
    }

    Ok(harvest)
  }
}

/// One file's cells after normalization.
#[derive(Debug, Default, PartialEq, Eq)]
struct Cleaned {
  /// Non-empty labels, in row order, repeats included.
  labels:      Vec<String>,
  empty:       usize,
  /// `(raw, clean)` for every non-empty cell that normalization changed.
  corrections: Vec<(String, String)>,
}

fn clean(raw: &[String]) -> Cleaned {
  let mut cleaned = Cleaned::default();
  for cell in raw {
    let label = normalize(cell);
    if label.is_empty() {
      cleaned.empty += 1;
      continue;
    }
    if label != *cell {
      cleaned.corrections.push((cell.clone(), label.clone()));
    }
    cleaned.labels.push(label);
  }
  cleaned
}

/// Read the `column` cells of one CSV file, in row order.
async fn read_labels(path: &Path, column: &str) -> Result<Vec<String>, SourceError> {
  let bytes = tokio::fs::read(path).await.map_err(|e| {
    if e.kind() == std::io::ErrorKind::NotFound {
      SourceError::Unavailable("file not found".to_string())
    } else {
      SourceError::unavailable(e)
    }
  })?;

  let mut reader = csv::ReaderBuilder::new()
    .flexible(true)
    .from_reader(bytes.as_slice());

  let index = reader
    .headers()
    .map_err(SourceError::malformed)?
    .iter()
    .position(|h| h.trim() == column)
    .ok_or_else(|| SourceError::Malformed(format!("no {column:?} column")))?;

  reader
    .records()
    .map(|record| -> Result<String, SourceError> {
      let record = record.map_err(SourceError::malformed)?;
      Ok(record.get(index).unwrap_or_default().to_owned())
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use std::fs;

  use super::*;

  fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
  }

  fn corpus(files: Vec<(PathBuf, &str)>) -> CsvCorpus {
    CsvCorpus::new(
      files
        .into_iter()
        .map(|(path, category)| CorpusFile { path, category: category.to_owned() })
        .collect(),
      "label",
    )
  }

  #[tokio::test]
  async fn cleans_and_dedups_within_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
      dir.path(),
      "positions.csv",
      "id,label\n1,à genoux\n2,a genoux\n3,\"  À   Genoux  \"\n4,bras\n5,\n",
    );

    let harvest = corpus(vec![(path, "positions")]).fetch().await.unwrap();

    assert_eq!(harvest.groups.len(), 1);
    assert_eq!(harvest.groups[0].labels, ["\u{e0} genoux", "bras"]);
    assert_eq!(harvest.raw_count(), 5);
    assert_eq!(harvest.kept_count(), 2);
  }

  #[tokio::test]
  async fn missing_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let ok = write(dir.path(), "corps.csv", "label\nbras\njambe\n");

    let harvest = corpus(vec![
      (dir.path().join("absent.csv"), "positions"),
      (ok, "corps"),
    ])
    .fetch()
    .await
    .unwrap();

    assert_eq!(harvest.groups.len(), 1);
    assert_eq!(harvest.groups[0].category, "corps");
    assert_eq!(harvest.failures.len(), 1);
    assert!(harvest.failures[0].contains("absent.csv"));
  }

  #[tokio::test]
  async fn file_without_label_column_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let bad = write(dir.path(), "vitesses.csv", "name\ntres lent\n");
    let ok = write(dir.path(), "corps.csv", "label\nbras\n");

    let harvest = corpus(vec![(bad, "vitesses"), (ok, "corps")])
      .fetch()
      .await
      .unwrap();

    assert_eq!(harvest.groups.len(), 1);
    assert!(harvest.failures[0].contains("malformed"));
  }

  #[tokio::test]
  async fn nothing_readable_fails_the_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let err = corpus(vec![(dir.path().join("absent.csv"), "positions")])
      .fetch()
      .await
      .unwrap_err();
    assert!(matches!(err, SourceError::Unavailable(_)));
  }

  #[tokio::test]
  async fn same_label_in_two_files_is_kept_in_both() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.csv", "label\nhaut\n");
    let b = write(dir.path(), "b.csv", "label\nHaut\n");

    let harvest = corpus(vec![(a, "positions"), (b, "corps")])
      .fetch()
      .await
      .unwrap();
    assert_eq!(harvest.kept_count(), 2);
  }

  #[test]
  fn clean_records_each_rewritten_cell() {
    let raw: Vec<String> = ["bras", "a genoux", "  ", "Tres Lent", "bras"]
      .map(String::from)
      .to_vec();

    let cleaned = clean(&raw);

    assert_eq!(cleaned.labels, ["bras", "\u{e0} genoux", "tr\u{e8}s lent", "bras"]);
    assert_eq!(cleaned.empty, 1);
    assert_eq!(
      cleaned.corrections,
      [
        ("a genoux".to_owned(), "\u{e0} genoux".to_owned()),
        ("Tres Lent".to_owned(), "tr\u{e8}s lent".to_owned()),
      ]
    );
  }
}
