//! End-to-end pipeline runs against an in-memory store, local fixtures and a
//! mock HTTP server.

use std::{fs, path::Path};

use mnemia_core::{source::SourceTag, store::CanonicalStore};
use mnemia_store_sqlite::SqliteStore;
use serde_json::json;
use tempfile::TempDir;
use wiremock::{
  Mock, MockServer, ResponseTemplate,
  matchers::{method, query_param},
};

use crate::{
  EtlConfig, Pipeline, SourceKind,
  report::{RunStatus, memory::MemoryLog},
};

async fn pipeline() -> (Pipeline<SqliteStore>, MemoryLog) {
  let store = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store");
  let log = MemoryLog::default();
  (Pipeline::new(store, Box::new(log.clone())), log)
}

/// Defaults rooted at a fresh data directory, with no remote origin
/// reachable.
fn config(dir: &TempDir) -> EtlConfig {
  let mut config = EtlConfig::default();
  config.data_dir = dir.path().to_path_buf();
  config.web.url = None;
  config
}

fn write(dir: &Path, name: &str, body: &str) {
  fs::write(dir.join(name), body).unwrap();
}

fn mirror_db(dir: &Path, labels: &[&str]) {
  let conn = rusqlite::Connection::open(dir.join("source_ref.db")).unwrap();
  conn
    .execute_batch("CREATE TABLE lexique_artistique (id INTEGER PRIMARY KEY, label TEXT);")
    .unwrap();
  for label in labels {
    conn
      .execute("INSERT INTO lexique_artistique (label) VALUES (?1)", [label])
      .unwrap();
  }
}

const THREE_RECORDS: &str =
  r#"[{"label": "Brume"}, {"label": "Lumière diffuse"}, {"label": "souffle"}]"#;

async fn labels_of(pipeline: &Pipeline<SqliteStore>, source: SourceTag) -> Vec<String> {
  pipeline
    .store()
    .list_inspirations(Some(source))
    .await
    .unwrap()
    .into_iter()
    .map(|e| e.label)
    .collect()
}

// ─── CSV constraints ─────────────────────────────────────────────────────────

#[tokio::test]
async fn csv_variants_collapse_to_two_constraints() {
  let dir = tempfile::tempdir().unwrap();
  write(
    dir.path(),
    "positions_dans_l_espace.csv",
    "label\nà genoux\na genoux\n\"  À   Genoux  \"\nbras\n",
  );
  let (mut p, log) = pipeline().await;

  let report = p.run_kind(&config(&dir), SourceKind::Csv).await;

  assert_eq!(report.status, RunStatus::Completed);
  assert_eq!(report.source, SourceTag::Csv);
  assert_eq!(report.raw_count, 4);
  assert_eq!(report.kept_count, 2);
  assert_eq!(report.inserted, 2);
  // The two other configured files are absent.
  assert_eq!(report.error_count, 2);
  assert!(log.contains("file skipped"));

  let constraints = p
    .store()
    .list_constraints("positions_dans_l_espace")
    .await
    .unwrap();
  let labels: Vec<_> = constraints.into_iter().map(|c| c.label).collect();
  assert_eq!(labels, ["\u{e0} genoux", "bras"]);
}

#[tokio::test]
async fn csv_refresh_replaces_previous_constraints() {
  let dir = tempfile::tempdir().unwrap();
  let cfg = config(&dir);
  let (mut p, _log) = pipeline().await;

  write(dir.path(), "parties_du_corps.csv", "label\nbras\njambe\n");
  p.run_kind(&cfg, SourceKind::Csv).await;

  write(dir.path(), "parties_du_corps.csv", "label\nbras\ntête\n");
  let report = p.run_kind(&cfg, SourceKind::Csv).await;
  assert_eq!(report.inserted, 2);

  let labels: Vec<_> = p
    .store()
    .list_constraints("parties_du_corps")
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.label)
    .collect();
  assert_eq!(labels, ["bras", "tête"]);
}

#[tokio::test]
async fn unreadable_corpus_keeps_existing_constraints() {
  let dir = tempfile::tempdir().unwrap();
  let cfg = config(&dir);
  let (mut p, _log) = pipeline().await;

  write(dir.path(), "parties_du_corps.csv", "label\nbras\n");
  p.run_kind(&cfg, SourceKind::Csv).await;

  fs::remove_file(dir.path().join("parties_du_corps.csv")).unwrap();
  let report = p.run_kind(&cfg, SourceKind::Csv).await;

  assert!(!report.is_completed());
  assert_eq!(p.store().list_constraints("parties_du_corps").await.unwrap().len(), 1);
}

// ─── API ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn api_labels_are_normalized_and_deduplicated_across_topics() {
  let server = MockServer::start().await;
  for topic in ["mist", "light"] {
    Mock::given(method("GET"))
      .and(query_param("ml", topic))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "word": "Tres Rapide" }])))
      .mount(&server)
      .await;
  }

  let dir = tempfile::tempdir().unwrap();
  let mut cfg = config(&dir);
  cfg.api.base_url = format!("{}/words", server.uri());
  cfg.api.topics = vec!["mist".into(), "light".into()];
  let (mut p, _log) = pipeline().await;

  let report = p.run_kind(&cfg, SourceKind::Api).await;

  assert_eq!(report.raw_count, 2);
  assert_eq!(report.kept_count, 1);
  assert_eq!(report.rejected, 1);
  assert_eq!(report.inserted, 1);
  assert_eq!(labels_of(&p, SourceTag::ApiFetch).await, ["tr\u{e8}s rapide"]);
}

#[tokio::test]
async fn partial_api_failure_is_counted_not_fatal() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(query_param("ml", "mist"))
    .respond_with(ResponseTemplate::new(500))
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(query_param("ml", "breath"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "word": "exhale" }])))
    .mount(&server)
    .await;

  let dir = tempfile::tempdir().unwrap();
  let mut cfg = config(&dir);
  cfg.api.base_url = server.uri();
  cfg.api.topics = vec!["mist".into(), "breath".into()];
  let (mut p, log) = pipeline().await;

  let report = p.run_kind(&cfg, SourceKind::Api).await;

  assert!(report.is_completed());
  assert_eq!(report.inserted, 1);
  assert_eq!(report.error_count, 1);
  assert!(log.contains("partial failure"));
}

// ─── Document store ──────────────────────────────────────────────────────────

#[tokio::test]
async fn unreachable_document_store_falls_back_to_file() {
  let dir = tempfile::tempdir().unwrap();
  write(dir.path(), "mongo_sample.json", THREE_RECORDS);
  let (mut p, log) = pipeline().await;

  let report = p.run_kind(&config(&dir), SourceKind::DocumentStore).await;

  assert!(report.is_completed());
  assert_eq!(report.source, SourceTag::DocumentStoreFallback);
  assert_eq!(report.inserted, 3);
  assert!(log.contains("fallback used"));
  assert_eq!(
    p.store().count_by_source().await.unwrap(),
    [(SourceTag::DocumentStoreFallback, 3)]
  );
}

#[tokio::test]
async fn reloading_the_same_source_only_ignores() {
  let dir = tempfile::tempdir().unwrap();
  write(dir.path(), "mongo_sample.json", THREE_RECORDS);
  let cfg = config(&dir);
  let (mut p, _log) = pipeline().await;

  p.run_kind(&cfg, SourceKind::DocumentStore).await;
  let again = p.run_kind(&cfg, SourceKind::DocumentStore).await;

  assert_eq!(again.inserted, 0);
  assert_eq!(again.ignored, 3);
  assert_eq!(p.store().list_inspirations(None).await.unwrap().len(), 3);
}

// ─── Web ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn web_without_network_or_snapshot_aborts_cleanly() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .respond_with(ResponseTemplate::new(503))
    .mount(&server)
    .await;

  let dir = tempfile::tempdir().unwrap();
  let mut cfg = config(&dir);
  cfg.web.url = Some(server.uri());
  let (mut p, log) = pipeline().await;

  let report = p.run_kind(&cfg, SourceKind::Web).await;

  assert!(matches!(report.status, RunStatus::Aborted { .. }));
  assert_eq!(report.inserted, 0);
  assert!(log.contains("no network and no fallback"));
  assert!(p.store().list_inspirations(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn web_snapshot_is_used_when_no_url_is_configured() {
  let dir = tempfile::tempdir().unwrap();
  write(
    dir.path(),
    "web_cnd_sample.html",
    "<ul><li>Danse contemporaine</li><li>Chorégraphie</li></ul>",
  );
  let (mut p, _log) = pipeline().await;

  let report = p.run_kind(&config(&dir), SourceKind::Web).await;

  assert_eq!(report.source, SourceTag::WebScrape);
  assert_eq!(report.inserted, 2);
  assert_eq!(
    labels_of(&p, SourceTag::WebScrape).await,
    ["danse contemporaine", "chor\u{e9}graphie"]
  );
}

// ─── Mirror and orchestration ────────────────────────────────────────────────

#[tokio::test]
async fn missing_mirror_is_a_hard_failure() {
  let dir = tempfile::tempdir().unwrap();
  let (mut p, log) = pipeline().await;

  let report = p.run_kind(&config(&dir), SourceKind::Mirror).await;

  assert_eq!(report.source, SourceTag::RelationalMirror);
  let RunStatus::Aborted { reason } = &report.status else {
    panic!("mirror run should abort");
  };
  assert!(reason.contains("source_ref.db"));
  assert!(log.contains("relational-mirror ABORTED"));
}

#[tokio::test]
async fn a_failing_source_does_not_block_the_others() {
  let dir = tempfile::tempdir().unwrap();
  mirror_db(dir.path(), &["Élan", "  ", "brume"]);
  write(dir.path(), "mongo_sample.json", THREE_RECORDS);
  let (mut p, _log) = pipeline().await;

  let reports = p
    .run_all(
      &config(&dir),
      &[SourceKind::Web, SourceKind::Mirror, SourceKind::DocumentStore],
    )
    .await;

  let completed: Vec<_> = reports.iter().map(|r| r.is_completed()).collect();
  assert_eq!(completed, [false, true, true]);
  assert_eq!(p.reports().len(), 3);

  // Blank cell rejected; "brume" is claimed by the mirror first.
  assert_eq!(reports[1].inserted, 2);
  assert_eq!(reports[1].rejected, 1);
  assert_eq!(reports[2].inserted, 2);
  assert_eq!(reports[2].ignored, 1);

  let brume = p
    .store()
    .list_inspirations(None)
    .await
    .unwrap()
    .into_iter()
    .find(|e| e.label == "brume")
    .unwrap();
  assert_eq!(brume.source, SourceTag::RelationalMirror);
}

#[test]
fn full_run_visits_sources_in_order() {
  assert_eq!(
    SourceKind::ALL.map(SourceKind::tag),
    [
      SourceTag::ApiFetch,
      SourceTag::Csv,
      SourceTag::WebScrape,
      SourceTag::RelationalMirror,
      SourceTag::DocumentStore,
    ]
  );
}
