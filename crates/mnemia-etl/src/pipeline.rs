//! Orchestration: run each selected source once, in a fixed order.
//!
//! A run never propagates an error. Whatever goes wrong (a constructor that
//! cannot build its HTTP client, an exhausted fallback chain, a failed
//! transaction) ends up as an aborted [`RunReport`] and a line in the
//! execution log, and the next source still runs.

use mnemia_core::{
  dedup::dedup,
  normalize::normalize_all,
  source::SourceTag,
  store::{CanonicalStore, LoadReport},
};
use tracing::info;

use crate::{
  SourceError,
  report::{ExecutionLog, RunReport, RunReporter},
  settings::EtlConfig,
  sources::{
    Harvest, Source,
    api::ApiFetchSource,
    corpus::{CorpusHarvest, CsvCorpus},
    document,
    mirror::MirrorSource,
    web,
  },
};

// ─── Source selection ────────────────────────────────────────────────────────

/// A runnable source, as selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum SourceKind {
  Api,
  Csv,
  Web,
  Mirror,
  DocumentStore,
}

impl SourceKind {
  /// Every source, in the order a full run visits them.
  pub const ALL: [SourceKind; 5] = [
    SourceKind::Api,
    SourceKind::Csv,
    SourceKind::Web,
    SourceKind::Mirror,
    SourceKind::DocumentStore,
  ];

  /// Tag reported when the source fails before producing a harvest.
  pub fn tag(self) -> SourceTag {
    match self {
      SourceKind::Api => SourceTag::ApiFetch,
      SourceKind::Csv => SourceTag::Csv,
      SourceKind::Web => SourceTag::WebScrape,
      SourceKind::Mirror => SourceTag::RelationalMirror,
      SourceKind::DocumentStore => SourceTag::DocumentStore,
    }
  }
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

pub struct Pipeline<S> {
  store:    S,
  reporter: RunReporter,
}

impl<S: CanonicalStore> Pipeline<S> {
  pub fn new(store: S, log: Box<dyn ExecutionLog>) -> Self {
    Self { store, reporter: RunReporter::new(log) }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn reports(&self) -> &[RunReport] { self.reporter.reports() }

  /// Run `kinds` one after the other. Duplicates are run again.
  pub async fn run_all(&mut self, config: &EtlConfig, kinds: &[SourceKind]) -> Vec<RunReport> {
    let mut reports = Vec::with_capacity(kinds.len());
    for &kind in kinds {
      reports.push(self.run_kind(config, kind).await);
    }
    reports
  }

  /// Build the adapter for `kind` from `config` and run it.
  pub async fn run_kind(&mut self, config: &EtlConfig, kind: SourceKind) -> RunReport {
    info!(source = %kind.tag(), "run starting");
    match kind {
      SourceKind::Api => match ApiFetchSource::new(&config.api) {
        Ok(source) => self.run_source(&source).await,
        Err(e) => self.abort(RunReport::start(kind.tag()), &e),
      },
      SourceKind::Csv => self.run_constraints(&CsvCorpus::from_config(config)).await,
      SourceKind::Web => match web::chain(config) {
        Ok(source) => self.run_source(&source).await,
        Err(e) => self.abort(RunReport::start(kind.tag()), &e),
      },
      SourceKind::Mirror => self.run_source(&MirrorSource::from_config(config)).await,
      SourceKind::DocumentStore => self.run_source(&document::chain(config)).await,
    }
  }

  /// Fetch, normalize, deduplicate and load one inspiration source.
  pub async fn run_source<Src: Source>(&mut self, source: &Src) -> RunReport {
    let report = RunReport::start(source.tag());
    let harvest = match source.fetch().await {
      Ok(harvest) => harvest,
      Err(e) => return self.abort(report, &e),
    };
    self.ingest(report, harvest).await
  }

  /// Refresh the constraint table from the CSV corpus.
  ///
  /// When no file is readable the existing constraints are left untouched.
  pub async fn run_constraints(&mut self, corpus: &CsvCorpus) -> RunReport {
    let mut report = RunReport::start(SourceTag::Csv);
    let harvest: CorpusHarvest = match corpus.fetch().await {
      Ok(harvest) => harvest,
      Err(e) => return self.abort(report, &e),
    };

    for failure in &harvest.failures {
      self.reporter.note(SourceTag::Csv, &format!("file skipped: {failure}"));
    }
    report.error_count += harvest.failures.len();
    report.set_counts(harvest.raw_count(), harvest.kept_count());

    match self.store.replace_constraints(harvest.groups).await {
      Ok(load) => self.apply(&mut report, &load),
      Err(e) => report.abort(format!("store error: {e}")),
    }
    self.reporter.record(report)
  }

  async fn ingest(&mut self, mut report: RunReport, harvest: Harvest) -> RunReport {
    report.source = harvest.source;

    if let Some(reason) = &harvest.fallback_reason {
      self.reporter.note(harvest.source, &format!("fallback used: {reason}"));
    }
    for failure in &harvest.failures {
      self.reporter.note(harvest.source, &format!("partial failure: {failure}"));
    }
    report.error_count += harvest.failures.len();

    let raw_count = harvest.candidates.len();
    let (normalized, _empty) = normalize_all(&harvest.candidates);
    let labels = dedup(normalized);
    report.set_counts(raw_count, labels.len());

    match self.store.load_inspirations(harvest.source, labels).await {
      Ok(load) => self.apply(&mut report, &load),
      Err(e) => report.abort(format!("store error: {e}")),
    }
    self.reporter.record(report)
  }

  fn apply(&self, report: &mut RunReport, load: &LoadReport) {
    for row in &load.errors {
      self
        .reporter
        .note(report.source, &format!("row {:?} rejected: {}", row.label, row.message));
    }
    report.apply_load(load);
  }

  fn abort(&mut self, mut report: RunReport, error: &SourceError) -> RunReport {
    report.abort(error.to_string());
    self.reporter.record(report)
  }
}
