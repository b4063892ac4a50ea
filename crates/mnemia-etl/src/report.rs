//! Run reporting: per-run counters and the append-only execution log.

use std::{
  fs::OpenOptions,
  io::Write as _,
  path::{Path, PathBuf},
};

use chrono::{DateTime, Local, Utc};
use mnemia_core::{source::SourceTag, store::LoadReport};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::Result;

// ─── Execution log ───────────────────────────────────────────────────────────

/// Line-oriented, append-only diagnostic log. Never read back by the
/// pipeline.
pub trait ExecutionLog: Send + Sync {
  fn append(&self, line: &str) -> Result<()>;
}

/// Appends `[<local timestamp>] <line>` to a file, creating it on demand.
pub struct FileLog {
  path: PathBuf,
}

impl FileLog {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  pub fn path(&self) -> &Path { &self.path }
}

impl ExecutionLog for FileLog {
  fn append(&self, line: &str) -> Result<()> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
    writeln!(file, "[{}] {line}", Local::now().format("%Y-%m-%dT%H:%M:%S"))?;
    Ok(())
  }
}

// ─── Run report ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
  Completed,
  /// Nothing was written for this run.
  Aborted { reason: String },
}

/// Counters for one run of one source.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
  pub run_id:      Uuid,
  /// Effective provenance: a fallback chain reports the branch that
  /// supplied the data.
  pub source:      SourceTag,
  pub started_at:  DateTime<Utc>,
  /// Candidates delivered by the adapter.
  pub raw_count:   usize,
  /// Candidates left after normalization and in-run dedup.
  pub kept_count:  usize,
  /// `raw_count - kept_count`: empty after normalization, or repeated.
  pub rejected:    usize,
  pub inserted:    usize,
  /// Already present in the store.
  pub ignored:     usize,
  /// Partial fetch failures plus row-level persistence errors.
  pub error_count: usize,
  pub status:      RunStatus,
}

impl RunReport {
  pub fn start(source: SourceTag) -> Self {
    Self {
      run_id:      Uuid::new_v4(),
      source,
      started_at:  Utc::now(),
      raw_count:   0,
      kept_count:  0,
      rejected:    0,
      inserted:    0,
      ignored:     0,
      error_count: 0,
      status:      RunStatus::Completed,
    }
  }

  pub fn set_counts(&mut self, raw_count: usize, kept_count: usize) {
    self.raw_count = raw_count;
    self.kept_count = kept_count;
    self.rejected = raw_count.saturating_sub(kept_count);
  }

  pub fn apply_load(&mut self, load: &LoadReport) {
    self.inserted += load.inserted;
    self.ignored += load.ignored;
    self.error_count += load.errors.len();
  }

  /// Mark the run as having written nothing.
  pub fn abort(&mut self, reason: impl Into<String>) {
    self.inserted = 0;
    self.ignored = 0;
    self.error_count += 1;
    self.status = RunStatus::Aborted { reason: reason.into() };
  }

  pub fn is_completed(&self) -> bool { self.status == RunStatus::Completed }

  /// One-line summary, as written to the execution log.
  pub fn summary_line(&self) -> String {
    match &self.status {
      RunStatus::Completed => format!(
        "{} OK raw={} kept={} inserted={} ignored={} rejected={} errors={}",
        self.source,
        self.raw_count,
        self.kept_count,
        self.inserted,
        self.ignored,
        self.rejected,
        self.error_count,
      ),
      RunStatus::Aborted { reason } => format!("{} ABORTED {reason}", self.source),
    }
  }
}

// ─── Reporter ────────────────────────────────────────────────────────────────

/// Collects the reports of a pipeline invocation and mirrors notable events
/// to the execution log.
pub struct RunReporter {
  log:     Box<dyn ExecutionLog>,
  reports: Vec<RunReport>,
}

impl RunReporter {
  pub fn new(log: Box<dyn ExecutionLog>) -> Self {
    Self { log, reports: Vec::new() }
  }

  /// Log a notable event that is not a run summary (missing file, failed
  /// topic, fallback taken, row error).
  pub fn note(&self, source: SourceTag, message: &str) {
    warn!(source = %source, "{message}");
    self.write(&format!("{source} {message}"));
  }

  /// Store a finished run and log its summary line.
  pub fn record(&mut self, report: RunReport) -> RunReport {
    info!(
      run_id = %report.run_id,
      source = %report.source,
      raw = report.raw_count,
      kept = report.kept_count,
      inserted = report.inserted,
      ignored = report.ignored,
      errors = report.error_count,
      completed = report.is_completed(),
      "run finished"
    );
    self.write(&report.summary_line());
    self.reports.push(report.clone());
    report
  }

  pub fn reports(&self) -> &[RunReport] { &self.reports }

  fn write(&self, line: &str) {
    if let Err(e) = self.log.append(line) {
      warn!(error = %e, "execution log write failed");
    }
  }
}

// ─── Test support ────────────────────────────────────────────────────────────
