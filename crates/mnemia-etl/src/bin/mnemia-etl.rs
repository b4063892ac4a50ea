//! mnemia-etl binary.
//!
//! Reads `mnemia.toml` (or the path given with `--config`), opens the
//! canonical SQLite store and runs the selected sources once, in order.
//!
//! ```
//! cargo run -p mnemia-etl -- --source api --source csv
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use mnemia_core::store::CanonicalStore as _;
use mnemia_etl::{EtlConfig, Pipeline, SourceKind, report::FileLog};
use mnemia_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "MnémIA multi-source ingestion")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "mnemia.toml")]
  config: PathBuf,

  /// Source to run; repeat to run several. Defaults to every source.
  #[arg(short, long = "source", value_enum)]
  sources: Vec<SourceKind>,

  /// Override the canonical store location.
  #[arg(long, env = "MNEMIA_STORE")]
  store: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut config = EtlConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;
  if let Some(store) = cli.store {
    config.store_path = store;
  }

  let store_path = expand_tilde(&config.store_path);
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let kinds = if cli.sources.is_empty() {
    SourceKind::ALL.to_vec()
  } else {
    cli.sources
  };

  let log = FileLog::new(expand_tilde(&config.log_path));
  let mut pipeline = Pipeline::new(store, Box::new(log));
  let reports = pipeline.run_all(&config, &kinds).await;

  println!("── runs ──");
  for report in &reports {
    println!("{}", report.summary_line());
  }

  let counts = pipeline
    .store()
    .count_by_source()
    .await
    .context("failed to count inspirations")?;
  println!("── inspirations by source ──");
  for (source, count) in counts {
    println!("{:<24} {count}", source.as_str());
  }

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
