//! Web scrape of an HTML page, with a local snapshot as fallback.
//!
//! Both branches share [`extract_labels`], so a snapshot yields exactly what
//! the live page would have.

use std::{path::PathBuf, time::Duration};

use mnemia_core::source::SourceTag;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::{
  SourceError,
  fallback::Fallback,
  settings::{EtlConfig, WebConfig},
  sources::{Harvest, Source},
};

// ─── Extraction ──────────────────────────────────────────────────────────────

/// Bounds applied to list-item text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extraction {
  pub min_len:   usize,
  pub max_len:   usize,
  pub max_items: usize,
}

impl From<&WebConfig> for Extraction {
  fn from(cfg: &WebConfig) -> Self {
    Self {
      min_len:   cfg.min_len,
      max_len:   cfg.max_len,
      max_items: cfg.max_items,
    }
  }
}

/// Text of every `<li>` whose trimmed length (in characters) lies within
/// bounds, in document order, capped at `max_items`.
pub fn extract_labels(html: &str, bounds: &Extraction) -> Vec<String> {
  let Ok(items) = Selector::parse("li") else {
    return Vec::new();
  };

  Html::parse_document(html)
    .select(&items)
    .map(|li| li.text().collect::<String>().trim().to_owned())
    .filter(|text| (bounds.min_len..=bounds.max_len).contains(&text.chars().count()))
    .take(bounds.max_items)
    .collect()
}

// ─── Primary: live page ──────────────────────────────────────────────────────

pub struct LivePage {
  client: Client,
  url:    Option<String>,
  bounds: Extraction,
}

impl LivePage {
  pub fn new(url: Option<String>, timeout: Duration, bounds: Extraction) -> Result<Self, SourceError> {
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .map_err(SourceError::unavailable)?;
    Ok(Self { client, url, bounds })
  }
}

impl Source for LivePage {
  fn tag(&self) -> SourceTag { SourceTag::WebScrape }

  async fn fetch(&self) -> Result<Harvest, SourceError> {
    let url = self
      .url
      .as_deref()
      .ok_or_else(|| SourceError::Unavailable("no page URL configured".into()))?;

    let resp = self
      .client
      .get(url)
      .send()
      .await
      .map_err(SourceError::unavailable)?;
    if !resp.status().is_success() {
      return Err(SourceError::Unavailable(format!("HTTP {}", resp.status())));
    }
    let html = resp.text().await.map_err(SourceError::unavailable)?;

    Ok(Harvest::new(SourceTag::WebScrape, extract_labels(&html, &self.bounds)))
  }
}

// ─── Fallback: stored snapshot ───────────────────────────────────────────────

pub struct SnapshotPage {
  path:   PathBuf,
  bounds: Extraction,
}

impl SnapshotPage {
  pub fn new(path: impl Into<PathBuf>, bounds: Extraction) -> Self {
    Self { path: path.into(), bounds }
  }
}

impl Source for SnapshotPage {
  fn tag(&self) -> SourceTag { SourceTag::WebScrape }

  async fn fetch(&self) -> Result<Harvest, SourceError> {
    let html = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
      SourceError::Unavailable(format!("snapshot {}: {e}", self.path.display()))
    })?;
    Ok(Harvest::new(SourceTag::WebScrape, extract_labels(&html, &self.bounds)))
  }
}

// ─── Chain ───────────────────────────────────────────────────────────────────

pub fn chain(config: &EtlConfig) -> Result<Fallback<LivePage, SnapshotPage>, SourceError> {
  let web = &config.web;
  let bounds = Extraction::from(web);
  let timeout = Duration::from_secs(web.timeout_secs);
  Ok(Fallback::new(
    LivePage::new(web.url.clone(), timeout, bounds)?,
    SnapshotPage::new(config.resolve(&web.snapshot_path), bounds),
    timeout,
  ))
}
