//! Word-association HTTP API (Datamuse-compatible `?ml=<topic>&max=<n>`).

use std::time::Duration;

use mnemia_core::source::SourceTag;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
  SourceError,
  settings::ApiConfig,
  sources::{Harvest, Source},
};

/// One entry of the API's JSON array. Extra fields are ignored.
#[derive(Debug, Deserialize)]
struct WordHit {
  #[serde(default)]
  word: String,
}

/// Fetches related words for each configured topic.
///
/// A failing topic is recorded in [`Harvest::failures`] and the remaining
/// topics still run; only when every topic fails does the fetch itself fail.
#[derive(Clone)]
pub struct ApiFetchSource {
  client:        Client,
  base_url:      String,
  topics:        Vec<String>,
  max_per_topic: usize,
}

impl ApiFetchSource {
  pub fn new(config: &ApiConfig) -> Result<Self, SourceError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(SourceError::unavailable)?;
    Ok(Self {
      client,
      base_url: config.base_url.clone(),
      topics: config.topics.clone(),
      max_per_topic: config.max_per_topic,
    })
  }

  /// `GET <base_url>?ml=<topic>&max=<n>`
  async fn fetch_topic(&self, topic: &str) -> Result<Vec<String>, SourceError> {
    let max = self.max_per_topic.to_string();
    let resp = self
      .client
      .get(&self.base_url)
      .query(&[("ml", topic), ("max", max.as_str())])
      .send()
      .await
      .map_err(SourceError::unavailable)?;

    if !resp.status().is_success() {
      return Err(SourceError::Unavailable(format!("HTTP {}", resp.status())));
    }

    let hits: Vec<WordHit> = resp.json().await.map_err(SourceError::malformed)?;
    Ok(
      hits
        .into_iter()
        .take(self.max_per_topic)
        .map(|hit| hit.word)
        .collect(),
    )
  }
}

impl Source for ApiFetchSource {
  fn tag(&self) -> SourceTag { SourceTag::ApiFetch }

  async fn fetch(&self) -> Result<Harvest, SourceError> {
    let mut harvest = Harvest::new(SourceTag::ApiFetch, Vec::new());

    for topic in &self.topics {
      match self.fetch_topic(topic).await {
        Ok(words) => {
          debug!(topic = %topic, count = words.len(), "topic fetched");
          harvest.candidates.extend(words);
        }
        Err(e) => {
          warn!(topic = %topic, error = %e, "topic fetch failed");
          harvest.failures.push(format!("topic {topic:?}: {e}"));
        }
      }
    }

    if !self.topics.is_empty() && harvest.failures.len() == self.topics.len() {
      return Err(SourceError::Unavailable(format!(
        "all {} topics failed; first: {}",
        self.topics.len(),
        harvest.failures[0]
      )));
    }

    Ok(harvest)
  }
}
