//! Fallback chain controller: a primary source and a deterministic secondary.
//!
//! Selection is all-or-nothing: every candidate comes from the primary, or
//! every candidate comes from the secondary. The two are never run
//! concurrently and their results are never merged.

use std::time::Duration;

use mnemia_core::source::SourceTag;
use tracing::warn;

use crate::{
  SourceError,
  sources::{Harvest, Source},
};

pub struct Fallback<P, S> {
  primary:         P,
  secondary:       S,
  primary_timeout: Duration,
}

impl<P, S> Fallback<P, S> {
  pub fn new(primary: P, secondary: S, primary_timeout: Duration) -> Self {
    Self { primary, secondary, primary_timeout }
  }
}

impl<P: Source, S: Source> Source for Fallback<P, S> {
  /// The primary's tag; the effective tag of a fetch is on its [`Harvest`].
  fn tag(&self) -> SourceTag { self.primary.tag() }

  async fn fetch(&self) -> Result<Harvest, SourceError> {
    let primary_err = match tokio::time::timeout(self.primary_timeout, self.primary.fetch()).await {
      Ok(Ok(harvest)) if !harvest.candidates.is_empty() => return Ok(harvest),
      Ok(Ok(_)) => SourceError::Empty,
      Ok(Err(e)) => e,
      Err(_) => SourceError::Timeout(self.primary_timeout),
    };

    warn!(
      primary = %self.primary.tag(),
      secondary = %self.secondary.tag(),
      reason = %primary_err,
      "primary source abandoned, using fallback"
    );

    match self.secondary.fetch().await {
      Ok(mut harvest) => {
        harvest.fallback_reason = Some(primary_err.to_string());
        Ok(harvest)
      }
      Err(fallback_err) => Err(SourceError::Exhausted {
        primary:  Box::new(primary_err),
        fallback: Box::new(fallback_err),
      }),
    }
  }
}
