//! Provenance tags: which origin (or fallback branch) produced a row.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use crate::{Error, Result};

/// The fixed enumeration of provenance values stored alongside every
/// inspiration entry.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SourceTag {
  ApiFetch,
  Csv,
  DocumentStore,
  DocumentStoreFallback,
  WebScrape,
  RelationalMirror,
}

impl SourceTag {
  /// Every tag, in declaration order.
  pub const ALL: [SourceTag; 6] = [
    Self::ApiFetch,
    Self::Csv,
    Self::DocumentStore,
    Self::DocumentStoreFallback,
    Self::WebScrape,
    Self::RelationalMirror,
  ];

  /// Parse a stored tag, reporting unknown values as [`Error::UnknownSourceTag`].
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownSourceTag(s.to_owned()))
  }

  pub fn as_str(&self) -> &'static str { self.into() }
}
