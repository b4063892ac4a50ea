//! Core types and trait definitions for the MnémIA ingestion pipeline.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The store backend and the ETL crate depend on it; it depends on nothing
//! proprietary.

// We intentionally use native `async fn` in traits.
#![allow(async_fn_in_trait)]

pub mod dedup;
pub mod error;
pub mod label;
pub mod normalize;
pub mod source;
pub mod store;

pub use error::{Error, Result};
