//! SQLite backend for the MnémIA canonical store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! connection thread without blocking the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
