//! SQLite backend for the Basho key-value store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Durable entries live in an ordinary
//! table; session entries live in a `TEMP` table, which SQLite drops when the
//! connection closes.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
