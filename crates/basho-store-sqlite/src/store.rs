//! [`SqliteStore`], the SQLite implementation of [`KeyValueStore`].

use std::path::Path;

use basho_core::store::{KeyValueStore, Scope};
use chrono::Utc;
use rusqlite::OptionalExtension as _;
use serde_json::Value;

use crate::{Error, Result, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Basho store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Session
/// entries belong to the connection, so every clone shares one session and
/// the session ends when the last clone is dropped.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

fn table(scope: Scope) -> &'static str {
  match scope {
    Scope::Durable => "durable_entries",
    Scope::Session => "temp.session_entries",
  }
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store; useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Write `text` verbatim, bypassing JSON serialisation.
  pub(crate) async fn put_text(&self, scope: Scope, key: &str, text: String) -> Result<()> {
    let sql = format!(
      "INSERT INTO {} (key, value_json, updated_at) VALUES (?1, ?2, ?3)
       ON CONFLICT(key) DO UPDATE SET
         value_json = excluded.value_json,
         updated_at = excluded.updated_at",
      table(scope)
    );
    let key = key.to_owned();
    let at = Utc::now().to_rfc3339();

    self
      .conn
      .call(move |conn| {
        conn.execute(&sql, rusqlite::params![key, text, at])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_text(&self, scope: Scope, key: &str) -> Result<Option<String>> {
    let sql = format!("SELECT value_json FROM {} WHERE key = ?1", table(scope));
    let key = key.to_owned();

    let text = self
      .conn
      .call(move |conn| {
        let text: Option<String> = conn
          .query_row(&sql, rusqlite::params![key], |r| r.get(0))
          .optional()?;
        Ok(text)
      })
      .await?;
    Ok(text)
  }

  /// Number of keys currently held in `scope`.
  pub async fn count(&self, scope: Scope) -> Result<usize> {
    let sql = format!("SELECT COUNT(*) FROM {}", table(scope));
    let count: i64 = self
      .conn
      .call(move |conn| Ok(conn.query_row(&sql, [], |r| r.get(0))?))
      .await?;
    Ok(usize::try_from(count).unwrap_or_default())
  }
}

// ─── KeyValueStore impl ──────────────────────────────────────────────────────

impl KeyValueStore for SqliteStore {
  type Error = Error;

  async fn get(&self, scope: Scope, key: &str) -> Result<Option<Value>> {
    let Some(text) = self.get_text(scope, key).await? else {
      return Ok(None);
    };
    match serde_json::from_str(&text) {
      Ok(value) => Ok(Some(value)),
      Err(err) => {
        tracing::warn!(%scope, key, error = %err, "stored text is not JSON; treating as absent");
        Ok(None)
      }
    }
  }

  async fn put(&self, scope: Scope, key: &str, value: Value) -> Result<()> {
    let text = serde_json::to_string(&value)?;
    self.put_text(scope, key, text).await
  }

  async fn remove(&self, scope: Scope, key: &str) -> Result<()> {
    let sql = format!("DELETE FROM {} WHERE key = ?1", table(scope));
    let key = key.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(&sql, rusqlite::params![key])?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
