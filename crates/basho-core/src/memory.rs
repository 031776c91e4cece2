//! [`MemoryStore`]: an in-process [`KeyValueStore`].
//!
//! Values are kept as serialised JSON text, the same way a browser keeps
//! them, so a corrupted entry can be planted with [`MemoryStore::put_raw`]
//! and is read back as absent.

use std::{
  collections::HashMap,
  convert::Infallible,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use serde_json::Value;

use crate::store::{KeyValueStore, Scope};

type Entries = HashMap<(Scope, String), String>;

/// Cloning is cheap; clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  entries: Arc<Mutex<Entries>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn entries(&self) -> MutexGuard<'_, Entries> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Store `text` verbatim, bypassing JSON serialisation.
  pub fn put_raw(&self, scope: Scope, key: &str, text: impl Into<String>) {
    self.entries().insert((scope, key.to_owned()), text.into());
  }

  /// Drop every session-scoped entry, as when a browsing context closes.
  pub fn end_session(&self) {
    self.entries().retain(|(scope, _), _| *scope != Scope::Session);
  }
}

impl KeyValueStore for MemoryStore {
  type Error = Infallible;

  async fn get(&self, scope: Scope, key: &str) -> Result<Option<Value>, Infallible> {
    let entries = self.entries();
    let Some(text) = entries.get(&(scope, key.to_owned())) else {
      return Ok(None);
    };
    match serde_json::from_str(text) {
      Ok(value) => Ok(Some(value)),
      Err(err) => {
        tracing::warn!(%scope, key, error = %err, "stored text is not JSON; treating as absent");
        Ok(None)
      }
    }
  }

  async fn put(&self, scope: Scope, key: &str, value: Value) -> Result<(), Infallible> {
    self.entries().insert((scope, key.to_owned()), value.to_string());
    Ok(())
  }

  async fn remove(&self, scope: Scope, key: &str) -> Result<(), Infallible> {
    self.entries().remove(&(scope, key.to_owned()));
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[tokio::test]
  async fn scopes_are_independent() {
    let store = MemoryStore::new();
    store.put(Scope::Durable, "k", json!(1)).await.unwrap();
    store.put(Scope::Session, "k", json!(2)).await.unwrap();

    assert_eq!(store.get(Scope::Durable, "k").await.unwrap(), Some(json!(1)));
    assert_eq!(store.get(Scope::Session, "k").await.unwrap(), Some(json!(2)));
  }

  #[tokio::test]
  async fn corrupted_text_reads_as_absent() {
    let store = MemoryStore::new();
    store.put_raw(Scope::Durable, "k", "{not json");
    assert_eq!(store.get(Scope::Durable, "k").await.unwrap(), None);
  }

  #[tokio::test]
  async fn end_session_keeps_durable_entries() {
    let store = MemoryStore::new();
    store.put(Scope::Durable, "users", json!([])).await.unwrap();
    store.put(Scope::Session, "current", json!({})).await.unwrap();

    store.end_session();

    assert!(store.get(Scope::Durable, "users").await.unwrap().is_some());
    assert!(store.get(Scope::Session, "current").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn removing_missing_key_is_ok() {
    let store = MemoryStore::new();
    store.remove(Scope::Session, "never-set").await.unwrap();
  }
}
