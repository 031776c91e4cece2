//! The `KeyValueStore` trait and typed, fail-soft access helpers.
//!
//! The trait is implemented by storage backends (e.g. `basho-store-sqlite`,
//! or [`MemoryStore`](crate::memory::MemoryStore) for tests). The account and
//! ledger services depend on this abstraction, not on any concrete backend.
//!
//! Values are JSON. A stored value that cannot be read back as JSON, or whose
//! shape does not match the expected type, is treated as absent: reads never
//! fail because of bad data, only because of a broken backend.

use std::{fmt, future::Future};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{Error, Result};

// ─── Keys ────────────────────────────────────────────────────────────────────

/// Durable: JSON array of `UserProfile`.
pub const USERS_KEY: &str = "basho_users";
/// Durable: JSON array of `Order`, most recent first.
pub const ORDERS_KEY: &str = "basho_orders";
/// Durable: JSON array of `WorkshopBooking`, most recent first.
pub const BOOKINGS_KEY: &str = "basho_bookings";
/// Session: the active `UserProfile`.
pub const CURRENT_USER_KEY: &str = "basho_current_user";
/// Session: the last checkout `Confirmation`, read once by the success page.
pub const CONFIRMATION_KEY: &str = "last_confirmed_order_details";

// ─── Scope ───────────────────────────────────────────────────────────────────

/// Which lifetime a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
  /// Survives restarts.
  Durable,
  /// Cleared when the browsing context (the running shell) ends.
  Session,
}

impl Scope {
  pub fn as_str(self) -> &'static str {
    match self {
      Scope::Durable => "durable",
      Scope::Session => "session",
    }
  }
}

impl fmt::Display for Scope {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a two-scope key-value store.
///
/// There are no transactions and no locking. Two processes sharing the same
/// durable store can race (e.g. both registering one email); the last write
/// wins.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait KeyValueStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the value at `key`. Returns `None` when the key is missing or the
  /// stored text is not valid JSON.
  fn get<'a>(
    &'a self,
    scope: Scope,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send + 'a;

  /// Write `value` at `key`, replacing whatever was there.
  fn put<'a>(
    &'a self,
    scope: Scope,
    key: &'a str,
    value: Value,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete `key`. Removing a missing key is not an error.
  fn remove<'a>(
    &'a self,
    scope: Scope,
    key: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── Typed helpers ───────────────────────────────────────────────────────────

/// Load a JSON array, skipping entries that do not decode as `T`.
///
/// A missing key or a non-array value yields an empty list.
pub async fn load_list<S, T>(store: &S, scope: Scope, key: &str) -> Result<Vec<T>>
where
  S: KeyValueStore + ?Sized,
  T: DeserializeOwned,
{
  let Some(value) = store.get(scope, key).await.map_err(Error::store)? else {
    return Ok(Vec::new());
  };

  let Value::Array(entries) = value else {
    tracing::warn!(%scope, key, "stored value is not a list; treating as empty");
    return Ok(Vec::new());
  };

  let decoded = entries
    .into_iter()
    .filter_map(|entry| match serde_json::from_value(entry) {
      Ok(item) => Some(item),
      Err(err) => {
        tracing::warn!(%scope, key, error = %err, "skipping malformed entry");
        None
      }
    })
    .collect();
  Ok(decoded)
}

/// Load a JSON array without decoding its entries.
///
/// Used by appends, so entries that no longer decode are written back
/// untouched. A missing key or a non-array value yields an empty list.
pub async fn load_raw_list<S>(store: &S, scope: Scope, key: &str) -> Result<Vec<Value>>
where
  S: KeyValueStore + ?Sized,
{
  match store.get(scope, key).await.map_err(Error::store)? {
    Some(Value::Array(entries)) => Ok(entries),
    Some(_) => {
      tracing::warn!(%scope, key, "stored value is not a list; starting a new one");
      Ok(Vec::new())
    }
    None => Ok(Vec::new()),
  }
}

/// Load a single JSON value; a value that does not decode as `T` is absent.
pub async fn load_one<S, T>(store: &S, scope: Scope, key: &str) -> Result<Option<T>>
where
  S: KeyValueStore + ?Sized,
  T: DeserializeOwned,
{
  let Some(value) = store.get(scope, key).await.map_err(Error::store)? else {
    return Ok(None);
  };

  match serde_json::from_value(value) {
    Ok(item) => Ok(Some(item)),
    Err(err) => {
      tracing::warn!(%scope, key, error = %err, "malformed value; treating as absent");
      Ok(None)
    }
  }
}

/// Serialise `value` and write it at `key`.
pub async fn save<S, T>(store: &S, scope: Scope, key: &str, value: &T) -> Result<()>
where
  S: KeyValueStore + ?Sized,
  T: Serialize + ?Sized,
{
  let json = serde_json::to_value(value)?;
  store.put(scope, key, json).await.map_err(Error::store)
}

/// Delete `key` from `scope`.
pub async fn clear<S>(store: &S, scope: Scope, key: &str) -> Result<()>
where
  S: KeyValueStore + ?Sized,
{
  store.remove(scope, key).await.map_err(Error::store)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::memory::MemoryStore;

  #[tokio::test]
  async fn missing_list_is_empty() {
    let store = MemoryStore::new();
    let list: Vec<u32> = load_list(&store, Scope::Durable, "nothing").await.unwrap();
    assert!(list.is_empty());
  }

  #[tokio::test]
  async fn non_array_list_is_empty() {
    let store = MemoryStore::new();
    store.put(Scope::Durable, "k", json!({"not": "a list"})).await.unwrap();
    let list: Vec<u32> = load_list(&store, Scope::Durable, "k").await.unwrap();
    assert!(list.is_empty());
  }

  #[tokio::test]
  async fn malformed_entries_are_skipped() {
    let store = MemoryStore::new();
    store.put(Scope::Durable, "k", json!([1, "two", 3])).await.unwrap();
    let list: Vec<u32> = load_list(&store, Scope::Durable, "k").await.unwrap();
    assert_eq!(list, vec![1, 3]);
  }

  #[tokio::test]
  async fn raw_list_keeps_undecodable_entries() {
    let store = MemoryStore::new();
    store.put(Scope::Durable, "k", json!([1, "two"])).await.unwrap();
    let raw = load_raw_list(&store, Scope::Durable, "k").await.unwrap();
    assert_eq!(raw, vec![json!(1), json!("two")]);

    store.put(Scope::Durable, "k", json!({"not": "a list"})).await.unwrap();
    assert!(load_raw_list(&store, Scope::Durable, "k").await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn mismatched_single_value_is_absent() {
    let store = MemoryStore::new();
    store.put(Scope::Session, "k", json!("text")).await.unwrap();
    let one: Option<u32> = load_one(&store, Scope::Session, "k").await.unwrap();
    assert!(one.is_none());
  }

  #[tokio::test]
  async fn save_then_clear() {
    let store = MemoryStore::new();
    save(&store, Scope::Session, "k", &42u32).await.unwrap();
    assert_eq!(load_one::<_, u32>(&store, Scope::Session, "k").await.unwrap(), Some(42));

    clear(&store, Scope::Session, "k").await.unwrap();
    assert_eq!(load_one::<_, u32>(&store, Scope::Session, "k").await.unwrap(), None);
  }
}
