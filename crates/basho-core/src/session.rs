//! Accounts and the active session.
//!
//! Registered profiles live in the durable scope as a single list. The active
//! session is one profile in the session scope. There are no passwords:
//! knowing a registered email is enough to log in.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  email::Email,
  store::{self, CURRENT_USER_KEY, KeyValueStore, Scope, USERS_KEY},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
  pub name:  String,
  pub email: Email,
}

/// Outcome of [`Accounts::register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
  /// A new profile was stored and is now the active session.
  Created(UserProfile),
  /// The email is already registered. Nothing was written and the session
  /// is unchanged; the existing profile is returned.
  Duplicate(UserProfile),
}

impl Registration {
  pub fn is_created(&self) -> bool { matches!(self, Self::Created(_)) }

  pub fn profile(&self) -> &UserProfile {
    match self {
      Self::Created(p) | Self::Duplicate(p) => p,
    }
  }
}

/// Registration, login and session lookup over a [`KeyValueStore`].
pub struct Accounts<S> {
  store: Arc<S>,
}

impl<S> Clone for Accounts<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
    }
  }
}

impl<S: KeyValueStore> Accounts<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub fn store(&self) -> &Arc<S> { &self.store }

  async fn all_users(&self) -> Result<Vec<UserProfile>> {
    store::load_list(self.store.as_ref(), Scope::Durable, USERS_KEY).await
  }

  async fn find(&self, email: &Email) -> Result<Option<UserProfile>> {
    Ok(self.all_users().await?.into_iter().find(|u| &u.email == email))
  }

  async fn begin_session(&self, user: &UserProfile) -> Result<()> {
    store::save(self.store.as_ref(), Scope::Session, CURRENT_USER_KEY, user).await
  }

  /// Register a new account and make it the active session.
  ///
  /// An email that is already registered (ignoring case and surrounding
  /// whitespace) is rejected as [`Registration::Duplicate`]. Stored entries
  /// that no longer decode are kept as they are.
  pub async fn register(&self, name: &str, email: &str) -> Result<Registration> {
    let email = Email::parse(email)?;
    let name = name.trim();
    if name.is_empty() {
      return Err(Error::EmptyName);
    }

    let mut entries = store::load_raw_list(self.store.as_ref(), Scope::Durable, USERS_KEY).await?;
    let existing = entries
      .iter()
      .filter_map(|entry| UserProfile::deserialize(entry).ok())
      .find(|u| u.email == email);
    if let Some(existing) = existing {
      tracing::info!(%email, "user already exists");
      return Ok(Registration::Duplicate(existing));
    }

    let user = UserProfile {
      name: name.to_owned(),
      email,
    };
    entries.push(serde_json::to_value(&user)?);
    store::save(self.store.as_ref(), Scope::Durable, USERS_KEY, &entries).await?;
    self.begin_session(&user).await?;

    tracing::info!(email = %user.email, "registered new user");
    Ok(Registration::Created(user))
  }

  /// Log in as the account registered under `email`.
  ///
  /// Returns `None` for an unknown or malformed address and leaves any prior
  /// session untouched.
  pub async fn login(&self, email: &str) -> Result<Option<UserProfile>> {
    let Ok(email) = Email::parse(email) else {
      tracing::warn!(input = email, "login failed: malformed email");
      return Ok(None);
    };

    match self.find(&email).await? {
      Some(user) => {
        self.begin_session(&user).await?;
        tracing::info!(%email, "user logged in");
        Ok(Some(user))
      }
      None => {
        tracing::warn!(%email, "login failed: user not found");
        Ok(None)
      }
    }
  }

  /// The profile of the active session, if any. Malformed session data reads
  /// as no session.
  pub async fn current_user(&self) -> Result<Option<UserProfile>> {
    store::load_one(self.store.as_ref(), Scope::Session, CURRENT_USER_KEY).await
  }

  /// End the active session. Registered accounts are not affected.
  pub async fn logout(&self) -> Result<()> {
    store::clear(self.store.as_ref(), Scope::Session, CURRENT_USER_KEY).await?;
    tracing::info!("user logged out");
    Ok(())
  }

  /// Whether an account exists for `email`. Has no side effects.
  pub async fn user_exists(&self, email: &str) -> Result<bool> {
    match Email::parse(email) {
      Ok(email) => Ok(self.find(&email).await?.is_some()),
      Err(_) => Ok(false),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::memory::MemoryStore;

  fn accounts() -> (MemoryStore, Accounts<MemoryStore>) {
    let store = MemoryStore::new();
    (store.clone(), Accounts::new(Arc::new(store)))
  }

  #[tokio::test]
  async fn register_creates_session_with_normalized_email() {
    let (_, accounts) = accounts();
    let outcome = accounts
      .register("  Matsuo Basho ", " Artisan@Example.com")
      .await
      .unwrap();
    assert!(outcome.is_created());
    assert_eq!(outcome.profile().name, "Matsuo Basho");

    let current = accounts.current_user().await.unwrap().unwrap();
    assert_eq!(current.email.as_str(), "artisan@example.com");
    assert!(accounts.user_exists("ARTISAN@example.com").await.unwrap());
  }

  #[tokio::test]
  async fn duplicate_registration_is_rejected_without_side_effects() {
    let (_, accounts) = accounts();
    accounts.register("First", "potter@example.com").await.unwrap();
    accounts.logout().await.unwrap();

    let outcome = accounts.register("Second", "POTTER@example.com ").await.unwrap();
    assert_eq!(
      outcome,
      Registration::Duplicate(UserProfile {
        name:  "First".into(),
        email: Email::parse("potter@example.com").unwrap(),
      })
    );
    assert!(accounts.current_user().await.unwrap().is_none());
  }

  #[tokio::test]
  async fn register_validates_input() {
    let (_, accounts) = accounts();
    assert!(matches!(
      accounts.register("Name", "not-an-email").await,
      Err(Error::InvalidEmail(_))
    ));
    assert!(matches!(
      accounts.register("   ", "a@b.com").await,
      Err(Error::EmptyName)
    ));
    assert!(!accounts.user_exists("a@b.com").await.unwrap());
  }

  #[tokio::test]
  async fn unknown_login_keeps_prior_session() {
    let (_, accounts) = accounts();
    accounts.register("Basho", "basho@example.com").await.unwrap();

    assert!(accounts.login("unknown@x.com").await.unwrap().is_none());
    let current = accounts.current_user().await.unwrap().unwrap();
    assert_eq!(current.email.as_str(), "basho@example.com");
  }

  #[tokio::test]
  async fn unknown_login_without_session_stays_signed_out() {
    let (_, accounts) = accounts();
    assert!(accounts.login("unknown@x.com").await.unwrap().is_none());
    assert!(accounts.login("garbage").await.unwrap().is_none());
    assert!(accounts.current_user().await.unwrap().is_none());
  }

  #[tokio::test]
  async fn logout_keeps_accounts() {
    let (_, accounts) = accounts();
    accounts.register("Basho", "basho@example.com").await.unwrap();
    accounts.logout().await.unwrap();

    assert!(accounts.current_user().await.unwrap().is_none());
    assert!(accounts.user_exists("basho@example.com").await.unwrap());
    assert!(accounts.login("BASHO@example.com").await.unwrap().is_some());
  }

  #[tokio::test]
  async fn legacy_mixed_case_records_match_on_read() {
    let (store, accounts) = accounts();
    store.put_raw(
      Scope::Durable,
      USERS_KEY,
      r#"[{"name":"Old","email":"Legacy@Example.COM"}]"#,
    );

    let user = accounts.login("legacy@example.com").await.unwrap().unwrap();
    assert_eq!(user.email.as_str(), "legacy@example.com");
  }

  #[tokio::test]
  async fn undecodable_users_survive_registration() {
    let (store, accounts) = accounts();
    store.put_raw(
      Scope::Durable,
      USERS_KEY,
      r#"[{"name":"Legacy","email":"old user@example.com"},{"name":"Ok","email":"ok@example.com"}]"#,
    );

    let outcome = accounts.register("New", "new@example.com").await.unwrap();
    assert!(outcome.is_created());

    let raw = store.get(Scope::Durable, USERS_KEY).await.unwrap().unwrap();
    assert_eq!(raw.as_array().map(Vec::len), Some(3));
    assert_eq!(raw[0]["email"], "old user@example.com");
    assert_eq!(raw[2]["email"], "new@example.com");

    let again = accounts.register("Other", "OK@example.com").await.unwrap();
    assert!(!again.is_created());
    assert_eq!(again.profile().name, "Ok");
  }

  #[tokio::test]
  async fn corrupted_session_reads_as_signed_out() {
    let (store, accounts) = accounts();
    store.put_raw(Scope::Session, CURRENT_USER_KEY, "{oops");
    assert!(accounts.current_user().await.unwrap().is_none());

    store.put_raw(Scope::Session, CURRENT_USER_KEY, r#"{"name":"x"}"#);
    assert!(accounts.current_user().await.unwrap().is_none());
  }

  #[tokio::test]
  async fn session_ends_with_browsing_context() {
    let (store, accounts) = accounts();
    accounts.register("Basho", "basho@example.com").await.unwrap();
    store.end_session();

    assert!(accounts.current_user().await.unwrap().is_none());
    assert!(accounts.user_exists("basho@example.com").await.unwrap());
  }
}
