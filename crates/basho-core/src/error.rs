//! Error types for `basho-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid email address: {0:?}")]
  InvalidEmail(String),

  #[error("name must not be empty")]
  EmptyName,

  #[error("unknown product: {0}")]
  UnknownProduct(String),

  #[error("unknown workshop: {0}")]
  UnknownWorkshop(String),

  #[error("{0} is out of stock")]
  OutOfStock(String),

  #[error("at most {0} of one piece fit in a cart")]
  QuantityLimit(u32),

  #[error("the cart is empty")]
  EmptyCart,

  #[error("name, email and shipping address are all required")]
  IncompleteShipping,

  #[error("no active session; log in or sign up first")]
  NotSignedIn,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error from any [`KeyValueStore`](crate::store::KeyValueStore).
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
