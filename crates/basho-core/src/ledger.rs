//! Orders and workshop bookings, scoped to the viewer that owns them.
//!
//! Every operation takes the viewer explicitly. Nothing here reads the active
//! session; callers resolve it first via
//! [`Accounts::current_user`](crate::session::Accounts::current_user).

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
  Error, Result,
  record::{DashboardStats, Order, Owned, WorkshopBooking},
  session::UserProfile,
  store::{self, BOOKINGS_KEY, KeyValueStore, ORDERS_KEY, Scope},
};

pub struct Ledger<S> {
  store: Arc<S>,
}

impl<S> Clone for Ledger<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
    }
  }
}

impl<S: KeyValueStore> Ledger<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Stamp `record` with its owner and prepend it to the list at `key`.
  ///
  /// An owner already on the record wins; otherwise the viewer's email is
  /// used. With neither, the record is stored unowned and no owner-scoped
  /// query will ever return it.
  async fn append<T>(&self, key: &str, viewer: Option<&UserProfile>, mut record: T) -> Result<T>
  where
    T: Owned + Serialize,
  {
    if record.owner().is_none()
      && let Some(viewer) = viewer
    {
      record.set_owner(viewer.email.clone());
    }
    if record.owner().is_none() {
      tracing::warn!(key, "saving record without an owner");
    }

    let mut entries = store::load_raw_list(self.store.as_ref(), Scope::Durable, key).await?;
    entries.insert(0, serde_json::to_value(&record)?);

    self
      .store
      .put(Scope::Durable, key, Value::Array(entries))
      .await
      .map_err(Error::store)?;
    Ok(record)
  }

  async fn visible<T>(&self, key: &str, viewer: Option<&UserProfile>) -> Result<Vec<T>>
  where
    T: Owned + DeserializeOwned,
  {
    let Some(viewer) = viewer else {
      return Ok(Vec::new());
    };
    let all: Vec<T> = store::load_list(self.store.as_ref(), Scope::Durable, key).await?;
    Ok(
      all
        .into_iter()
        .filter(|r| r.owner() == Some(&viewer.email))
        .collect(),
    )
  }

  pub async fn save_order(&self, viewer: Option<&UserProfile>, order: Order) -> Result<Order> {
    let order = self.append(ORDERS_KEY, viewer, order).await?;
    tracing::info!(id = %order.id, total = order.total, "order saved");
    Ok(order)
  }

  /// The viewer's orders, most recent first. Empty when signed out.
  pub async fn orders(&self, viewer: Option<&UserProfile>) -> Result<Vec<Order>> {
    self.visible(ORDERS_KEY, viewer).await
  }

  pub async fn save_booking(
    &self,
    viewer: Option<&UserProfile>,
    booking: WorkshopBooking,
  ) -> Result<WorkshopBooking> {
    let booking = self.append(BOOKINGS_KEY, viewer, booking).await?;
    tracing::info!(id = %booking.id, workshop = %booking.workshop_title, "booking saved");
    Ok(booking)
  }

  /// The viewer's bookings, most recent first. Empty when signed out.
  pub async fn bookings(&self, viewer: Option<&UserProfile>) -> Result<Vec<WorkshopBooking>> {
    self.visible(BOOKINGS_KEY, viewer).await
  }

  /// Counts and total spend, recomputed from storage on every call.
  pub async fn dashboard(&self, viewer: Option<&UserProfile>) -> Result<DashboardStats> {
    let orders = self.orders(viewer).await?;
    let bookings = self.bookings(viewer).await?;

    Ok(DashboardStats {
      order_count:   orders.len(),
      booking_count: bookings.len(),
      total_spent:   orders.iter().map(Owned::amount).sum::<u64>()
        + bookings.iter().map(Owned::amount).sum::<u64>(),
    })
  }
}
