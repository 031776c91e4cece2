//! Checkout, buy-now and workshop booking flows.
//!
//! No payment is taken. A flow builds the record, saves it for the active
//! session and leaves a [`Confirmation`] in the session scope for the
//! success screen to pick up exactly once.

use std::sync::Arc;

use chrono::{Days, Local, NaiveDate};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  cart::Cart,
  catalog::{Product, Workshop},
  ledger::Ledger,
  record::{DashboardStats, Order, OrderItem, WorkshopBooking},
  session::{Accounts, UserProfile},
  store::{self, CONFIRMATION_KEY, KeyValueStore, Scope},
};

/// Every booking made through the storefront takes the same slot.
pub const STANDARD_SLOT: &str = "Standard Slot";

const DELIVERY_DAYS: u64 = 7;

// ─── Reference ids ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
  /// `ORD-`: checkout from the cart.
  Order,
  /// `BSH-`: single-product buy-now.
  BuyNow,
  /// `BKG-`: workshop booking.
  Booking,
}

impl ReferenceKind {
  fn prefix(self) -> &'static str {
    match self {
      ReferenceKind::Order => "ORD",
      ReferenceKind::BuyNow => "BSH",
      ReferenceKind::Booking => "BKG",
    }
  }

  /// How many trailing digits of the millisecond clock go into the id.
  fn clock_digits(self) -> usize {
    match self {
      ReferenceKind::Order | ReferenceKind::BuyNow => 6,
      ReferenceKind::Booking => 4,
    }
  }
}

/// Build `PREFIX-<clock tail>-<suffix>`. Uniqueness is assumed, not checked.
pub fn format_reference(kind: ReferenceKind, epoch_millis: i64, suffix: u32) -> String {
  let clock = epoch_millis.unsigned_abs().to_string();
  let tail = &clock[clock.len().saturating_sub(kind.clock_digits())..];
  format!("{}-{tail}-{}", kind.prefix(), suffix % 1000)
}

pub fn new_reference(kind: ReferenceKind) -> String {
  format_reference(kind, Local::now().timestamp_millis(), OsRng.next_u32() % 1000)
}

// ─── Display dates ───────────────────────────────────────────────────────────

/// `10/19/2026`
pub fn display_date(date: NaiveDate) -> String { date.format("%-m/%-d/%Y").to_string() }

/// A week after `ordered`, e.g. `Monday, October 26`.
pub fn delivery_estimate(ordered: NaiveDate) -> String {
  let arrives = ordered
    .checked_add_days(Days::new(DELIVERY_DAYS))
    .unwrap_or(ordered);
  arrives.format("%A, %B %-d").to_string()
}

fn today() -> NaiveDate { Local::now().date_naive() }

// ─── Confirmation ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationType {
  CartCheckout,
  BuyNow,
}

/// What the order-success screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
  pub id:                String,
  pub date:              String,
  pub items:             Vec<OrderItem>,
  pub total:             u64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub delivery_date:     Option<String>,
  pub confirmation_type: ConfirmationType,
}

/// Contact and address collected by the buy-now form.
#[derive(Debug, Clone, Default)]
pub struct ShippingDetails {
  pub name:    String,
  pub email:   String,
  pub address: String,
}

impl ShippingDetails {
  fn is_complete(&self) -> bool {
    [&self.name, &self.email, &self.address]
      .iter()
      .all(|field| !field.trim().is_empty())
  }
}

/// The account page: who is signed in and everything they own.
#[derive(Debug, Clone)]
pub struct Dashboard {
  pub user:     UserProfile,
  pub orders:   Vec<Order>,
  pub bookings: Vec<WorkshopBooking>,
  pub stats:    DashboardStats,
}

// ─── Storefront ──────────────────────────────────────────────────────────────

/// The purchase flows, wired to one store.
pub struct Storefront<S> {
  accounts: Accounts<S>,
  ledger:   Ledger<S>,
}

impl<S> Clone for Storefront<S> {
  fn clone(&self) -> Self {
    Self {
      accounts: self.accounts.clone(),
      ledger:   self.ledger.clone(),
    }
  }
}

impl<S: KeyValueStore> Storefront<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self {
      accounts: Accounts::new(Arc::clone(&store)),
      ledger:   Ledger::new(store),
    }
  }

  pub fn accounts(&self) -> &Accounts<S> { &self.accounts }

  pub fn ledger(&self) -> &Ledger<S> { &self.ledger }

  /// The active session, or [`Error::NotSignedIn`].
  pub async fn require_user(&self) -> Result<UserProfile> {
    self.accounts.current_user().await?.ok_or(Error::NotSignedIn)
  }

  async fn place_order(
    &self,
    kind: ReferenceKind,
    items: Vec<OrderItem>,
    total: u64,
    delivery_date: Option<String>,
  ) -> Result<Confirmation> {
    let viewer = self.accounts.current_user().await?;
    let order = Order {
      id: new_reference(kind),
      date: display_date(today()),
      items,
      total,
      user_email: None,
    };
    let order = self.ledger.save_order(viewer.as_ref(), order).await?;

    let confirmation = Confirmation {
      id: order.id,
      date: order.date,
      items: order.items,
      total: order.total,
      delivery_date,
      confirmation_type: match kind {
        ReferenceKind::BuyNow => ConfirmationType::BuyNow,
        _ => ConfirmationType::CartCheckout,
      },
    };
    store::save(
      self.accounts.store().as_ref(),
      Scope::Session,
      CONFIRMATION_KEY,
      &confirmation,
    )
    .await?;
    Ok(confirmation)
  }

  /// Turn the cart into an order and empty it.
  pub async fn checkout_cart(&self, cart: &mut Cart) -> Result<Confirmation> {
    if cart.is_empty() {
      return Err(Error::EmptyCart);
    }
    let confirmation = self
      .place_order(ReferenceKind::Order, cart.order_items(), cart.total(), None)
      .await?;
    cart.clear();
    Ok(confirmation)
  }

  /// Order a single unit of `product` without touching the cart.
  pub async fn buy_now(
    &self,
    product: &Product,
    shipping: &ShippingDetails,
  ) -> Result<Confirmation> {
    if !shipping.is_complete() {
      return Err(Error::IncompleteShipping);
    }
    if !product.in_stock {
      return Err(Error::OutOfStock(product.name.to_owned()));
    }

    let item = OrderItem {
      name:     product.name.to_owned(),
      price:    product.price,
      quantity: 1,
    };
    self
      .place_order(
        ReferenceKind::BuyNow,
        vec![item],
        product.price,
        Some(delivery_estimate(today())),
      )
      .await
  }

  pub async fn book_workshop(&self, workshop: &Workshop) -> Result<WorkshopBooking> {
    let viewer = self.accounts.current_user().await?;
    let booking = WorkshopBooking {
      id:             new_reference(ReferenceKind::Booking),
      date:           workshop.date.to_owned(),
      workshop_title: workshop.title.to_owned(),
      slot:           STANDARD_SLOT.to_owned(),
      price:          workshop.price,
      user_email:     None,
    };
    self.ledger.save_booking(viewer.as_ref(), booking).await
  }

  /// Read and discard the last confirmation.
  pub async fn take_confirmation(&self) -> Result<Option<Confirmation>> {
    let kv = self.accounts.store().as_ref();
    let confirmation = store::load_one(kv, Scope::Session, CONFIRMATION_KEY).await?;
    store::clear(kv, Scope::Session, CONFIRMATION_KEY).await?;
    Ok(confirmation)
  }

  /// Everything the account page shows. Requires a session.
  pub async fn dashboard(&self) -> Result<Dashboard> {
    let user = self.require_user().await?;
    let viewer = Some(&user);
    let orders = self.ledger.orders(viewer).await?;
    let bookings = self.ledger.bookings(viewer).await?;
    let stats = self.ledger.dashboard(viewer).await?;
    Ok(Dashboard {
      user,
      orders,
      bookings,
      stats,
    })
  }
}
