//! Order and booking records: the durable, append-only history.
//!
//! Records are immutable once saved. Field names serialise in camelCase so
//! stored JSON keeps the storefront's established layout (`userEmail`,
//! `workshopTitle`).

use serde::{Deserialize, Serialize};

use crate::email::Email;

/// One line of an order, snapshotted from the cart at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
  pub name:     String,
  /// Unit price in rupees.
  pub price:    u64,
  pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  /// Opaque reference such as `ORD-123456-789`.
  pub id:         String,
  /// Display date; not sortable.
  pub date:       String,
  pub items:      Vec<OrderItem>,
  /// Caller-computed; never re-verified against `items`.
  pub total:      u64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_email: Option<Email>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopBooking {
  pub id:             String,
  pub date:           String,
  pub workshop_title: String,
  pub slot:           String,
  pub price:          u64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_email:     Option<Email>,
}

/// Summary figures for the account dashboard. Always derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
  pub order_count:   usize,
  pub booking_count: usize,
  pub total_spent:   u64,
}

/// A record that can be tagged with the email of the account that owns it.
pub trait Owned {
  fn owner(&self) -> Option<&Email>;
  fn set_owner(&mut self, owner: Email);

  /// The amount this record contributes to [`DashboardStats::total_spent`].
  fn amount(&self) -> u64;
}

impl Owned for Order {
  fn owner(&self) -> Option<&Email> { self.user_email.as_ref() }

  fn set_owner(&mut self, owner: Email) { self.user_email = Some(owner); }

  fn amount(&self) -> u64 { self.total }
}

impl Owned for WorkshopBooking {
  fn owner(&self) -> Option<&Email> { self.user_email.as_ref() }

  fn set_owner(&mut self, owner: Email) { self.user_email = Some(owner); }

  fn amount(&self) -> u64 { self.price }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn order_uses_storefront_field_names() {
    let order = Order {
      id:         "ORD-000001-1".into(),
      date:       "10/19/2026".into(),
      items:      vec![OrderItem { name: "Cloud Teapot".into(), price: 4200, quantity: 1 }],
      total:      4200,
      user_email: Some(Email::parse("potter@example.com").unwrap()),
    };
    let json = serde_json::to_value(&order).unwrap();
    assert_eq!(json["userEmail"], "potter@example.com");
    assert_eq!(json["items"][0]["quantity"], 1);
  }

  #[test]
  fn orphan_booking_omits_owner_and_reads_back() {
    let json = serde_json::json!({
      "id": "BKG-1234-5",
      "date": "Oct 15, 2024 - 10:00 AM",
      "workshopTitle": "Intro to Wheel Throwing",
      "slot": "Standard Slot",
      "price": 2500
    });
    let booking: WorkshopBooking = serde_json::from_value(json).unwrap();
    assert!(booking.owner().is_none());
    assert_eq!(booking.amount(), 2500);
    assert!(serde_json::to_value(&booking).unwrap().get("userEmail").is_none());
  }
}
