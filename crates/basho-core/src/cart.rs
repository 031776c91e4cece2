//! The shopping cart. Lives in memory for one browsing context only.

use crate::{Error, Result, catalog::Product, record::OrderItem};

/// Most units of one product a single cart line may hold.
pub const MAX_QUANTITY: u32 = 99;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
  pub product:  Product,
  pub quantity: u32,
}

impl CartItem {
  pub fn line_total(&self) -> u64 { self.product.price * u64::from(self.quantity) }
}

#[derive(Debug, Clone, Default)]
pub struct Cart {
  items: Vec<CartItem>,
}

impl Cart {
  pub fn new() -> Self { Self::default() }

  pub fn items(&self) -> &[CartItem] { &self.items }

  pub fn is_empty(&self) -> bool { self.items.is_empty() }

  /// Add one unit of `product`, merging with an existing line.
  pub fn add(&mut self, product: &Product) -> Result<()> {
    if !product.in_stock {
      return Err(Error::OutOfStock(product.name.to_owned()));
    }
    match self.items.iter_mut().find(|i| i.product.id == product.id) {
      Some(line) if line.quantity >= MAX_QUANTITY => {
        return Err(Error::QuantityLimit(MAX_QUANTITY));
      }
      Some(line) => line.quantity += 1,
      None => self.items.push(CartItem {
        product:  product.clone(),
        quantity: 1,
      }),
    }
    Ok(())
  }

  /// Remove the line for `product_id`. Returns whether a line was removed.
  pub fn remove(&mut self, product_id: &str) -> bool {
    let before = self.items.len();
    self.items.retain(|i| i.product.id != product_id);
    self.items.len() != before
  }

  /// Set the quantity of an existing line; zero removes it.
  pub fn set_quantity(&mut self, product_id: &str, quantity: u32) -> Result<()> {
    if quantity == 0 {
      self.remove(product_id);
      return Ok(());
    }
    if quantity > MAX_QUANTITY {
      return Err(Error::QuantityLimit(MAX_QUANTITY));
    }
    let line = self
      .items
      .iter_mut()
      .find(|i| i.product.id == product_id)
      .ok_or_else(|| Error::UnknownProduct(product_id.to_owned()))?;
    line.quantity = quantity;
    Ok(())
  }

  pub fn clear(&mut self) { self.items.clear(); }

  pub fn total(&self) -> u64 { self.items.iter().map(CartItem::line_total).sum() }

  /// Number of units across all lines (the badge on the cart icon).
  pub fn item_count(&self) -> u32 { self.items.iter().map(|i| i.quantity).sum() }

  pub fn order_items(&self) -> Vec<OrderItem> {
    self
      .items
      .iter()
      .map(|i| OrderItem {
        name:     i.product.name.to_owned(),
        price:    i.product.price,
        quantity: i.quantity,
      })
      .collect()
  }
}
