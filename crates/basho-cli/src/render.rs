//! Plain-text rendering of catalog, cart and account views.

use std::io::{self, Write};

use basho_assistant::CommissionBrief;
use basho_core::{
  cart::Cart,
  catalog::{Product, Workshop},
  checkout::{Confirmation, Dashboard},
};

pub fn rupees(amount: u64) -> String { format!("₹{amount}") }

pub fn products<'a>(
  out: &mut impl Write,
  products: impl IntoIterator<Item = &'a Product>,
) -> io::Result<()> {
  for p in products {
    let stock = if p.in_stock { "" } else { "  (sold out)" };
    writeln!(out, "{:<4}{:<24}{:<11}{:>8}{stock}", p.id, p.name, p.category, rupees(p.price))?;
  }
  Ok(())
}

pub fn workshops<'a>(
  out: &mut impl Write,
  workshops: impl IntoIterator<Item = &'a Workshop>,
) -> io::Result<()> {
  for w in workshops {
    writeln!(
      out,
      "{:<4}{:<28}{:<26}{:>8}  {} seats",
      w.id,
      w.title,
      w.date,
      rupees(w.price),
      w.slots
    )?;
  }
  Ok(())
}

pub fn cart(out: &mut impl Write, cart: &Cart) -> io::Result<()> {
  if cart.is_empty() {
    return writeln!(out, "Your cart is empty.");
  }
  for line in cart.items() {
    writeln!(
      out,
      "{:<4}{:<24} x{:<3}{:>8}",
      line.product.id,
      line.product.name,
      line.quantity,
      rupees(line.line_total())
    )?;
  }
  writeln!(out, "{} item(s), total {}", cart.item_count(), rupees(cart.total()))
}

pub fn confirmation(out: &mut impl Write, c: &Confirmation) -> io::Result<()> {
  writeln!(out, "Order confirmed: {} on {}", c.id, c.date)?;
  for item in &c.items {
    writeln!(out, "  {} x{}  {}", item.name, item.quantity, rupees(item.price))?;
  }
  writeln!(out, "  Total {}", rupees(c.total))?;
  if let Some(delivery) = &c.delivery_date {
    writeln!(out, "  Estimated delivery: {delivery}")?;
  }
  Ok(())
}

pub fn dashboard(out: &mut impl Write, d: &Dashboard) -> io::Result<()> {
  writeln!(out, "{} <{}>", d.user.name, d.user.email)?;
  writeln!(
    out,
    "{} order(s), {} booking(s), {} spent",
    d.stats.order_count,
    d.stats.booking_count,
    rupees(d.stats.total_spent)
  )?;

  if !d.orders.is_empty() {
    writeln!(out, "\nOrders")?;
    for o in &d.orders {
      let count: u32 = o.items.iter().map(|i| i.quantity).sum();
      writeln!(out, "  {:<16}{:<12}{:>3} item(s){:>10}", o.id, o.date, count, rupees(o.total))?;
    }
  }
  if !d.bookings.is_empty() {
    writeln!(out, "\nWorkshops")?;
    for b in &d.bookings {
      writeln!(
        out,
        "  {:<14}{:<28}{:<26}{:>8}",
        b.id,
        b.workshop_title,
        b.date,
        rupees(b.price)
      )?;
    }
  }
  Ok(())
}

pub fn brief(out: &mut impl Write, brief: &CommissionBrief) -> io::Result<()> {
  writeln!(out, "{}\n", brief.haiku)?;
  writeln!(out, "{}", brief.brief)
}
