//! Core types and services for the Basho pottery storefront.
//!
//! Nothing here talks HTTP or SQL. All
//! persistence goes through the [`store::KeyValueStore`] trait; concrete
//! backends live in their own crates (e.g. `basho-store-sqlite`).

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod email;
pub mod error;
pub mod ledger;
pub mod memory;
pub mod record;
pub mod session;
pub mod store;

pub use error::{Error, Result};
