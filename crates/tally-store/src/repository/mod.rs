//! # Repository Module
//!
//! SQLite repositories over the storage schema, one per aggregate:
//!
//! - [`catalog`] - sellable items, plus the [`catalog::CatalogAccess`]
//!   read seam the checkout session consumes
//! - [`customer`] - customers and their loan balances
//! - [`snapshot`] - the durable per-terminal cart snapshot
//! - [`ledger`] - the settlement commit (the one external write)

pub mod catalog;
pub mod customer;
pub mod ledger;
pub mod snapshot;
