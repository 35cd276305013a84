//! # tally-store: Storage Layer for Tally POS
//!
//! Persistence and collaborator seams for the checkout engine:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        tally-store                               │
//! │                                                                  │
//! │   ┌──────────────┐   ┌───────────────┐   ┌──────────────────┐    │
//! │   │   Database   │   │ Repositories  │   │  Orchestration   │    │
//! │   │  (pool.rs)   │   │ catalog       │   │  CartStore       │    │
//! │   │              │◄──│ customer      │◄──│  CheckoutSession │    │
//! │   │  SqlitePool  │   │ snapshot      │   │                  │    │
//! │   │  migrations  │   │ ledger        │   │                  │    │
//! │   └──────────────┘   └───────────────┘   └──────────────────┘    │
//! │                                                                  │
//! │   Business rules live in tally-core; this crate only moves       │
//! │   bytes and keeps the cart durable.                              │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`pool`] - connection pool and the `Database` handle
//! - [`migrations`] - embedded schema migrations
//! - [`repository`] - catalog, customer, snapshot and ledger repos
//! - [`store`] - the persisting [`store::CartStore`]
//! - [`session`] - the [`session::CheckoutSession`] orchestrator
//! - [`config`] - terminal configuration
//! - [`error`] - storage error taxonomy

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod session;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::TerminalConfig;
pub use error::{StoreError, StoreResult};
pub use pool::{Database, DbConfig};
pub use session::CheckoutSession;
pub use store::CartStore;

// Repository re-exports for convenience
pub use repository::catalog::{CatalogAccess, CatalogRepository};
pub use repository::customer::CustomerRepository;
pub use repository::ledger::{CommittedSale, SettlementLedger};
pub use repository::snapshot::CartSnapshotRepository;
