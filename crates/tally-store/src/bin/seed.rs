//! # Seed Data Generator
//!
//! Populates the database with catalog items and customers for
//! development.
//!
//! ## Usage
//! ```bash
//! # Default database path (./data/tally.db)
//! cargo run -p tally-store --bin seed
//!
//! # Custom path
//! cargo run -p tally-store --bin seed -- --db /tmp/tally.db
//! ```
//!
//! Customers are seeded with a spread of loan balances so partial-cash
//! and loan checkouts have something to settle against.

use std::env;

use tally_core::{CatalogItem, Customer};
use tally_store::{Database, DbConfig};
use tracing::info;

/// Name pools per category prefix.
const CATALOG: &[(&str, &[&str])] = &[
    (
        "BEV",
        &[
            "Cola 330ml",
            "Orange Juice 1L",
            "Still Water 500ml",
            "Iced Tea 500ml",
            "Energy Drink 250ml",
            "Lemonade 330ml",
        ],
    ),
    (
        "SNK",
        &[
            "Salted Chips",
            "Chocolate Bar",
            "Peanut Pack",
            "Cookies 200g",
            "Gummy Bears",
            "Crackers 150g",
        ],
    ),
    (
        "GRC",
        &[
            "Basmati Rice 1kg",
            "Penne Pasta 500g",
            "Sunflower Oil 1L",
            "Sugar 1kg",
            "Black Tea 100ct",
            "Wheat Flour 2kg",
        ],
    ),
];

const CUSTOMERS: &[(&str, &str, i64)] = &[
    ("cus-0001", "Ayesha Khan", 0),
    ("cus-0002", "Bilal Ahmed", 5000),
    ("cus-0003", "Carmen Diaz", 23000),
    ("cus-0004", "Deng Wei", 1250),
    ("cus-0005", "Elif Demir", 0),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let db_path = parse_db_path().unwrap_or_else(|| "./data/tally.db".to_string());

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    info!(path = %db_path, "seeding database");
    let db = Database::new(DbConfig::new(&db_path)).await?;

    let mut item_count = 0usize;
    for (prefix, names) in CATALOG {
        for (i, name) in names.iter().enumerate() {
            // Deterministic pseudo-variety: price from the name index,
            // every fourth item carries a discount hint
            let unit_price_cents = 99 + ((i as i64 * 37) % 19) * 100;
            let discount_hint_cents = if i % 4 == 3 { Some(25) } else { None };

            let item = CatalogItem {
                id: format!("{}-{:03}", prefix.to_lowercase(), i + 1),
                name: (*name).to_string(),
                unit_price_cents,
                available_stock: 20 + (i as i64 * 7) % 60,
                discount_hint_cents,
                is_active: true,
            };
            db.catalog().upsert(&item).await?;
            item_count += 1;
        }
    }

    for (id, name, loan_balance_cents) in CUSTOMERS {
        db.customers()
            .upsert(&Customer {
                id: (*id).to_string(),
                name: (*name).to_string(),
                loan_balance_cents: *loan_balance_cents,
            })
            .await?;
    }

    info!(
        items = item_count,
        customers = CUSTOMERS.len(),
        "seed complete"
    );

    db.close().await;
    Ok(())
}

/// Pulls `--db <path>` out of the argument list.
fn parse_db_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .cloned()
}
