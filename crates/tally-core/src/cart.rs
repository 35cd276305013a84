//! # Cart Module
//!
//! The authoritative set of lines for the in-progress sale.
//!
//! ## Mutation semantics
//! Every operation is infallible from the caller's side: inputs are
//! normalized (unparseable discounts become zero, negative results are
//! clamped) and a missing line makes the operation a no-op. A cashier is
//! never shown an error for a cart edit.
//!
//! ## Invariants
//! - Lines are unique by `item_id`; re-adding increments quantity.
//! - `quantity >= 1` for every line present. A quantity that reaches
//!   zero removes the line, so a "ghost line" can always be told apart
//!   from a deliberate delete.
//! - Line order is insertion order. It does not affect totals but must
//!   stay stable for display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::CatalogItem;

// =============================================================================
// Cart Line
// =============================================================================

/// One product entry in the cart.
///
/// The unit price and name are frozen copies taken from the catalog at
/// add-time, so a catalog edit mid-sale never changes an open cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Catalog item this line refers to.
    pub item_id: String,

    /// Item name at add-time (frozen).
    pub name: String,

    /// Unit price in cents at add-time (frozen).
    pub unit_price_cents: i64,

    /// Quantity. Always >= 1 while the line exists.
    pub quantity: i64,

    /// Flat per-unit discount in cents. Clamped to >= 0 on every write.
    pub line_discount_cents: i64,

    /// When this line was first added.
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    fn from_catalog(item: &CatalogItem) -> Self {
        CartLine {
            item_id: item.id.clone(),
            name: item.name.clone(),
            unit_price_cents: item.unit_price_cents,
            quantity: 1,
            line_discount_cents: 0,
            added_at: Utc::now(),
        }
    }

    /// Unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Gross line amount: `unit_price * quantity`.
    pub fn line_gross(&self) -> Money {
        self.unit_price() * self.quantity
    }

    /// Discount carried by this line: `line_discount * quantity`.
    pub fn line_discount_total(&self) -> Money {
        Money::from_cents(self.line_discount_cents) * self.quantity
    }

    /// Net line amount: `(unit_price - line_discount) * quantity`.
    ///
    /// Deliberately NOT clamped: an over-discounted line may show a
    /// negative net on screen. Only the cart-wide total is clamped.
    pub fn line_net(&self) -> Money {
        Money::from_cents(self.unit_price_cents - self.line_discount_cents) * self.quantity
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Ordered collection of cart lines, unique by item id.
///
/// Exclusively owned by one terminal session; there is no concurrent
/// writer. Persistence is the storage layer's concern, the type itself
/// is pure in-memory state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Lines in insertion order.
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds one unit of a catalog item.
    ///
    /// An existing line for the same item has its quantity incremented;
    /// otherwise a new line is appended with quantity 1, the price copied
    /// from the catalog snapshot, and no discount. Always succeeds.
    pub fn add_item(&mut self, item: &CatalogItem) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.item_id == item.id) {
            line.quantity += 1;
            return;
        }

        self.lines.push(CartLine::from_catalog(item));
    }

    /// Removes a line outright, regardless of quantity. No-op if absent.
    pub fn remove_line(&mut self, item_id: &str) {
        self.lines.retain(|l| l.item_id != item_id);
    }

    /// Applies a quantity delta, clamping at zero.
    ///
    /// A result of zero removes the line: zero-quantity lines are never
    /// retained. No-op if the item is not in the cart.
    pub fn change_quantity(&mut self, item_id: &str, delta: i64) {
        let Some(idx) = self.lines.iter().position(|l| l.item_id == item_id) else {
            return;
        };

        let next = (self.lines[idx].quantity + delta).max(0);
        if next == 0 {
            self.lines.remove(idx);
        } else {
            self.lines[idx].quantity = next;
        }
    }

    /// Sets a line's per-unit discount from raw cashier input.
    ///
    /// The value goes through [`Money::parse_or_zero`] and is clamped to
    /// zero from below; invalid input silently becomes "no discount".
    /// No-op if the item is not in the cart.
    pub fn set_line_discount(&mut self, item_id: &str, raw: &str) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.item_id == item_id) {
            line.line_discount_cents = Money::parse_or_zero(raw).clamp_non_negative().cents();
        }
    }

    /// Empties all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Looks up a line by item id.
    pub fn line(&self, item_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.item_id == item_id)
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price_cents: i64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: format!("Item {}", id),
            unit_price_cents: price_cents,
            available_stock: 10,
            discount_hint_cents: None,
            is_active: true,
        }
    }

    #[test]
    fn add_item_twice_yields_one_line_quantity_two() {
        let mut cart = Cart::new();
        let cola = item("1", 250);

        cart.add_item(&cola);
        cart.add_item(&cola);

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.line("1").unwrap().quantity, 2);
    }

    #[test]
    fn add_copies_price_at_add_time() {
        let mut cart = Cart::new();
        let mut cola = item("1", 250);
        cart.add_item(&cola);

        // A catalog price change after the fact does not touch the line
        cola.unit_price_cents = 999;
        cart.add_item(&cola);

        assert_eq!(cart.line("1").unwrap().unit_price_cents, 250);
        assert_eq!(cart.line("1").unwrap().quantity, 2);
    }

    #[test]
    fn decrement_to_zero_removes_the_line() {
        let mut cart = Cart::new();
        cart.add_item(&item("1", 250));
        cart.change_quantity("1", 1); // qty 2

        cart.change_quantity("1", -1);
        assert_eq!(cart.line("1").unwrap().quantity, 1);

        cart.change_quantity("1", -1);
        assert!(cart.line("1").is_none());

        // Further decrements on a removed line stay a no-op
        cart.change_quantity("1", -1);
        assert!(cart.is_empty());
    }

    #[test]
    fn large_negative_delta_clamps_and_removes() {
        let mut cart = Cart::new();
        cart.add_item(&item("1", 250));
        cart.change_quantity("1", 5); // qty 6

        cart.change_quantity("1", -100);
        assert!(cart.line("1").is_none());
    }

    #[test]
    fn remove_line_ignores_quantity() {
        let mut cart = Cart::new();
        cart.add_item(&item("1", 250));
        cart.change_quantity("1", 4);

        cart.remove_line("1");
        assert!(cart.is_empty());

        // Absent id is a no-op
        cart.remove_line("nope");
    }

    #[test]
    fn set_line_discount_parses_and_clamps() {
        let mut cart = Cart::new();
        cart.add_item(&item("1", 1000));

        cart.set_line_discount("1", "1.50");
        assert_eq!(cart.line("1").unwrap().line_discount_cents, 150);

        // Garbage input coerces to zero, not an error
        cart.set_line_discount("1", "not-a-number");
        assert_eq!(cart.line("1").unwrap().line_discount_cents, 0);

        // Negative input clamps to zero
        cart.set_line_discount("1", "-3");
        assert_eq!(cart.line("1").unwrap().line_discount_cents, 0);

        // Absent id is a no-op
        cart.set_line_discount("nope", "5");
    }

    #[test]
    fn line_net_may_go_negative() {
        let mut cart = Cart::new();
        cart.add_item(&item("1", 100));
        cart.set_line_discount("1", "2.00");

        // (100 - 200) * 1 = -100: visible at the line level by design
        assert_eq!(cart.line("1").unwrap().line_net().cents(), -100);
    }

    #[test]
    fn insertion_order_is_stable() {
        let mut cart = Cart::new();
        cart.add_item(&item("b", 100));
        cart.add_item(&item("a", 100));
        cart.add_item(&item("c", 100));
        cart.add_item(&item("a", 100)); // increments, does not reorder

        let ids: Vec<&str> = cart.lines.iter().map(|l| l.item_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn snapshot_json_round_trip() {
        let mut cart = Cart::new();
        cart.add_item(&item("a", 10000));
        cart.change_quantity("a", 1);
        cart.set_line_discount("a", "10");
        cart.add_item(&item("b", 250));

        let payload = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&payload).unwrap();

        assert_eq!(restored.lines, cart.lines);
    }

    #[test]
    fn clear_empties_everything() {
        let mut cart = Cart::new();
        cart.add_item(&item("1", 100));
        cart.add_item(&item("2", 200));

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_quantity(), 0);
    }
}
