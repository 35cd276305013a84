//! # Pricing Engine
//!
//! Pure, referentially transparent folds from cart lines to monetary
//! totals. No side effects; calling twice on the same cart yields the
//! same figures.
//!
//! ```text
//! lines ──► subtotal = Σ price × qty
//!       ──► discount = Σ line_discount × qty   (flat per-unit, not %)
//!       ──► net      = max(0, subtotal − discount)
//!       ──► tax      = net × flat rate          (zero at default rate)
//!       ──► total    = net + tax
//!
//! total + customer loan balance ──► grand total due at checkout
//! ```

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::money::Money;
use crate::types::{Customer, TaxRate};

// =============================================================================
// Cart Totals
// =============================================================================

/// Monetary summary of a cart, all figures in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Gross amount before discounts: `Σ unit_price × quantity`.
    pub subtotal_cents: i64,

    /// Total discount: `Σ line_discount × quantity`.
    pub discount_cents: i64,

    /// Flat-rate tax on the clamped net amount.
    pub tax_cents: i64,

    /// Amount due for this sale: `max(0, subtotal − discount) + tax`.
    /// Never negative, no matter how deep the line discounts cut.
    pub total_cents: i64,
}

impl CartTotals {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Computation
// =============================================================================

/// Folds the cart's lines into totals.
///
/// The clamp lives here and only here: an individual line may net out
/// negative when its discount exceeds its price, but the cart-wide total
/// bottoms out at zero.
pub fn compute_totals(cart: &Cart, tax_rate: TaxRate) -> CartTotals {
    let subtotal: Money = cart
        .lines
        .iter()
        .fold(Money::zero(), |acc, l| acc + l.line_gross());

    let discount: Money = cart
        .lines
        .iter()
        .fold(Money::zero(), |acc, l| acc + l.line_discount_total());

    let net = (subtotal - discount).clamp_non_negative();
    let tax = net.tax_at(tax_rate);

    CartTotals {
        subtotal_cents: subtotal.cents(),
        discount_cents: discount.cents(),
        tax_cents: tax.cents(),
        total_cents: (net + tax).cents(),
    }
}

/// The amount ultimately due at checkout: the sale total plus the
/// attached customer's pre-existing loan balance.
///
/// Settling a sale and settling the customer's outstanding loan are one
/// combined payment request; with no customer attached the loan part is
/// zero.
pub fn grand_total(totals: &CartTotals, customer: Option<&Customer>) -> Money {
    let loan = customer.map(Customer::loan_balance).unwrap_or_default();
    totals.total() + loan
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CatalogItem;

    fn item(id: &str, price_cents: i64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: format!("Item {}", id),
            unit_price_cents: price_cents,
            available_stock: 100,
            discount_hint_cents: None,
            is_active: true,
        }
    }

    fn customer(loan_cents: i64) -> Customer {
        Customer {
            id: "cus-1".to_string(),
            name: "Walk-in Regular".to_string(),
            loan_balance_cents: loan_cents,
        }
    }

    #[test]
    fn totals_for_discounted_line() {
        // price 100.00, qty 2, per-unit discount 10.00
        let mut cart = Cart::new();
        cart.add_item(&item("1", 10000));
        cart.change_quantity("1", 1);
        cart.set_line_discount("1", "10");

        let totals = compute_totals(&cart, TaxRate::zero());
        assert_eq!(totals.subtotal_cents, 20000);
        assert_eq!(totals.discount_cents, 2000);
        assert_eq!(totals.total_cents, 18000);
    }

    #[test]
    fn grand_total_folds_in_loan_balance() {
        let mut cart = Cart::new();
        cart.add_item(&item("1", 10000));
        cart.change_quantity("1", 1);
        cart.set_line_discount("1", "10");

        let totals = compute_totals(&cart, TaxRate::zero());
        let cust = customer(5000);

        assert_eq!(grand_total(&totals, Some(&cust)).cents(), 23000);
        assert_eq!(grand_total(&totals, None).cents(), 18000);
    }

    #[test]
    fn total_never_negative_even_when_over_discounted() {
        let mut cart = Cart::new();
        cart.add_item(&item("1", 100));
        cart.change_quantity("1", 2); // qty 3
        cart.set_line_discount("1", "5.00"); // 500 > 100 per unit

        let totals = compute_totals(&cart, TaxRate::zero());
        assert_eq!(totals.subtotal_cents, 300);
        assert_eq!(totals.discount_cents, 1500);
        assert_eq!(totals.total_cents, 0);

        // The line itself still reports its negative net
        assert_eq!(cart.line("1").unwrap().line_net().cents(), -1200);
    }

    #[test]
    fn empty_cart_is_all_zeroes() {
        let totals = compute_totals(&Cart::new(), TaxRate::zero());
        assert_eq!(totals.subtotal_cents, 0);
        assert_eq!(totals.discount_cents, 0);
        assert_eq!(totals.total_cents, 0);
    }

    #[test]
    fn flat_tax_applies_to_clamped_net() {
        let mut cart = Cart::new();
        cart.add_item(&item("1", 1000));

        let totals = compute_totals(&cart, TaxRate::from_bps(825));
        assert_eq!(totals.tax_cents, 83);
        assert_eq!(totals.total_cents, 1083);

        // An over-discounted cart taxes nothing
        cart.set_line_discount("1", "99");
        let totals = compute_totals(&cart, TaxRate::from_bps(825));
        assert_eq!(totals.tax_cents, 0);
        assert_eq!(totals.total_cents, 0);
    }

    #[test]
    fn totals_are_repeatable() {
        let mut cart = Cart::new();
        cart.add_item(&item("1", 333));
        cart.add_item(&item("2", 667));
        cart.set_line_discount("2", "0.50");

        let a = compute_totals(&cart, TaxRate::zero());
        let b = compute_totals(&cart, TaxRate::zero());
        assert_eq!(a, b);
    }
}
