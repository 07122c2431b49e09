//! The cart aggregate: one user session's quote-in-progress.

use crate::cart::{CartPricing, LinePricing, ProductConfig, QuoteItem};
use crate::catalog::ProductSnapshot;
use crate::error::QuoteError;
use crate::ids::{QuoteItemId, UserId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Who owns a cart.
///
/// Exactly one session owns a cart: a signed-in user (persisted remotely)
/// or an anonymous visitor (persisted to device storage).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartOwner {
    /// Anonymous visitor, keyed by device-local storage.
    Anonymous,
    /// Signed-in user; the server copy is authoritative.
    User(UserId),
}

impl CartOwner {
    /// The owning user ID, if signed in.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            CartOwner::Anonymous => None,
            CartOwner::User(id) => Some(id),
        }
    }
}

/// A cart: the ordered collection of configured line items one session
/// intends to request a quote for.
///
/// Insertion order is significant for display only. Adding the same
/// product twice yields two lines; each line carries its own
/// configuration, so there is no de-duplication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    /// Owning session.
    pub owner: CartOwner,
    /// Line items in insertion order.
    pub items: Vec<QuoteItem>,
    /// Cart currency.
    pub currency: Currency,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Cart {
    /// Create an empty anonymous cart.
    pub fn anonymous() -> Self {
        let now = current_timestamp();
        Self {
            owner: CartOwner::Anonymous,
            items: Vec::new(),
            currency: Currency::SEK,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an empty cart for a signed-in user.
    pub fn for_user(user_id: UserId) -> Self {
        let mut cart = Self::anonymous();
        cart.owner = CartOwner::User(user_id);
        cart
    }

    /// Append a new line item.
    ///
    /// Never merges with an existing line: the same product added twice
    /// with different configs is two line items.
    pub fn add_item(
        &mut self,
        product: ProductSnapshot,
        config: ProductConfig,
    ) -> Result<QuoteItemId, QuoteError> {
        if config.quantity <= 0 {
            return Err(QuoteError::InvalidQuantity(config.quantity));
        }

        let item = QuoteItem::new(product, config);
        let id = item.id.clone();
        self.items.push(item);
        self.updated_at = current_timestamp();
        Ok(id)
    }

    /// Re-insert an already-built line item (rehydration from storage).
    pub fn push_item(&mut self, item: QuoteItem) {
        self.items.push(item);
        self.updated_at = current_timestamp();
    }

    /// Remove the line item with a matching ID.
    ///
    /// Idempotent: removing an ID that is not present is a no-op, not an
    /// error.
    pub fn remove_item(&mut self, id: &QuoteItemId) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| &i.id != id);
        let removed = self.items.len() < len_before;
        if removed {
            self.updated_at = current_timestamp();
        }
        removed
    }

    /// Replace the configuration of a line item wholesale.
    ///
    /// The caller supplies the full new config; there is no field-level
    /// merge. Returns false if the ID is not present.
    pub fn update_item(
        &mut self,
        id: &QuoteItemId,
        config: ProductConfig,
    ) -> Result<bool, QuoteError> {
        if config.quantity <= 0 {
            return Err(QuoteError::InvalidQuantity(config.quantity));
        }

        if let Some(item) = self.items.iter_mut().find(|i| &i.id == id) {
            item.config = config;
            self.updated_at = current_timestamp();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Remove all line items.
    pub fn clear(&mut self) {
        self.items.clear();
        self.updated_at = current_timestamp();
    }

    /// Get an item by ID.
    pub fn get_item(&self, id: &QuoteItemId) -> Option<&QuoteItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Number of line items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total unit count across resolvable lines.
    pub fn item_count(&self) -> i64 {
        self.items
            .iter()
            .filter(|i| i.is_resolved())
            .map(|i| i.config.quantity)
            .sum()
    }

    /// Lines whose product reference failed to resolve.
    ///
    /// These are excluded from totals and should be flagged in the UI
    /// with a remove action.
    pub fn unresolved_items(&self) -> Vec<&QuoteItem> {
        self.items.iter().filter(|i| !i.is_resolved()).collect()
    }

    /// Whether any line failed to resolve.
    pub fn has_unresolved_items(&self) -> bool {
        self.items.iter().any(|i| !i.is_resolved())
    }

    /// Compute the cart total: Σ unit price × quantity over resolvable
    /// lines.
    ///
    /// Unresolved lines never fail the calculation; they are skipped.
    pub fn calculate_total(&self) -> Result<Money, QuoteError> {
        let mut total = Money::zero(self.currency);
        for item in &self.items {
            if !item.is_resolved() {
                continue;
            }
            let line = item.line_total().ok_or(QuoteError::Overflow)?;
            total = total.try_add(&line).ok_or(QuoteError::Overflow)?;
        }
        Ok(total)
    }

    /// Build a full pricing breakdown for display and submission.
    pub fn pricing(&self) -> Result<CartPricing, QuoteError> {
        let mut lines = Vec::new();
        let mut skipped = Vec::new();

        for item in &self.items {
            match (&item.product, item.line_total()) {
                (Some(snapshot), Some(line_total)) => lines.push(LinePricing {
                    item_id: item.id.clone(),
                    unit_price: snapshot.price_per_unit,
                    quantity: item.config.quantity,
                    line_total,
                }),
                (Some(_), None) => return Err(QuoteError::Overflow),
                (None, _) => skipped.push(item.id.clone()),
            }
        }

        let subtotal = Money::try_sum(lines.iter().map(|l| &l.line_total), self.currency)
            .ok_or(QuoteError::Overflow)?;

        Ok(CartPricing {
            subtotal,
            discount_total: Money::zero(self.currency),
            grand_total: subtotal,
            lines,
            skipped,
        })
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;

    fn product(name: &str, cents: i64) -> Product {
        Product::new(name, "spruce", Money::new(cents, Currency::SEK))
            .with_lengths(vec![2400, 3000])
    }

    fn add(cart: &mut Cart, p: &Product, quantity: i64) -> QuoteItemId {
        cart.add_item(p.snapshot(), ProductConfig::for_product(p, 2400, quantity))
            .unwrap()
    }

    #[test]
    fn test_cart_creation() {
        let cart = Cart::anonymous();
        assert!(cart.is_empty());
        assert_eq!(cart.owner, CartOwner::Anonymous);
    }

    #[test]
    fn test_add_same_product_twice_yields_two_lines() {
        let mut cart = Cart::anonymous();
        let p = product("Stud", 1000);

        add(&mut cart, &p, 1);
        add(&mut cart, &p, 2);

        // No de-duplication: two lines, not a merged quantity
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_add_rejects_non_positive_quantity() {
        let mut cart = Cart::anonymous();
        let p = product("Stud", 1000);
        let config = ProductConfig::for_product(&p, 2400, 0);
        assert!(cart.add_item(p.snapshot(), config).is_err());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = Cart::anonymous();
        let p = product("Stud", 1000);
        let id = add(&mut cart, &p, 1);

        assert!(cart.remove_item(&id));
        // Second removal of the same ID is a no-op
        assert!(!cart.remove_item(&id));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_replaces_config_wholesale() {
        let mut cart = Cart::anonymous();
        let p = product("Stud", 1000);
        let id = add(&mut cart, &p, 1);

        let mut new_config = ProductConfig::for_product(&p, 3000, 5);
        new_config.note = Some("cut to fit".to_string());
        assert!(cart.update_item(&id, new_config).unwrap());

        let item = cart.get_item(&id).unwrap();
        assert_eq!(item.config.length_mm, 3000);
        assert_eq!(item.config.quantity, 5);
        assert_eq!(item.config.note.as_deref(), Some("cut to fit"));
    }

    #[test]
    fn test_update_missing_item_returns_false() {
        let mut cart = Cart::anonymous();
        let p = product("Stud", 1000);
        let config = ProductConfig::for_product(&p, 2400, 1);
        assert!(!cart.update_item(&QuoteItemId::new("nope"), config).unwrap());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::anonymous();
        let p = product("Stud", 1000);
        add(&mut cart, &p, 1);
        add(&mut cart, &p, 2);

        cart.clear();
        assert_eq!(cart.len(), 0);
    }

    #[test]
    fn test_total_is_order_independent() {
        let a = product("A", 4599);
        let b = product("B", 2500);

        let mut cart1 = Cart::anonymous();
        add(&mut cart1, &a, 3);
        add(&mut cart1, &b, 2);

        let mut cart2 = Cart::anonymous();
        add(&mut cart2, &b, 2);
        add(&mut cart2, &a, 3);

        let t1 = cart1.calculate_total().unwrap();
        let t2 = cart2.calculate_total().unwrap();
        assert_eq!(t1.amount_cents, t2.amount_cents);
        assert_eq!(t1.amount_cents, 3 * 4599 + 2 * 2500);
    }

    #[test]
    fn test_unresolved_items_excluded_from_total() {
        let mut cart = Cart::anonymous();
        let p = product("Stud", 1000);
        add(&mut cart, &p, 2);
        let orphan_id = add(&mut cart, &p, 5);

        // Simulate a broken product reference
        cart.items
            .iter_mut()
            .find(|i| i.id == orphan_id)
            .unwrap()
            .product = None;

        assert!(cart.has_unresolved_items());
        assert_eq!(cart.unresolved_items().len(), 1);
        // Total only counts the resolvable line, and does not error
        assert_eq!(cart.calculate_total().unwrap().amount_cents, 2000);

        // The flagged line stays removable
        assert!(cart.remove_item(&orphan_id));
        assert!(!cart.has_unresolved_items());
    }

    #[test]
    fn test_pricing_reports_skipped_lines() {
        let mut cart = Cart::anonymous();
        let p = product("Stud", 1000);
        add(&mut cart, &p, 2);
        let orphan_id = add(&mut cart, &p, 1);
        cart.items
            .iter_mut()
            .find(|i| i.id == orphan_id)
            .unwrap()
            .product = None;

        let pricing = cart.pricing().unwrap();
        assert_eq!(pricing.lines.len(), 1);
        assert_eq!(pricing.skipped, vec![orphan_id]);
        assert_eq!(pricing.subtotal.amount_cents, 2000);
        assert_eq!(pricing.grand_total.amount_cents, 2000);
    }
}
