//! Cart line items and their configuration.

use crate::catalog::{Product, ProductSnapshot};
use crate::error::QuoteError;
use crate::ids::QuoteItemId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Per-line product configuration chosen by the customer.
///
/// This is a value object, not an entity: updating a line replaces the
/// whole config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductConfig {
    /// Chosen length in millimetres.
    pub length_mm: i64,
    /// Material, defaulting from the product but overridable.
    pub material: String,
    /// Planed or rough-sawn.
    pub is_planed: bool,
    /// Quantity. Positive.
    pub quantity: i64,
    /// Optional free-text note for this line.
    pub note: Option<String>,
}

impl ProductConfig {
    /// Build a config with the product's defaults for material and finish.
    pub fn for_product(product: &Product, length_mm: i64, quantity: i64) -> Self {
        Self {
            length_mm,
            material: product.material.clone(),
            is_planed: product.is_planed,
            quantity,
            note: None,
        }
    }

    /// Set a free-text note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Validate the chosen length against a product's offered set.
    ///
    /// The length constraint is enforced at the selection boundary, not by
    /// the cart itself; stored carts may carry lengths a product no longer
    /// offers.
    pub fn validate_for(&self, product: &Product) -> Result<(), QuoteError> {
        if self.quantity <= 0 {
            return Err(QuoteError::InvalidQuantity(self.quantity));
        }
        if !product.offers_length(self.length_mm) {
            return Err(QuoteError::LengthNotOffered {
                product: product.id.as_str().to_string(),
                length_mm: self.length_mm,
            });
        }
        Ok(())
    }
}

/// A line item in the cart.
///
/// The item owns a denormalized product snapshot captured at add time. A
/// missing snapshot means the product reference could not be resolved
/// (e.g., deleted server-side after the line was stored); such lines are
/// excluded from totals and flagged for removal rather than failing
/// anything.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteItem {
    /// Unique line item identifier. Locally generated for anonymous
    /// sessions, server-assigned once persisted.
    pub id: QuoteItemId,
    /// Product snapshot at add time. None when the reference broke.
    pub product: Option<ProductSnapshot>,
    /// The customer's configuration for this line.
    pub config: ProductConfig,
    /// Unix timestamp when the line was added.
    pub added_at: i64,
}

impl QuoteItem {
    /// Create a new line item from a snapshot and configuration.
    pub fn new(product: ProductSnapshot, config: ProductConfig) -> Self {
        Self {
            id: QuoteItemId::generate(),
            product: Some(product),
            config,
            added_at: current_timestamp(),
        }
    }

    /// Whether the product reference resolved.
    pub fn is_resolved(&self) -> bool {
        self.product.is_some()
    }

    /// Line total: unit price at add time times quantity.
    ///
    /// Returns None for unresolved lines or on arithmetic overflow.
    pub fn line_total(&self) -> Option<Money> {
        self.product
            .as_ref()?
            .price_per_unit
            .try_multiply(self.config.quantity)
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
    use crate::money::Currency;

    fn product() -> Product {
        Product::new("Pine decking", "pine", Money::new(2500, Currency::SEK))
            .with_lengths(vec![2400, 3600])
    }

    #[test]
    fn test_config_defaults_from_product() {
        let p = product();
        let config = ProductConfig::for_product(&p, 2400, 2);
        assert_eq!(config.material, "pine");
        assert!(!config.is_planed);
        assert_eq!(config.quantity, 2);
    }

    #[test]
    fn test_config_validation() {
        let p = product();

        let ok = ProductConfig::for_product(&p, 2400, 1);
        assert!(ok.validate_for(&p).is_ok());

        let bad_length = ProductConfig::for_product(&p, 1800, 1);
        assert!(matches!(
            bad_length.validate_for(&p),
            Err(QuoteError::LengthNotOffered { .. })
        ));

        let bad_quantity = ProductConfig::for_product(&p, 2400, 0);
        assert!(matches!(
            bad_quantity.validate_for(&p),
            Err(QuoteError::InvalidQuantity(0))
        ));
    }

    #[test]
    fn test_line_total() {
        let p = product();
        let item = QuoteItem::new(p.snapshot(), ProductConfig::for_product(&p, 2400, 3));
        assert_eq!(item.line_total().unwrap().amount_cents, 7500);
    }

    #[test]
    fn test_unresolved_line_has_no_total() {
        let p = product();
        let mut item = QuoteItem::new(p.snapshot(), ProductConfig::for_product(&p, 2400, 3));
        item.product = None;

        assert!(!item.is_resolved());
        assert!(item.line_total().is_none());
    }
}
