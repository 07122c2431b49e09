//! Product types.

use crate::error::QuoteError;
use crate::ids::{CategoryId, ProductId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A timber product in the catalog.
///
/// A product describes one stock-keeping article (e.g., "planed spruce
/// 45x95") offered in a fixed set of lengths. Customers configure length,
/// material and finish per cart line; the product itself carries the
/// defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Full description.
    pub description: Option<String>,
    /// Wood material (e.g., "spruce", "pine", "oak").
    pub material: String,
    /// Offered lengths in millimetres, ascending. Must be non-empty for
    /// a product to be configurable.
    pub lengths_mm: Vec<i64>,
    /// Whether the product is planed (surfaced) rather than rough-sawn.
    pub is_planed: bool,
    /// Price per unit. Never negative.
    pub price_per_unit: Money,
    /// Category this product belongs to.
    pub category_id: Option<CategoryId>,
    /// Units in stock. Never negative.
    pub stock_quantity: i64,
    /// Product image URL (blob storage).
    pub image_url: Option<String>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Product {
    /// Create a new product.
    pub fn new(
        name: impl Into<String>,
        material: impl Into<String>,
        price_per_unit: Money,
    ) -> Self {
        let now = current_timestamp();
        Self {
            id: ProductId::generate(),
            name: name.into(),
            description: None,
            material: material.into(),
            lengths_mm: Vec::new(),
            is_planed: false,
            price_per_unit,
            category_id: None,
            stock_quantity: 0,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the offered lengths.
    pub fn with_lengths(mut self, mut lengths_mm: Vec<i64>) -> Self {
        lengths_mm.sort_unstable();
        self.lengths_mm = lengths_mm;
        self
    }

    /// Set the planed flag.
    pub fn with_planed(mut self, planed: bool) -> Self {
        self.is_planed = planed;
        self
    }

    /// Set the stock quantity.
    pub fn with_stock(mut self, quantity: i64) -> Self {
        self.stock_quantity = quantity;
        self
    }

    /// Set the category.
    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Check whether a length is offered for this product.
    pub fn offers_length(&self, length_mm: i64) -> bool {
        self.lengths_mm.contains(&length_mm)
    }

    /// Check whether any offered length falls within an inclusive range.
    pub fn offers_length_in_range(&self, min_mm: Option<i64>, max_mm: Option<i64>) -> bool {
        self.lengths_mm.iter().any(|&len| {
            min_mm.map(|min| len >= min).unwrap_or(true)
                && max_mm.map(|max| len <= max).unwrap_or(true)
        })
    }

    /// Check if the product has stock.
    pub fn is_in_stock(&self) -> bool {
        self.stock_quantity > 0
    }

    /// Validate catalog invariants: at least one positive length, price
    /// and stock never negative.
    pub fn validate(&self) -> Result<(), QuoteError> {
        if self.lengths_mm.is_empty() {
            return Err(QuoteError::NoLengthsOffered(self.id.as_str().to_string()));
        }
        if self.lengths_mm.iter().any(|&len| len <= 0) {
            return Err(QuoteError::ValidationError(format!(
                "product {} has a non-positive length",
                self.id
            )));
        }
        if self.price_per_unit.is_negative() {
            return Err(QuoteError::ValidationError(format!(
                "product {} has a negative price",
                self.id
            )));
        }
        if self.stock_quantity < 0 {
            return Err(QuoteError::ValidationError(format!(
                "product {} has negative stock",
                self.id
            )));
        }
        Ok(())
    }

    /// Decrement stock by a quantity, flooring at zero. Returns the new
    /// stock level.
    pub fn decrement_stock(&mut self, quantity: i64) -> i64 {
        self.stock_quantity = (self.stock_quantity - quantity).max(0);
        self.updated_at = current_timestamp();
        self.stock_quantity
    }

    /// Capture a denormalized snapshot of this product for a cart line.
    ///
    /// The snapshot carries price-at-add-time; quotes must never be
    /// repriced from the live product.
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            product_id: self.id.clone(),
            name: self.name.clone(),
            material: self.material.clone(),
            lengths_mm: self.lengths_mm.clone(),
            is_planed: self.is_planed,
            price_per_unit: self.price_per_unit,
            image_url: self.image_url.clone(),
        }
    }
}

/// A denormalized product snapshot captured when an item is added to the
/// cart.
///
/// Line items own their snapshot so a quote reflects the product as it was
/// when added. A snapshot can become unresolvable (product deleted
/// server-side); such items are excluded from totals and flagged, never a
/// crash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSnapshot {
    /// ID of the source product.
    pub product_id: ProductId,
    /// Product name at add time.
    pub name: String,
    /// Material at add time.
    pub material: String,
    /// Offered lengths at add time.
    pub lengths_mm: Vec<i64>,
    /// Planed flag at add time.
    pub is_planed: bool,
    /// Unit price at add time.
    pub price_per_unit: Money,
    /// Image URL at add time.
    pub image_url: Option<String>,
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
