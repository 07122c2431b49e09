//! Pricing breakdown types for the cart.

use crate::ids::QuoteItemId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Pricing for a single cart line.
///
/// Prices come from the line's product snapshot, never the live product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinePricing {
    /// The line item this pricing belongs to.
    pub item_id: QuoteItemId,
    /// Unit price at add time.
    pub unit_price: Money,
    /// Quantity.
    pub quantity: i64,
    /// unit_price × quantity.
    pub line_total: Money,
}

/// Full pricing breakdown for a cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartPricing {
    /// Sum of resolvable line totals before discount.
    pub subtotal: Money,
    /// Discount applied, if any.
    pub discount_total: Money,
    /// subtotal − discount_total.
    pub grand_total: Money,
    /// Per-line pricing for resolvable lines.
    pub lines: Vec<LinePricing>,
    /// Lines excluded because their product reference failed to resolve.
    pub skipped: Vec<QuoteItemId>,
}

impl CartPricing {
    /// Whether any lines were excluded from the totals.
    pub fn has_skipped_lines(&self) -> bool {
        !self.skipped.is_empty()
    }
}
