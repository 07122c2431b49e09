//! Quoting error types.

use thiserror::Error;

/// Errors that can occur in quoting operations.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Category not found.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Quote not found.
    #[error("Quote not found: {0}")]
    QuoteNotFound(String),

    /// Line item not in the cart.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(String),

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Requested length is not offered for the product.
    #[error("Length {length_mm} mm not offered for product {product}")]
    LengthNotOffered { product: String, length_mm: i64 },

    /// A product must offer at least one length to be configurable.
    #[error("Product {0} offers no lengths")]
    NoLengthsOffered(String),

    /// Attempted to submit an empty cart.
    #[error("Cannot submit an empty quote")]
    EmptyQuote,

    /// The operation requires a signed-in user.
    #[error("Authentication required")]
    AuthRequired,

    /// Quote has neither a user nor a simple-customer reference.
    #[error("Quote has no customer")]
    MissingCustomer,

    /// Flat discount would push the total below zero.
    #[error("Discount {discount_cents} exceeds quote total {total_cents}")]
    DiscountExceedsTotal { discount_cents: i64, total_cents: i64 },

    /// Discount percent outside 0-100.
    #[error("Invalid discount percent: {0}")]
    InvalidDiscountPercent(f64),

    /// Category still has child categories.
    #[error("Category {0} has child categories")]
    CategoryHasChildren(String),

    /// Category is still referenced by products.
    #[error("Category {0} is referenced by products")]
    CategoryInUse(String),

    /// Reparenting would make a category its own ancestor.
    #[error("Category {0} cannot be its own ancestor")]
    CategoryCycle(String),

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<serde_json::Error> for QuoteError {
    fn from(e: serde_json::Error) -> Self {
        QuoteError::SerializationError(e.to_string())
    }
}
