//! Timber quoting domain types and logic for Virke.
//!
//! This crate provides the domain core for a timber retailer's quoting and
//! catalog application:
//!
//! - **Catalog**: Products (material, offered lengths, planed flag, stock),
//!   category tree
//! - **Cart**: The quote-in-progress with configured line items and totals
//! - **Quote**: Submitted quotes with a status lifecycle, history and
//!   notifications
//! - **Search**: Pure filter/sort/pagination over a product collection
//!
//! # Example
//!
//! ```rust,ignore
//! use virke_commerce::prelude::*;
//!
//! let product = Product::new("Planed spruce 45x95", "spruce", Money::new(4599, Currency::SEK))
//!     .with_lengths(vec![2400, 3000, 3600]);
//!
//! let mut cart = Cart::anonymous();
//! let config = ProductConfig::for_product(&product, 3000, 3);
//! cart.add_item(product.snapshot(), config)?;
//!
//! let total = cart.calculate_total()?;
//! println!("Total: {}", total.display());
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod quote;
pub mod search;

pub use error::QuoteError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::QuoteError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{Category, Product, ProductSnapshot};

    // Cart
    pub use crate::cart::{Cart, CartOwner, CartPricing, LinePricing, ProductConfig, QuoteItem};

    // Quote
    pub use crate::quote::{
        ContactInfo, Notification, NotificationKind, NotificationStatus, Quote, QuoteCustomer,
        QuoteHistoryEntry, QuoteLineItem, QuoteStatus, SimpleCustomer,
    };

    // Search
    pub use crate::search::{
        Filter, Pagination, SearchQuery, SearchResults, Sort, SortDirection, SortField,
    };
}
