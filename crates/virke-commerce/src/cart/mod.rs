//! Cart (quote-in-progress) and line item types.

mod cart;
mod item;
mod pricing;

pub use cart::{Cart, CartOwner};
pub use item::{ProductConfig, QuoteItem};
pub use pricing::{CartPricing, LinePricing};
