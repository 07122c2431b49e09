//! Product filters.
//!
//! Filters are evaluated in memory; the in-memory semantics are the
//! authoritative ones. The serialized form of a query doubles as the
//! request body for the remote search collaborator, which implements the
//! same semantics server-side.

use crate::catalog::Product;
use crate::ids::CategoryId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A product filter. A query combines filters with AND.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Filter {
    /// Case-insensitive substring match on the product name.
    Text(String),
    /// Filter by single category.
    Category(CategoryId),
    /// Filter by multiple categories (OR).
    Categories(Vec<CategoryId>),
    /// Filter by material (case-insensitive).
    Material(String),
    /// Filter by multiple materials (OR).
    Materials(Vec<String>),
    /// Product included if ANY offered length falls in [min, max].
    LengthRange {
        min_mm: Option<i64>,
        max_mm: Option<i64>,
    },
    /// Planed or rough-sawn. Absence of this filter means "either".
    Planed(bool),
    /// Only show in-stock products.
    InStock,
    /// Filter by unit price range.
    PriceRange {
        min: Option<Money>,
        max: Option<Money>,
    },
}

impl Filter {
    /// Create a text search filter.
    pub fn text(query: impl Into<String>) -> Self {
        Filter::Text(query.into())
    }

    /// Create a category filter.
    pub fn category(id: impl Into<CategoryId>) -> Self {
        Filter::Category(id.into())
    }

    /// Create a material filter.
    pub fn material(material: impl Into<String>) -> Self {
        Filter::Material(material.into())
    }

    /// Create a length range filter.
    pub fn length_range(min_mm: Option<i64>, max_mm: Option<i64>) -> Self {
        Filter::LengthRange { min_mm, max_mm }
    }

    /// Create a planed filter.
    pub fn planed(planed: bool) -> Self {
        Filter::Planed(planed)
    }

    /// Create an in-stock filter.
    pub fn in_stock() -> Self {
        Filter::InStock
    }

    /// Create a price range filter.
    pub fn price_range(min: Option<Money>, max: Option<Money>) -> Self {
        Filter::PriceRange { min, max }
    }

    /// Evaluate this filter against a product.
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Filter::Text(query) => product
                .name
                .to_lowercase()
                .contains(&query.to_lowercase()),
            Filter::Category(id) => product.category_id.as_ref() == Some(id),
            Filter::Categories(ids) => product
                .category_id
                .as_ref()
                .map(|id| ids.contains(id))
                .unwrap_or(false),
            Filter::Material(material) => {
                product.material.to_lowercase() == material.to_lowercase()
            }
            Filter::Materials(materials) => materials
                .iter()
                .any(|m| product.material.to_lowercase() == m.to_lowercase()),
            Filter::LengthRange { min_mm, max_mm } => {
                product.offers_length_in_range(*min_mm, *max_mm)
            }
            Filter::Planed(planed) => product.is_planed == *planed,
            Filter::InStock => product.is_in_stock(),
            Filter::PriceRange { min, max } => {
                let price = product.price_per_unit.amount_cents;
                min.map(|m| price >= m.amount_cents).unwrap_or(true)
                    && max.map(|m| price <= m.amount_cents).unwrap_or(true)
            }
        }
    }
}
