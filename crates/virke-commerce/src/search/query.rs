//! Search query: filters × sort × pagination.

use crate::catalog::Product;
use crate::search::{Filter, Pagination, SearchResults};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Field to sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortField {
    /// Product name, locale-aware lexicographic (Unicode lowercase
    /// comparison).
    #[default]
    Name,
    /// Unit price, numeric.
    Price,
    /// Creation time, chronological.
    CreatedAt,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// A sort specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Sort {
    /// Field to sort by.
    pub field: SortField,
    /// Direction.
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn name_asc() -> Self {
        Self::new(SortField::Name, SortDirection::Asc)
    }

    pub fn price_asc() -> Self {
        Self::new(SortField::Price, SortDirection::Asc)
    }

    pub fn price_desc() -> Self {
        Self::new(SortField::Price, SortDirection::Desc)
    }

    pub fn newest() -> Self {
        Self::new(SortField::CreatedAt, SortDirection::Desc)
    }

    /// Compare two products under this sort.
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let ordering = match self.field {
            SortField::Name => a
                .name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name)),
            SortField::Price => a
                .price_per_unit
                .amount_cents
                .cmp(&b.price_per_unit.amount_cents),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// A search query over the product catalog.
///
/// Pure: [`SearchQuery::execute`] over an in-memory slice is the
/// authoritative semantics. The same serialized query is sent as the
/// request body to the remote search collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Filters, combined with AND.
    pub filters: Vec<Filter>,
    /// Sort specification.
    pub sort: Sort,
    /// Current page (1-indexed).
    pub page: i64,
    /// Items per page.
    pub per_page: i64,
}

impl SearchQuery {
    /// Create a new query with default sort and pagination.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            sort: Sort::name_asc(),
            page: 1,
            per_page: 24,
        }
    }

    /// Add a free-text filter (ignored when empty).
    pub fn with_text(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        if !query.is_empty() {
            self.filters.push(Filter::Text(query));
        }
        self
    }

    /// Add a filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set the sort specification.
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    /// Set pagination.
    pub fn with_pagination(mut self, page: i64, per_page: i64) -> Self {
        self.page = page.max(1);
        self.per_page = per_page.clamp(1, 100);
        self
    }

    /// Check whether a product passes every filter.
    pub fn matches(&self, product: &Product) -> bool {
        self.filters.iter().all(|f| f.matches(product))
    }

    /// Evaluate the query over an in-memory product collection.
    ///
    /// Filters, sorts (stable), then paginates. The total count reflects
    /// the filtered set, not the page.
    pub fn execute(&self, products: &[Product]) -> SearchResults<Product> {
        let mut filtered: Vec<Product> = products
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();

        filtered.sort_by(|a, b| self.sort.compare(a, b));

        let total = filtered.len() as i64;
        // Pagination clamps page/per_page, covering queries that arrived
        // over the wire with zeroes
        let pagination = Pagination::new(self.page, self.per_page, total);

        let items = filtered
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.per_page as usize)
            .collect();

        SearchResults::new(items, pagination)
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self::new()
    }
}
