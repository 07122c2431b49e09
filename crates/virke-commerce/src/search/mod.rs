//! Pure filter/sort/pagination over the product catalog.

mod filter;
mod query;
mod results;

pub use filter::Filter;
pub use query::{SearchQuery, Sort, SortDirection, SortField};
pub use results::{Pagination, SearchResults};
