//! Product search with local fallback.
//!
//! The remote search function implements the same filter/sort semantics
//! server-side. When the call fails, the client falls back to an
//! unfiltered product fetch filtered locally by the same composer, so
//! results are identical either way.

use std::sync::Arc;
use tracing::warn;
use virke_commerce::catalog::Product;
use virke_commerce::search::{SearchQuery, SearchResults};
use virke_store::{ProductStore, SearchService};

use crate::error::WorkflowError;

/// Runs product searches, remote-first.
pub struct ProductSearch {
    search: Arc<dyn SearchService>,
    products: Arc<dyn ProductStore>,
}

impl ProductSearch {
    pub fn new(search: Arc<dyn SearchService>, products: Arc<dyn ProductStore>) -> Self {
        Self { search, products }
    }

    /// Execute a search, falling back to local filtering when the
    /// remote call fails.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResults<Product>, WorkflowError> {
        match self.search.search(query).await {
            Ok(results) => Ok(results),
            Err(e) => {
                warn!(error = %e, "remote search failed, filtering locally");
                let all = self.products.list().await?;
                Ok(query.execute(&all))
            }
        }
    }
}
