//! Admin catalog management: product and category CRUD with image
//! blob handling and category deletion guards.

use std::sync::Arc;
use tracing::{info, warn};
use virke_commerce::catalog::{self, Category, Product};
use virke_commerce::{CategoryId, ProductId, QuoteError};
use virke_store::{BlobStore, CategoryStore, ProductStore};

use crate::error::WorkflowError;

/// Staff-facing catalog operations.
pub struct CatalogAdminService {
    products: Arc<dyn ProductStore>,
    categories: Arc<dyn CategoryStore>,
    blobs: Arc<dyn BlobStore>,
}

impl CatalogAdminService {
    pub fn new(
        products: Arc<dyn ProductStore>,
        categories: Arc<dyn CategoryStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            products,
            categories,
            blobs,
        }
    }

    /// Create or update a product after validating catalog invariants.
    pub async fn save_product(&self, product: Product) -> Result<(), WorkflowError> {
        product.validate()?;
        self.products.upsert(product.clone()).await?;
        info!(product = product.id.as_str(), "product saved");
        Ok(())
    }

    /// Upload a product image and attach its URL, replacing any previous
    /// image. The old blob is deleted best-effort.
    pub async fn set_product_image(
        &self,
        product_id: &ProductId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, WorkflowError> {
        let mut product = self
            .products
            .get(product_id)
            .await?
            .ok_or(QuoteError::ProductNotFound(product_id.as_str().to_string()))?;

        let url = self
            .blobs
            .upload(&format!("products/{}/{}", product_id, file_name), bytes)
            .await?;

        if let Some(old_url) = product.image_url.replace(url.clone()) {
            if let Err(e) = self.blobs.delete(&old_url).await {
                warn!(url = old_url.as_str(), error = %e, "stale image blob not deleted");
            }
        }
        self.products.upsert(product).await?;
        Ok(url)
    }

    /// Delete a product, cleaning up its image blob best-effort.
    pub async fn delete_product(&self, product_id: &ProductId) -> Result<(), WorkflowError> {
        let product = self
            .products
            .get(product_id)
            .await?
            .ok_or(QuoteError::ProductNotFound(product_id.as_str().to_string()))?;

        if let Some(url) = &product.image_url {
            if let Err(e) = self.blobs.delete(url).await {
                warn!(url = url.as_str(), error = %e, "image blob not deleted");
            }
        }
        self.products.delete(product_id).await?;
        info!(product = product_id.as_str(), "product deleted");
        Ok(())
    }

    /// Create or update a category, rejecting reparenting that would
    /// make the category its own ancestor.
    pub async fn save_category(&self, category: Category) -> Result<(), WorkflowError> {
        if let Some(parent_id) = &category.parent_id {
            let all = self.categories.list().await?;
            if catalog::reparent_would_cycle(&all, &category.id, parent_id) {
                return Err(
                    QuoteError::CategoryCycle(category.id.as_str().to_string()).into(),
                );
            }
        }
        self.categories.upsert(category.clone()).await?;
        info!(category = category.id.as_str(), "category saved");
        Ok(())
    }

    /// Delete a category. Rejected while it has child categories or is
    /// still referenced by products.
    pub async fn delete_category(&self, category_id: &CategoryId) -> Result<(), WorkflowError> {
        let all = self.categories.list().await?;
        let referencing = self.products.count_in_category(category_id).await?;
        catalog::validate_delete(&all, category_id, referencing)?;

        self.categories.delete(category_id).await?;
        info!(category = category_id.as_str(), "category deleted");
        Ok(())
    }
}
