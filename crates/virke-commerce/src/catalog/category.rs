//! Category types for product organization.

use crate::error::QuoteError;
use crate::ids::CategoryId;
use serde::{Deserialize, Serialize};

/// A product category.
///
/// Categories form a tree via `parent_id`; the data model stores only the
/// parent pointer, so ancestry checks walk the collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    /// Parent category ID (None for root categories).
    pub parent_id: Option<CategoryId>,
    /// Category name.
    pub name: String,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Category {
    /// Create a new root category.
    pub fn new_root(name: impl Into<String>) -> Self {
        let now = current_timestamp();
        Self {
            id: CategoryId::generate(),
            parent_id: None,
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new child category.
    pub fn new_child(parent: &Category, name: impl Into<String>) -> Self {
        let now = current_timestamp();
        Self {
            id: CategoryId::generate(),
            parent_id: Some(parent.id.clone()),
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if this is a root category.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Look up a category by ID within a collection.
pub fn find<'a>(categories: &'a [Category], id: &CategoryId) -> Option<&'a Category> {
    categories.iter().find(|c| &c.id == id)
}

/// Collect the ancestor IDs of a category, nearest first.
///
/// Walks parent pointers; stops if a parent is missing from the
/// collection or a malformed cycle would loop forever.
pub fn ancestor_ids(categories: &[Category], id: &CategoryId) -> Vec<CategoryId> {
    let mut ancestors = Vec::new();
    let mut current = find(categories, id).and_then(|c| c.parent_id.clone());
    while let Some(parent_id) = current {
        if ancestors.contains(&parent_id) || &parent_id == id {
            break;
        }
        current = find(categories, &parent_id).and_then(|c| c.parent_id.clone());
        ancestors.push(parent_id);
    }
    ancestors
}

/// Check whether `ancestor` is an ancestor of `descendant`.
pub fn is_ancestor_of(
    categories: &[Category],
    ancestor: &CategoryId,
    descendant: &CategoryId,
) -> bool {
    ancestor_ids(categories, descendant).contains(ancestor)
}

/// Check whether reparenting `id` under `new_parent` would make the
/// category its own ancestor.
pub fn reparent_would_cycle(
    categories: &[Category],
    id: &CategoryId,
    new_parent: &CategoryId,
) -> bool {
    id == new_parent || is_ancestor_of(categories, id, new_parent)
}

/// Check whether a category has child categories.
pub fn has_children(categories: &[Category], id: &CategoryId) -> bool {
    categories
        .iter()
        .any(|c| c.parent_id.as_ref() == Some(id))
}

/// Validate that a category may be deleted.
///
/// A category with children cannot be deleted, and neither can one still
/// referenced by a product. `referencing_products` is the count of
/// products whose `category_id` points at this category.
pub fn validate_delete(
    categories: &[Category],
    id: &CategoryId,
    referencing_products: usize,
) -> Result<(), QuoteError> {
    if has_children(categories, id) {
        return Err(QuoteError::CategoryHasChildren(id.as_str().to_string()));
    }
    if referencing_products > 0 {
        return Err(QuoteError::CategoryInUse(id.as_str().to_string()));
    }
    Ok(())
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
