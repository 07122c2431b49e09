//! Product catalog: products and categories.

mod category;
mod product;

pub use category::{
    ancestor_ids, find, has_children, is_ancestor_of, reparent_would_cycle, validate_delete,
    Category,
};
pub use product::{Product, ProductSnapshot};
