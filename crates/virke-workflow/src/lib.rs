//! Quoting workflows for Virke.
//!
//! Services wiring the domain core to its collaborators:
//!
//! - [`CartService`]: cart persistence, remote bag rows for signed-in
//!   users, device storage for anonymous visitors
//! - [`SubmissionService`]: turns a non-empty cart into a persisted
//!   quote with line items, history, and admin notifications
//! - [`LifecycleService`]: staff status changes, discounts, and the
//!   stock decrement pass on completion
//! - [`CatalogAdminService`]: product/category CRUD with image blob
//!   handling
//! - [`ProductSearch`]: remote search with identical local fallback
//! - [`NotificationInbox`]: deduplicating client-side inbox
//!
//! Sessions are explicit parameters everywhere; [`SessionHolder`] exists
//! only for the application's entry boundary.

pub mod cart_service;
pub mod catalog_admin;
pub mod error;
pub mod fanout;
pub mod inbox;
pub mod lifecycle;
pub mod search;
pub mod session;
pub mod submission;

pub use cart_service::{CartService, CART_STORAGE_KEY};
pub use catalog_admin::CatalogAdminService;
pub use error::WorkflowError;
pub use fanout::{notify_each, FanoutReport};
pub use inbox::NotificationInbox;
pub use lifecycle::LifecycleService;
pub use search::ProductSearch;
pub use session::SessionHolder;
pub use submission::SubmissionService;
