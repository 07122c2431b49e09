//! Collaborator contracts.
//!
//! Every external service the quoting core consumes is specified here as
//! a trait. Implementations are expected to be cheap to clone behind an
//! `Arc` and safe to share across tasks.

use crate::error::StoreError;
use crate::session::Session;
use async_trait::async_trait;
use tokio::sync::broadcast;
use virke_commerce::cart::{ProductConfig, QuoteItem};
use virke_commerce::catalog::{Category, Product};
use virke_commerce::quote::{
    Notification, Quote, QuoteHistoryEntry, QuoteLineItem, SimpleCustomer,
};
use virke_commerce::search::{SearchQuery, SearchResults};
use virke_commerce::{CategoryId, CustomerId, NotificationId, ProductId, QuoteId, QuoteItemId, UserId};

/// Table-like access to the `products` table.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Fetch a product by ID.
    async fn get(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;

    /// Fetch all products (the basic unfiltered fetch the client falls
    /// back to when the remote search call fails).
    async fn list(&self) -> Result<Vec<Product>, StoreError>;

    /// Insert or replace a product.
    async fn upsert(&self, product: Product) -> Result<(), StoreError>;

    /// Delete a product.
    async fn delete(&self, id: &ProductId) -> Result<(), StoreError>;

    /// Persist a new stock level for a product.
    async fn set_stock(&self, id: &ProductId, quantity: i64) -> Result<(), StoreError>;

    /// Count products referencing a category (deletion guard input).
    async fn count_in_category(&self, id: &CategoryId) -> Result<usize, StoreError>;
}

/// Table-like access to the `categories` table.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Fetch all categories.
    async fn list(&self) -> Result<Vec<Category>, StoreError>;

    /// Insert or replace a category.
    async fn upsert(&self, category: Category) -> Result<(), StoreError>;

    /// Delete a category. Guard checks happen in the workflow layer.
    async fn delete(&self, id: &CategoryId) -> Result<(), StoreError>;
}

/// Server-side cart persistence for signed-in users (`shopping_bags` /
/// `shopping_bag_items`).
///
/// Concurrent writers (two tabs, two devices) are last-write-wins: the
/// backend offers row-level guarantees only, and the client reconciles by
/// refetching after every mutation. This is an accepted policy, not an
/// oversight.
#[async_trait]
pub trait BagStore: Send + Sync {
    /// Fetch the user's cart rows in insertion order.
    async fn items_for_user(&self, user_id: &UserId) -> Result<Vec<QuoteItem>, StoreError>;

    /// Insert one cart row.
    async fn insert_item(&self, user_id: &UserId, item: QuoteItem) -> Result<(), StoreError>;

    /// Replace the configuration of one cart row.
    async fn update_item(
        &self,
        user_id: &UserId,
        item_id: &QuoteItemId,
        config: ProductConfig,
    ) -> Result<(), StoreError>;

    /// Delete one cart row. Deleting a missing row is not an error.
    async fn delete_item(&self, user_id: &UserId, item_id: &QuoteItemId)
        -> Result<(), StoreError>;

    /// Delete all of the user's cart rows.
    async fn clear_for_user(&self, user_id: &UserId) -> Result<(), StoreError>;
}

/// Table-like access to `quotes`, `quote_items`, and `quote_history`.
#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Insert a new quote row.
    ///
    /// `quote_number` carries no uniqueness constraint; it is a display
    /// label with an accepted collision risk.
    async fn insert_quote(&self, quote: Quote) -> Result<(), StoreError>;

    /// Fetch a quote by ID.
    async fn get_quote(&self, id: &QuoteId) -> Result<Option<Quote>, StoreError>;

    /// Replace a quote row (status/total/discount updates).
    async fn update_quote(&self, quote: Quote) -> Result<(), StoreError>;

    /// Fetch all quotes, newest first.
    async fn list_quotes(&self) -> Result<Vec<Quote>, StoreError>;

    /// Insert line item rows for a quote.
    async fn insert_line_items(&self, items: Vec<QuoteLineItem>) -> Result<(), StoreError>;

    /// Fetch the line items of a quote.
    async fn line_items_for_quote(&self, id: &QuoteId) -> Result<Vec<QuoteLineItem>, StoreError>;

    /// Append a history entry. History is append-only: entries are never
    /// mutated or deleted.
    async fn append_history(&self, entry: QuoteHistoryEntry) -> Result<(), StoreError>;

    /// Fetch the history of a quote, oldest first.
    async fn history_for_quote(
        &self,
        id: &QuoteId,
    ) -> Result<Vec<QuoteHistoryEntry>, StoreError>;

    /// Delete a quote and its line items. An explicit destructive admin
    /// operation, never part of the normal lifecycle.
    async fn delete_quote(&self, id: &QuoteId) -> Result<(), StoreError>;
}

/// Table-like access to the `notifications` table.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Insert a notification row.
    async fn insert(&self, notification: Notification) -> Result<(), StoreError>;

    /// Fetch a user's notifications, newest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Notification>, StoreError>;

    /// Mark a notification read.
    async fn mark_read(&self, id: &NotificationId) -> Result<(), StoreError>;
}

/// Table-like access to the `simple_customers` table.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Insert a customer record.
    async fn insert(&self, customer: SimpleCustomer) -> Result<(), StoreError>;

    /// Fetch a customer by ID.
    async fn get(&self, id: &CustomerId) -> Result<Option<SimpleCustomer>, StoreError>;
}

/// The hosted identity service.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Sign in with email and password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, StoreError>;

    /// Create an account and sign in.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Session, StoreError>;

    /// Sign out the current session.
    async fn sign_out(&self) -> Result<(), StoreError>;

    /// The current session, if one is active and valid.
    async fn current_session(&self) -> Result<Option<Session>, StoreError>;

    /// IDs of all admin users (notification fan-out recipients).
    async fn admin_user_ids(&self) -> Result<Vec<UserId>, StoreError>;
}

/// Blob storage for product images.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload a blob, returning its publicly resolvable URL.
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, StoreError>;

    /// Delete a blob by its URL.
    async fn delete(&self, url: &str) -> Result<(), StoreError>;
}

/// The hosted search function.
///
/// Accepts the serialized [`SearchQuery`] as its request body and returns
/// `{data, count}`. Implements the same semantics as the in-memory
/// composer, server-side, for efficiency at scale. Callers fall back to
/// local filtering when this call fails.
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Execute a search remotely.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResults<Product>, StoreError>;
}

/// Realtime push channel for newly inserted notification rows.
///
/// Delivery is at-least-once and only roughly in creation order;
/// subscribers must dedupe by notification ID.
pub trait RealtimeChannel: Send + Sync {
    /// Subscribe to notifications for one user.
    fn subscribe(&self, user_id: &UserId) -> broadcast::Receiver<Notification>;
}

/// Device-local key-value storage for the anonymous cart.
///
/// Synchronous: local writes never suspend the caller.
pub trait DeviceStorage: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
