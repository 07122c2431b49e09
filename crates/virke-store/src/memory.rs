//! In-memory reference backends.
//!
//! Used by tests and local development. Each backend mirrors the
//! contract of its hosted counterpart, including its quirks: the bag
//! store is last-write-wins, quote numbers carry no uniqueness
//! constraint, and the notification hub re-broadcasts inserts to
//! realtime subscribers.

use crate::error::StoreError;
use crate::session::Session;
use crate::traits::{
    BagStore, BlobStore, CategoryStore, CustomerStore, DeviceStorage, IdentityService,
    NotificationStore, ProductStore, QuoteStore, RealtimeChannel, SearchService,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::broadcast;
use virke_commerce::cart::{ProductConfig, QuoteItem};
use virke_commerce::catalog::{Category, Product};
use virke_commerce::quote::{
    Notification, Quote, QuoteHistoryEntry, QuoteLineItem, SimpleCustomer,
};
use virke_commerce::search::{SearchQuery, SearchResults};
use virke_commerce::{
    CategoryId, CustomerId, NotificationId, ProductId, QuoteId, QuoteItemId, UserId,
};

fn poisoned() -> StoreError {
    StoreError::StorageError("poisoned lock".to_string())
}

/// In-memory `products` table.
#[derive(Default)]
pub struct MemoryProductStore {
    products: Mutex<Vec<Product>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with products.
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
        }
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn get(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let products = self.products.lock().map_err(|_| poisoned())?;
        Ok(products.iter().find(|p| &p.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let products = self.products.lock().map_err(|_| poisoned())?;
        Ok(products.clone())
    }

    async fn upsert(&self, product: Product) -> Result<(), StoreError> {
        let mut products = self.products.lock().map_err(|_| poisoned())?;
        if let Some(existing) = products.iter_mut().find(|p| p.id == product.id) {
            *existing = product;
        } else {
            products.push(product);
        }
        Ok(())
    }

    async fn delete(&self, id: &ProductId) -> Result<(), StoreError> {
        let mut products = self.products.lock().map_err(|_| poisoned())?;
        products.retain(|p| &p.id != id);
        Ok(())
    }

    async fn set_stock(&self, id: &ProductId, quantity: i64) -> Result<(), StoreError> {
        let mut products = self.products.lock().map_err(|_| poisoned())?;
        let product = products
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| StoreError::NotFound(id.as_str().to_string()))?;
        product.stock_quantity = quantity;
        Ok(())
    }

    async fn count_in_category(&self, id: &CategoryId) -> Result<usize, StoreError> {
        let products = self.products.lock().map_err(|_| poisoned())?;
        Ok(products
            .iter()
            .filter(|p| p.category_id.as_ref() == Some(id))
            .count())
    }
}

/// In-memory `categories` table.
#[derive(Default)]
pub struct MemoryCategoryStore {
    categories: Mutex<Vec<Category>>,
}

impl MemoryCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryStore for MemoryCategoryStore {
    async fn list(&self) -> Result<Vec<Category>, StoreError> {
        let categories = self.categories.lock().map_err(|_| poisoned())?;
        Ok(categories.clone())
    }

    async fn upsert(&self, category: Category) -> Result<(), StoreError> {
        let mut categories = self.categories.lock().map_err(|_| poisoned())?;
        if let Some(existing) = categories.iter_mut().find(|c| c.id == category.id) {
            *existing = category;
        } else {
            categories.push(category);
        }
        Ok(())
    }

    async fn delete(&self, id: &CategoryId) -> Result<(), StoreError> {
        let mut categories = self.categories.lock().map_err(|_| poisoned())?;
        categories.retain(|c| &c.id != id);
        Ok(())
    }
}

/// In-memory `shopping_bags` / `shopping_bag_items` tables.
///
/// Last-write-wins on concurrent updates, like the hosted backend.
#[derive(Default)]
pub struct MemoryBagStore {
    rows: Mutex<HashMap<String, Vec<QuoteItem>>>,
    ops: AtomicUsize,
}

impl MemoryBagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store calls made; lets tests assert that validation
    /// failures never reach the network.
    pub fn op_count(&self) -> usize {
        self.ops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BagStore for MemoryBagStore {
    async fn items_for_user(&self, user_id: &UserId) -> Result<Vec<QuoteItem>, StoreError> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.lock().map_err(|_| poisoned())?;
        Ok(rows.get(user_id.as_str()).cloned().unwrap_or_default())
    }

    async fn insert_item(&self, user_id: &UserId, item: QuoteItem) -> Result<(), StoreError> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;
        rows.entry(user_id.as_str().to_string())
            .or_default()
            .push(item);
        Ok(())
    }

    async fn update_item(
        &self,
        user_id: &UserId,
        item_id: &QuoteItemId,
        config: ProductConfig,
    ) -> Result<(), StoreError> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;
        if let Some(items) = rows.get_mut(user_id.as_str()) {
            if let Some(item) = items.iter_mut().find(|i| &i.id == item_id) {
                item.config = config;
            }
        }
        Ok(())
    }

    async fn delete_item(
        &self,
        user_id: &UserId,
        item_id: &QuoteItemId,
    ) -> Result<(), StoreError> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;
        if let Some(items) = rows.get_mut(user_id.as_str()) {
            items.retain(|i| &i.id != item_id);
        }
        Ok(())
    }

    async fn clear_for_user(&self, user_id: &UserId) -> Result<(), StoreError> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;
        rows.remove(user_id.as_str());
        Ok(())
    }
}

/// In-memory `quotes` / `quote_items` / `quote_history` tables.
#[derive(Default)]
pub struct MemoryQuoteStore {
    quotes: Mutex<Vec<Quote>>,
    lines: Mutex<Vec<QuoteLineItem>>,
    history: Mutex<Vec<QuoteHistoryEntry>>,
    ops: AtomicUsize,
}

impl MemoryQuoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store calls made; lets tests assert that validation
    /// failures never reach the network.
    pub fn op_count(&self) -> usize {
        self.ops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteStore for MemoryQuoteStore {
    async fn insert_quote(&self, quote: Quote) -> Result<(), StoreError> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        let mut quotes = self.quotes.lock().map_err(|_| poisoned())?;
        // No uniqueness constraint on quote_number: accepted collision risk
        quotes.push(quote);
        Ok(())
    }

    async fn get_quote(&self, id: &QuoteId) -> Result<Option<Quote>, StoreError> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        let quotes = self.quotes.lock().map_err(|_| poisoned())?;
        Ok(quotes.iter().find(|q| &q.id == id).cloned())
    }

    async fn update_quote(&self, quote: Quote) -> Result<(), StoreError> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        let mut quotes = self.quotes.lock().map_err(|_| poisoned())?;
        let existing = quotes
            .iter_mut()
            .find(|q| q.id == quote.id)
            .ok_or_else(|| StoreError::NotFound(quote.id.as_str().to_string()))?;
        *existing = quote;
        Ok(())
    }

    async fn list_quotes(&self) -> Result<Vec<Quote>, StoreError> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        let quotes = self.quotes.lock().map_err(|_| poisoned())?;
        let mut all = quotes.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn insert_line_items(&self, items: Vec<QuoteLineItem>) -> Result<(), StoreError> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        let mut lines = self.lines.lock().map_err(|_| poisoned())?;
        lines.extend(items);
        Ok(())
    }

    async fn line_items_for_quote(
        &self,
        id: &QuoteId,
    ) -> Result<Vec<QuoteLineItem>, StoreError> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        let lines = self.lines.lock().map_err(|_| poisoned())?;
        Ok(lines.iter().filter(|l| &l.quote_id == id).cloned().collect())
    }

    async fn append_history(&self, entry: QuoteHistoryEntry) -> Result<(), StoreError> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        let mut history = self.history.lock().map_err(|_| poisoned())?;
        history.push(entry);
        Ok(())
    }

    async fn history_for_quote(
        &self,
        id: &QuoteId,
    ) -> Result<Vec<QuoteHistoryEntry>, StoreError> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        let history = self.history.lock().map_err(|_| poisoned())?;
        Ok(history
            .iter()
            .filter(|h| &h.quote_id == id)
            .cloned()
            .collect())
    }

    async fn delete_quote(&self, id: &QuoteId) -> Result<(), StoreError> {
        self.ops.fetch_add(1, Ordering::SeqCst);
        let mut quotes = self.quotes.lock().map_err(|_| poisoned())?;
        quotes.retain(|q| &q.id != id);
        let mut lines = self.lines.lock().map_err(|_| poisoned())?;
        lines.retain(|l| &l.quote_id != id);
        Ok(())
    }
}

/// In-memory `notifications` table doubling as the realtime channel.
///
/// Inserts are re-broadcast to every subscriber; receivers filter by
/// recipient and must dedupe by ID, matching the hosted channel's
/// at-least-once contract.
pub struct MemoryNotificationHub {
    rows: Mutex<Vec<Notification>>,
    tx: broadcast::Sender<Notification>,
}

impl MemoryNotificationHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            rows: Mutex::new(Vec::new()),
            tx,
        }
    }
}

impl Default for MemoryNotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationHub {
    async fn insert(&self, notification: Notification) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;
        rows.push(notification.clone());
        // Best-effort push; no subscribers is fine
        let _ = self.tx.send(notification);
        Ok(())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Notification>, StoreError> {
        let rows = self.rows.lock().map_err(|_| poisoned())?;
        let mut out: Vec<Notification> = rows
            .iter()
            .filter(|n| &n.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn mark_read(&self, id: &NotificationId) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;
        let notification = rows
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(|| StoreError::NotFound(id.as_str().to_string()))?;
        notification.mark_read();
        Ok(())
    }
}

impl RealtimeChannel for MemoryNotificationHub {
    fn subscribe(&self, _user_id: &UserId) -> broadcast::Receiver<Notification> {
        // One shared channel; subscribers filter by recipient
        self.tx.subscribe()
    }
}

/// In-memory `simple_customers` table.
#[derive(Default)]
pub struct MemoryCustomerStore {
    customers: Mutex<Vec<SimpleCustomer>>,
}

impl MemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomerStore for MemoryCustomerStore {
    async fn insert(&self, customer: SimpleCustomer) -> Result<(), StoreError> {
        let mut customers = self.customers.lock().map_err(|_| poisoned())?;
        customers.push(customer);
        Ok(())
    }

    async fn get(&self, id: &CustomerId) -> Result<Option<SimpleCustomer>, StoreError> {
        let customers = self.customers.lock().map_err(|_| poisoned())?;
        Ok(customers.iter().find(|c| &c.id == id).cloned())
    }
}

struct Account {
    user_id: UserId,
    email: String,
    password: String,
    is_admin: bool,
}

/// In-memory identity service with pre-registered accounts.
#[derive(Default)]
pub struct MemoryIdentityService {
    accounts: Mutex<Vec<Account>>,
    current: Mutex<Option<Session>>,
}

const SESSION_TTL_SECS: i64 = 3600;

impl MemoryIdentityService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register an account.
    pub fn with_user(self, user_id: impl Into<UserId>, email: &str, password: &str) -> Self {
        self.register(user_id.into(), email, password, false)
    }

    /// Pre-register an admin account.
    pub fn with_admin(self, user_id: impl Into<UserId>, email: &str, password: &str) -> Self {
        self.register(user_id.into(), email, password, true)
    }

    fn register(self, user_id: UserId, email: &str, password: &str, is_admin: bool) -> Self {
        if let Ok(mut accounts) = self.accounts.lock() {
            accounts.push(Account {
                user_id,
                email: email.to_string(),
                password: password.to_string(),
                is_admin,
            });
        }
        self
    }

    fn session_for(account: &Account) -> Session {
        Session {
            user_id: account.user_id.clone(),
            email: account.email.clone(),
            is_admin: account.is_admin,
            expires_at: current_timestamp() + SESSION_TTL_SECS,
        }
    }
}

#[async_trait]
impl IdentityService for MemoryIdentityService {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, StoreError> {
        let accounts = self.accounts.lock().map_err(|_| poisoned())?;
        let account = accounts
            .iter()
            .find(|a| a.email == email && a.password == password)
            .ok_or(StoreError::InvalidCredentials)?;
        let session = Self::session_for(account);
        drop(accounts);
        *self.current.lock().map_err(|_| poisoned())? = Some(session.clone());
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        _name: &str,
    ) -> Result<Session, StoreError> {
        let account = Account {
            user_id: UserId::generate(),
            email: email.to_string(),
            password: password.to_string(),
            is_admin: false,
        };
        let session = Self::session_for(&account);
        self.accounts.lock().map_err(|_| poisoned())?.push(account);
        *self.current.lock().map_err(|_| poisoned())? = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), StoreError> {
        *self.current.lock().map_err(|_| poisoned())? = None;
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, StoreError> {
        let current = self.current.lock().map_err(|_| poisoned())?;
        Ok(current.clone().filter(|s| s.is_valid()))
    }

    async fn admin_user_ids(&self) -> Result<Vec<UserId>, StoreError> {
        let accounts = self.accounts.lock().map_err(|_| poisoned())?;
        Ok(accounts
            .iter()
            .filter(|a| a.is_admin)
            .map(|a| a.user_id.clone())
            .collect())
    }
}

/// In-memory blob storage.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a blob exists at a URL.
    pub fn contains(&self, url: &str) -> bool {
        self.blobs
            .lock()
            .map(|b| b.contains_key(url))
            .unwrap_or(false)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, StoreError> {
        let url = format!("memory://blobs/{}", path);
        let mut blobs = self.blobs.lock().map_err(|_| poisoned())?;
        blobs.insert(url.clone(), bytes);
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<(), StoreError> {
        let mut blobs = self.blobs.lock().map_err(|_| poisoned())?;
        blobs.remove(url);
        Ok(())
    }
}

/// Search service that runs the query against an in-memory product list.
///
/// Exists to demonstrate that the remote function and the local composer
/// share one set of semantics: this backend literally runs the composer.
pub struct MemorySearchService {
    products: Mutex<Vec<Product>>,
}

impl MemorySearchService {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
        }
    }
}

#[async_trait]
impl SearchService for MemorySearchService {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResults<Product>, StoreError> {
        let products = self.products.lock().map_err(|_| poisoned())?;
        Ok(query.execute(&products))
    }
}

/// In-memory device storage.
#[derive(Default)]
pub struct MemoryDeviceStorage {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryDeviceStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeviceStorage for MemoryDeviceStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let map = self.map.lock().map_err(|_| poisoned())?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.map.lock().map_err(|_| poisoned())?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut map = self.map.lock().map_err(|_| poisoned())?;
        map.remove(key);
        Ok(())
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use virke_commerce::cart::ProductConfig;
    use virke_commerce::money::{Currency, Money};
    use virke_commerce::quote::NotificationKind;

    fn product(name: &str) -> Product {
        Product::new(name, "spruce", Money::new(1000, Currency::SEK))
            .with_lengths(vec![2400])
            .with_stock(5)
    }

    #[tokio::test]
    async fn test_product_store_roundtrip() {
        let store = MemoryProductStore::new();
        let p = product("Stud");
        let id = p.id.clone();

        store.upsert(p).await.unwrap();
        assert!(store.get(&id).await.unwrap().is_some());

        store.set_stock(&id, 0).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap().unwrap().stock_quantity, 0);

        store.delete(&id).await.unwrap();
        assert!(store.get(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bag_store_keeps_rows_per_user() {
        let store = MemoryBagStore::new();
        let user = UserId::new("u1");
        let other = UserId::new("u2");
        let p = product("Stud");
        let item = QuoteItem::new(p.snapshot(), ProductConfig::for_product(&p, 2400, 1));

        store.insert_item(&user, item.clone()).await.unwrap();
        assert_eq!(store.items_for_user(&user).await.unwrap().len(), 1);
        assert!(store.items_for_user(&other).await.unwrap().is_empty());

        store.clear_for_user(&user).await.unwrap();
        assert!(store.items_for_user(&user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bag_store_delete_missing_row_is_noop() {
        let store = MemoryBagStore::new();
        let user = UserId::new("u1");
        assert!(store
            .delete_item(&user, &QuoteItemId::new("missing"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_notification_hub_broadcasts_inserts() {
        let hub = MemoryNotificationHub::new();
        let user = UserId::new("u1");
        let mut rx = hub.subscribe(&user);

        let n = Notification::new(user.clone(), NotificationKind::QuoteSubmitted, "hello");
        hub.insert(n.clone()).await.unwrap();

        let pushed = rx.recv().await.unwrap();
        assert_eq!(pushed.id, n.id);
        assert_eq!(hub.list_for_user(&user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_identity_sign_in_flow() {
        let identity = MemoryIdentityService::new()
            .with_user("u1", "anna@example.com", "hunter2")
            .with_admin("staff-1", "staff@example.com", "s3cret");

        assert!(identity.current_session().await.unwrap().is_none());
        assert!(matches!(
            identity.sign_in("anna@example.com", "wrong").await,
            Err(StoreError::InvalidCredentials)
        ));

        let session = identity.sign_in("anna@example.com", "hunter2").await.unwrap();
        assert!(!session.is_admin);
        assert!(identity.current_session().await.unwrap().is_some());

        identity.sign_out().await.unwrap();
        assert!(identity.current_session().await.unwrap().is_none());

        let admins = identity.admin_user_ids().await.unwrap();
        assert_eq!(admins, vec![UserId::new("staff-1")]);
    }

    #[tokio::test]
    async fn test_blob_store_upload_delete() {
        let blobs = MemoryBlobStore::new();
        let url = blobs.upload("products/stud.jpg", vec![1, 2, 3]).await.unwrap();
        assert!(blobs.contains(&url));

        blobs.delete(&url).await.unwrap();
        assert!(!blobs.contains(&url));
    }

    #[tokio::test]
    async fn test_memory_search_matches_local_composer() {
        let products = vec![product("Alpha"), product("Beta")];
        let service = MemorySearchService::with_products(products.clone());

        let query = SearchQuery::new().with_text("beta");
        let remote = service.search(&query).await.unwrap();
        let local = query.execute(&products);

        assert_eq!(remote.items.len(), local.items.len());
        assert_eq!(remote.items[0].name, "Beta");
    }

    #[test]
    fn test_device_storage() {
        let storage = MemoryDeviceStorage::new();
        storage.set("virke_cart", "{}").unwrap();
        assert_eq!(storage.get("virke_cart").unwrap().as_deref(), Some("{}"));

        storage.remove("virke_cart").unwrap();
        assert!(storage.get("virke_cart").unwrap().is_none());
        // Removing a missing key is a no-op
        assert!(storage.remove("virke_cart").is_ok());
    }
}
