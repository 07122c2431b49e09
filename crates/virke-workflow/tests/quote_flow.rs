//! End-to-end quoting scenarios: cart to submitted quote to admin
//! lifecycle, over the in-memory reference backends.

use async_trait::async_trait;
use std::sync::Arc;
use virke_commerce::cart::{Cart, ProductConfig};
use virke_commerce::catalog::Product;
use virke_commerce::money::{Currency, Money};
use virke_commerce::quote::{
    Notification, Quote, QuoteCustomer, QuoteHistoryEntry, QuoteLineItem, QuoteStatus,
};
use virke_commerce::{NotificationId, QuoteError, QuoteId, UserId};
use virke_store::memory::{
    MemoryBagStore, MemoryCustomerStore, MemoryDeviceStorage, MemoryIdentityService,
    MemoryNotificationHub, MemoryProductStore, MemoryQuoteStore,
};
use virke_store::{
    BagStore, CustomerStore, NotificationStore, ProductStore, QuoteStore, Session, StoreError,
};
use virke_workflow::{CartService, LifecycleService, SubmissionService, WorkflowError};

struct Env {
    products: Arc<MemoryProductStore>,
    quotes: Arc<MemoryQuoteStore>,
    bags: Arc<MemoryBagStore>,
    customers: Arc<MemoryCustomerStore>,
    notifications: Arc<MemoryNotificationHub>,
    carts: CartService,
    submission: SubmissionService,
    lifecycle: LifecycleService,
}

fn env() -> Env {
    let notifications = Arc::new(MemoryNotificationHub::new());
    let products = Arc::new(MemoryProductStore::new());
    let quotes = Arc::new(MemoryQuoteStore::new());
    let bags = Arc::new(MemoryBagStore::new());
    let customers = Arc::new(MemoryCustomerStore::new());
    let identity = Arc::new(
        MemoryIdentityService::new()
            .with_user("customer-1", "anna@example.com", "hunter2")
            .with_admin("admin-1", "staff1@example.com", "s3cret")
            .with_admin("admin-2", "staff2@example.com", "s3cret"),
    );
    let device = Arc::new(MemoryDeviceStorage::new());

    let carts = CartService::new(bags.clone(), device);
    let submission = SubmissionService::new(
        quotes.clone(),
        customers.clone(),
        notifications.clone(),
        identity.clone(),
        carts.clone(),
    );
    let lifecycle = LifecycleService::new(
        quotes.clone(),
        products.clone(),
        notifications.clone(),
        identity,
    );

    Env {
        products,
        quotes,
        bags,
        customers,
        notifications,
        carts,
        submission,
        lifecycle,
    }
}

fn session() -> Session {
    Session {
        user_id: UserId::new("customer-1"),
        email: "anna@example.com".to_string(),
        is_admin: false,
        expires_at: i64::MAX,
    }
}

fn spruce_stud(stock: i64) -> Product {
    Product::new("Spruce 45x95", "spruce", Money::from_decimal(45.99, Currency::SEK))
        .with_lengths(vec![2400, 3000])
        .with_stock(stock)
}

async fn cart_with_one_line(env: &Env, session: &Session, product: &Product, quantity: i64) -> Cart {
    let mut cart = env.carts.load(Some(session)).await.unwrap();
    env.carts
        .add_item(
            &mut cart,
            product.snapshot(),
            ProductConfig::for_product(product, 2400, quantity),
        )
        .await
        .unwrap();
    cart
}

#[tokio::test]
async fn test_submit_non_draft_end_to_end() {
    let env = env();
    let session = session();
    let product = spruce_stud(10);
    env.products.upsert(product.clone()).await.unwrap();

    let mut cart = cart_with_one_line(&env, &session, &product, 3).await;

    env.submission
        .submit(&mut cart, Some(&session), false, None)
        .await
        .unwrap();

    // 45.99 x 3 = 137.97, status pending
    let all = env.quotes.list_quotes().await.unwrap();
    assert_eq!(all.len(), 1);
    let quote = &all[0];
    assert_eq!(quote.total_amount.amount_cents, 13797);
    assert_eq!(quote.status, QuoteStatus::Pending);
    assert_eq!(quote.customer, QuoteCustomer::User(session.user_id.clone()));
    assert!(quote.quote_number.starts_with("Q-"));

    // One line item with the price snapshot
    let lines = env.quotes.line_items_for_quote(&quote.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].unit_price.amount_cents, 4599);
    assert_eq!(lines[0].line_total.amount_cents, 13797);

    // One history row with status pending
    let history = env.quotes.history_for_quote(&quote.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, QuoteStatus::Pending);

    // Cart cleared, remote rows included
    assert!(cart.is_empty());
    assert!(env
        .bags
        .items_for_user(&session.user_id)
        .await
        .unwrap()
        .is_empty());

    // Every admin got a submission notification
    for admin in ["admin-1", "admin-2"] {
        let inbox = env
            .notifications
            .list_for_user(&UserId::new(admin))
            .await
            .unwrap();
        assert_eq!(inbox.len(), 1, "admin {} not notified", admin);
    }
}

#[tokio::test]
async fn test_submit_as_draft() {
    let env = env();
    let session = session();
    let product = spruce_stud(10);
    let mut cart = cart_with_one_line(&env, &session, &product, 1).await;

    env.submission
        .submit(&mut cart, Some(&session), true, None)
        .await
        .unwrap();

    let all = env.quotes.list_quotes().await.unwrap();
    assert_eq!(all[0].status, QuoteStatus::Draft);
}

#[tokio::test]
async fn test_empty_cart_submission_makes_no_store_call() {
    let env = env();
    let session = session();
    let mut cart = env.carts.load(Some(&session)).await.unwrap();

    let quote_ops = env.quotes.op_count();
    let bag_ops = env.bags.op_count();

    let result = env
        .submission
        .submit(&mut cart, Some(&session), false, None)
        .await;

    assert!(matches!(
        result,
        Err(WorkflowError::Quote(QuoteError::EmptyQuote))
    ));
    assert_eq!(env.quotes.op_count(), quote_ops);
    assert_eq!(env.bags.op_count(), bag_ops);
}

#[tokio::test]
async fn test_anonymous_submission_rejected_and_cart_kept() {
    let env = env();
    let product = spruce_stud(10);

    let mut cart = env.carts.load(None).await.unwrap();
    env.carts
        .add_item(
            &mut cart,
            product.snapshot(),
            ProductConfig::for_product(&product, 2400, 2),
        )
        .await
        .unwrap();

    let result = env.submission.submit(&mut cart, None, false, None).await;

    assert!(matches!(
        result,
        Err(WorkflowError::Quote(QuoteError::AuthRequired))
    ));
    // The cart survives for a retry after sign-in
    assert_eq!(cart.len(), 1);
    assert!(env.quotes.list_quotes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_contact_override_creates_simple_customer() {
    let env = env();
    let session = session();
    let product = spruce_stud(10);
    let mut cart = cart_with_one_line(&env, &session, &product, 1).await;

    let contact = virke_commerce::quote::ContactInfo::new("Walk-in Customer")
        .with_phone("+46 70 123 45 67");
    env.submission
        .submit(&mut cart, Some(&session), false, Some(contact))
        .await
        .unwrap();

    let quote = &env.quotes.list_quotes().await.unwrap()[0];
    let QuoteCustomer::Simple(customer_id) = &quote.customer else {
        panic!("expected a simple customer");
    };
    let record = env.customers.get(customer_id).await.unwrap().unwrap();
    assert_eq!(record.name, "Walk-in Customer");
}

/// Quote store whose inserts always fail.
struct RejectingQuoteStore {
    inner: MemoryQuoteStore,
}

#[async_trait]
impl QuoteStore for RejectingQuoteStore {
    async fn insert_quote(&self, _quote: Quote) -> Result<(), StoreError> {
        Err(StoreError::StorageError("insert rejected".to_string()))
    }

    async fn get_quote(&self, id: &QuoteId) -> Result<Option<Quote>, StoreError> {
        self.inner.get_quote(id).await
    }

    async fn update_quote(&self, quote: Quote) -> Result<(), StoreError> {
        self.inner.update_quote(quote).await
    }

    async fn list_quotes(&self) -> Result<Vec<Quote>, StoreError> {
        self.inner.list_quotes().await
    }

    async fn insert_line_items(&self, items: Vec<QuoteLineItem>) -> Result<(), StoreError> {
        self.inner.insert_line_items(items).await
    }

    async fn line_items_for_quote(&self, id: &QuoteId) -> Result<Vec<QuoteLineItem>, StoreError> {
        self.inner.line_items_for_quote(id).await
    }

    async fn append_history(&self, entry: QuoteHistoryEntry) -> Result<(), StoreError> {
        self.inner.append_history(entry).await
    }

    async fn history_for_quote(
        &self,
        id: &QuoteId,
    ) -> Result<Vec<QuoteHistoryEntry>, StoreError> {
        self.inner.history_for_quote(id).await
    }

    async fn delete_quote(&self, id: &QuoteId) -> Result<(), StoreError> {
        self.inner.delete_quote(id).await
    }
}

#[tokio::test]
async fn test_persistence_failure_reports_error_and_keeps_cart() {
    let env = env();
    let session = session();
    let product = spruce_stud(10);

    let rejecting = Arc::new(RejectingQuoteStore {
        inner: MemoryQuoteStore::new(),
    });
    let identity = Arc::new(MemoryIdentityService::new().with_admin(
        "admin-1",
        "staff1@example.com",
        "s3cret",
    ));
    let submission = SubmissionService::new(
        rejecting,
        env.customers.clone(),
        env.notifications.clone(),
        identity,
        env.carts.clone(),
    );

    let mut cart = cart_with_one_line(&env, &session, &product, 2).await;
    let result = submission
        .submit(&mut cart, Some(&session), false, None)
        .await;

    assert!(matches!(result, Err(WorkflowError::Store(_))));
    // The cart survives for a retry, both in memory and server-side
    assert_eq!(cart.len(), 1);
    assert_eq!(
        env.bags
            .items_for_user(&session.user_id)
            .await
            .unwrap()
            .len(),
        1
    );
}

/// Notification store that rejects inserts for one recipient.
struct FlakyNotifications {
    inner: MemoryNotificationHub,
    fail_for: UserId,
}

#[async_trait]
impl NotificationStore for FlakyNotifications {
    async fn insert(&self, notification: Notification) -> Result<(), StoreError> {
        if notification.user_id == self.fail_for {
            return Err(StoreError::StorageError("insert rejected".to_string()));
        }
        self.inner.insert(notification).await
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Notification>, StoreError> {
        self.inner.list_for_user(user_id).await
    }

    async fn mark_read(&self, id: &NotificationId) -> Result<(), StoreError> {
        self.inner.mark_read(id).await
    }
}

#[tokio::test]
async fn test_single_admin_notification_failure_does_not_fail_submission() {
    let env = env();
    let session = session();
    let product = spruce_stud(10);

    let flaky = Arc::new(FlakyNotifications {
        inner: MemoryNotificationHub::new(),
        fail_for: UserId::new("admin-1"),
    });
    let identity = Arc::new(
        MemoryIdentityService::new()
            .with_admin("admin-1", "staff1@example.com", "s3cret")
            .with_admin("admin-2", "staff2@example.com", "s3cret"),
    );
    let submission = SubmissionService::new(
        env.quotes.clone(),
        env.customers.clone(),
        flaky.clone(),
        identity,
        env.carts.clone(),
    );

    let mut cart = cart_with_one_line(&env, &session, &product, 1).await;
    submission
        .submit(&mut cart, Some(&session), false, None)
        .await
        .unwrap();

    // The failed recipient is skipped, the other admin still notified
    assert!(flaky
        .list_for_user(&UserId::new("admin-1"))
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        flaky
            .list_for_user(&UserId::new("admin-2"))
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(cart.is_empty());
}

#[tokio::test]
async fn test_completion_decrements_stock_floored_at_zero() {
    let env = env();
    let session = session();
    let product = spruce_stud(3);
    env.products.upsert(product.clone()).await.unwrap();

    let mut cart = cart_with_one_line(&env, &session, &product, 5).await;
    env.submission
        .submit(&mut cart, Some(&session), false, None)
        .await
        .unwrap();
    let quote_id = env.quotes.list_quotes().await.unwrap()[0].id.clone();

    let actor = UserId::new("admin-1");
    env.lifecycle
        .set_status(&quote_id, QuoteStatus::Processing, &actor)
        .await
        .unwrap();
    // Quantity 5 against stock 3: floors at 0, still succeeds
    env.lifecycle
        .set_status(&quote_id, QuoteStatus::Completed, &actor)
        .await
        .unwrap();

    let stocked = env.products.get(&product.id).await.unwrap().unwrap();
    assert_eq!(stocked.stock_quantity, 0);

    let quote = env.quotes.get_quote(&quote_id).await.unwrap().unwrap();
    assert_eq!(quote.status, QuoteStatus::Completed);
}

#[tokio::test]
async fn test_status_change_notifies_customer_and_other_admins() {
    let env = env();
    let session = session();
    let product = spruce_stud(10);

    let mut cart = cart_with_one_line(&env, &session, &product, 1).await;
    env.submission
        .submit(&mut cart, Some(&session), false, None)
        .await
        .unwrap();
    let quote_id = env.quotes.list_quotes().await.unwrap()[0].id.clone();

    let actor = UserId::new("admin-1");
    env.lifecycle
        .set_status(&quote_id, QuoteStatus::Processing, &actor)
        .await
        .unwrap();

    // The customer hears about the change
    let customer_inbox = env
        .notifications
        .list_for_user(&session.user_id)
        .await
        .unwrap();
    assert_eq!(customer_inbox.len(), 1);
    assert!(customer_inbox[0].message.contains("Processing"));

    // The acting admin is skipped; submission left one notification each
    let actor_inbox = env.notifications.list_for_user(&actor).await.unwrap();
    assert_eq!(actor_inbox.len(), 1);
    let other_inbox = env
        .notifications
        .list_for_user(&UserId::new("admin-2"))
        .await
        .unwrap();
    assert_eq!(other_inbox.len(), 2);
}

#[tokio::test]
async fn test_status_change_appends_history() {
    let env = env();
    let session = session();
    let product = spruce_stud(10);

    let mut cart = cart_with_one_line(&env, &session, &product, 1).await;
    env.submission
        .submit(&mut cart, Some(&session), false, None)
        .await
        .unwrap();
    let quote_id = env.quotes.list_quotes().await.unwrap()[0].id.clone();

    let actor = UserId::new("admin-1");
    env.lifecycle
        .set_status(&quote_id, QuoteStatus::Processing, &actor)
        .await
        .unwrap();
    env.lifecycle
        .set_status(&quote_id, QuoteStatus::Rejected, &actor)
        .await
        .unwrap();

    let history = env.quotes.history_for_quote(&quote_id).await.unwrap();
    let statuses: Vec<QuoteStatus> = history.iter().map(|h| h.status).collect();
    assert_eq!(
        statuses,
        vec![
            QuoteStatus::Pending,
            QuoteStatus::Processing,
            QuoteStatus::Rejected
        ]
    );
    assert_eq!(history[1].created_by, Some(actor));
}

#[tokio::test]
async fn test_admin_quote_list_paginates() {
    let env = env();
    let session = session();
    let product = spruce_stud(10);

    for _ in 0..3 {
        let mut cart = cart_with_one_line(&env, &session, &product, 1).await;
        env.submission
            .submit(&mut cart, Some(&session), false, None)
            .await
            .unwrap();
    }

    let first = env.lifecycle.list_quotes_page(1, 2).await.unwrap();
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.pagination.total, 3);
    assert!(first.pagination.has_next);

    let second = env.lifecycle.list_quotes_page(2, 2).await.unwrap();
    assert_eq!(second.items.len(), 1);
    assert!(!second.pagination.has_next);
}

#[tokio::test]
async fn test_discount_rejected_when_exceeding_total() {
    let env = env();
    let session = session();
    let product = spruce_stud(10);

    let mut cart = cart_with_one_line(&env, &session, &product, 1).await;
    env.submission
        .submit(&mut cart, Some(&session), false, None)
        .await
        .unwrap();
    let quote_id = env.quotes.list_quotes().await.unwrap()[0].id.clone();
    let actor = UserId::new("admin-1");

    // 45.99 total, 50.00 discount: rejected, total unchanged
    let result = env
        .lifecycle
        .apply_discount(&quote_id, Money::new(5000, Currency::SEK), &actor)
        .await;
    assert!(matches!(
        result,
        Err(WorkflowError::Quote(QuoteError::DiscountExceedsTotal { .. }))
    ));
    let quote = env.quotes.get_quote(&quote_id).await.unwrap().unwrap();
    assert_eq!(quote.total_amount.amount_cents, 4599);
    assert_eq!(quote.status, QuoteStatus::Pending);
}

#[tokio::test]
async fn test_discount_sets_ready_and_records_history() {
    let env = env();
    let session = session();
    let product = spruce_stud(10);

    let mut cart = cart_with_one_line(&env, &session, &product, 2).await;
    env.submission
        .submit(&mut cart, Some(&session), false, None)
        .await
        .unwrap();
    let quote_id = env.quotes.list_quotes().await.unwrap()[0].id.clone();
    let actor = UserId::new("admin-1");

    let new_total = env
        .lifecycle
        .apply_discount(&quote_id, Money::new(1000, Currency::SEK), &actor)
        .await
        .unwrap();
    assert_eq!(new_total.amount_cents, 2 * 4599 - 1000);

    let quote = env.quotes.get_quote(&quote_id).await.unwrap().unwrap();
    assert_eq!(quote.status, QuoteStatus::Ready);

    let history = env.quotes.history_for_quote(&quote_id).await.unwrap();
    let discount_entry = history.last().unwrap();
    assert_eq!(discount_entry.status, QuoteStatus::Ready);
    assert!(discount_entry
        .notes
        .as_deref()
        .unwrap()
        .contains("Discount"));
}
