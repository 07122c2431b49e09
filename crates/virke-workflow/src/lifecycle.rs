//! Admin quote lifecycle: status changes, discounts, stock decrement.
//!
//! Every status change appends a history entry and notifies the quote's
//! owning customer (when it resolves to an account) plus every other
//! admin, skipping the acting admin. Moving a quote into `completed`
//! additionally runs a stock decrement pass over its line items.

use std::sync::Arc;
use tracing::{info, warn};
use virke_commerce::money::Money;
use virke_commerce::quote::{
    Notification, NotificationKind, Quote, QuoteCustomer, QuoteHistoryEntry, QuoteStatus,
};
use virke_commerce::search::{Pagination, SearchResults};
use virke_commerce::{QuoteError, QuoteId, UserId};
use virke_store::{IdentityService, NotificationStore, ProductStore, QuoteStore};

use crate::error::WorkflowError;
use crate::fanout::notify_each;

/// Mutates persisted quotes on behalf of staff.
pub struct LifecycleService {
    quotes: Arc<dyn QuoteStore>,
    products: Arc<dyn ProductStore>,
    notifications: Arc<dyn NotificationStore>,
    identity: Arc<dyn IdentityService>,
}

impl LifecycleService {
    pub fn new(
        quotes: Arc<dyn QuoteStore>,
        products: Arc<dyn ProductStore>,
        notifications: Arc<dyn NotificationStore>,
        identity: Arc<dyn IdentityService>,
    ) -> Self {
        Self {
            quotes,
            products,
            notifications,
            identity,
        }
    }

    /// Set a quote's status.
    ///
    /// Appends one history entry, notifies the customer and other
    /// admins, and on `completed` decrements stock for every line item.
    /// Notification and stock-decrement failures are logged and
    /// skipped, never propagated.
    pub async fn set_status(
        &self,
        quote_id: &QuoteId,
        status: QuoteStatus,
        actor: &UserId,
    ) -> Result<(), WorkflowError> {
        let mut quote = self
            .quotes
            .get_quote(quote_id)
            .await?
            .ok_or(QuoteError::QuoteNotFound(quote_id.as_str().to_string()))?;

        quote.set_status(status);
        let quote_number = quote.quote_number.clone();
        let customer = quote.customer.clone();
        self.quotes.update_quote(quote).await?;

        self.quotes
            .append_history(
                QuoteHistoryEntry::new(quote_id.clone(), status).by(actor.clone()),
            )
            .await?;

        let recipients = self.status_recipients(&customer, actor).await;
        notify_each(self.notifications.as_ref(), &recipients, |recipient| {
            Notification::new(
                recipient.clone(),
                NotificationKind::QuoteStatusChanged,
                format!("Quote {} is now {}", quote_number, status.display_name()),
            )
            .about_quote(quote_id.clone())
        })
        .await;

        if status == QuoteStatus::Completed {
            self.decrement_stock_for(quote_id).await;
        }

        info!(
            quote = quote_id.as_str(),
            status = status.as_str(),
            actor = actor.as_str(),
            "quote status changed"
        );
        Ok(())
    }

    /// Apply a flat discount amount to a quote's total.
    ///
    /// Rejected when the new total would be negative (total unchanged).
    /// On success the quote moves to `ready` and the discount is
    /// recorded in the history notes. Returns the new total.
    pub async fn apply_discount(
        &self,
        quote_id: &QuoteId,
        amount: Money,
        actor: &UserId,
    ) -> Result<Money, WorkflowError> {
        let mut quote = self
            .quotes
            .get_quote(quote_id)
            .await?
            .ok_or(QuoteError::QuoteNotFound(quote_id.as_str().to_string()))?;

        let new_total = quote.apply_flat_discount(amount)?;
        self.quotes.update_quote(quote).await?;

        self.quotes
            .append_history(
                QuoteHistoryEntry::new(quote_id.clone(), QuoteStatus::Ready)
                    .with_notes(format!("Discount {} applied", amount.display()))
                    .by(actor.clone()),
            )
            .await?;

        info!(
            quote = quote_id.as_str(),
            discount_cents = amount.amount_cents,
            "discount applied"
        );
        Ok(new_total)
    }

    /// Delete a quote and its line items. Destructive and explicit;
    /// never part of the normal lifecycle.
    pub async fn delete_quote(&self, quote_id: &QuoteId) -> Result<(), WorkflowError> {
        self.quotes.delete_quote(quote_id).await?;
        info!(quote = quote_id.as_str(), "quote deleted");
        Ok(())
    }

    /// One page of quotes for the admin list view, newest first.
    pub async fn list_quotes_page(
        &self,
        page: i64,
        per_page: i64,
    ) -> Result<SearchResults<Quote>, WorkflowError> {
        let all = self.quotes.list_quotes().await?;
        let pagination = Pagination::new(page.max(1), per_page.clamp(1, 100), all.len() as i64);
        let items = all
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.per_page as usize)
            .collect();
        Ok(SearchResults::new(items, pagination))
    }

    /// The customer (when it resolves to an account) plus every admin
    /// other than the actor, deduplicated.
    async fn status_recipients(
        &self,
        customer: &QuoteCustomer,
        actor: &UserId,
    ) -> Vec<UserId> {
        let mut recipients = Vec::new();
        if let Some(user_id) = customer.user_id() {
            if user_id != actor {
                recipients.push(user_id.clone());
            }
        }
        match self.identity.admin_user_ids().await {
            Ok(admins) => {
                for admin in admins {
                    if &admin != actor && !recipients.contains(&admin) {
                        recipients.push(admin);
                    }
                }
            }
            Err(e) => warn!(error = %e, "could not resolve admin recipients"),
        }
        recipients
    }

    /// Decrement stock for every line item on a quote, flooring each
    /// product's stock at zero. Per-product failures are logged and the
    /// pass continues.
    async fn decrement_stock_for(&self, quote_id: &QuoteId) {
        let lines = match self.quotes.line_items_for_quote(quote_id).await {
            Ok(lines) => lines,
            Err(e) => {
                warn!(quote = quote_id.as_str(), error = %e, "stock pass could not load line items");
                return;
            }
        };

        for line in lines {
            let Some(product_id) = line.product_id else {
                continue;
            };
            match self.products.get(&product_id).await {
                Ok(Some(mut product)) => {
                    let remaining = product.decrement_stock(line.quantity);
                    if let Err(e) = self.products.set_stock(&product_id, remaining).await {
                        warn!(
                            product = product_id.as_str(),
                            error = %e,
                            "stock update failed, skipping"
                        );
                    }
                }
                Ok(None) => {
                    warn!(
                        product = product_id.as_str(),
                        "product missing during stock pass, skipping"
                    );
                }
                Err(e) => {
                    warn!(
                        product = product_id.as_str(),
                        error = %e,
                        "stock fetch failed, skipping"
                    );
                }
            }
        }
    }
}
