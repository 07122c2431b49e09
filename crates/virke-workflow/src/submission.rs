//! Quote submission: turns a non-empty cart into a persisted quote.
//!
//! Validation happens before any collaborator call: an empty cart or a
//! missing session fails immediately with no network traffic. The
//! persisted steps are not transactional; a failure mid-way leaves
//! prior rows in place. The cart is only cleared once every required
//! step succeeded, so the user can always retry without losing their
//! lines.

use rand::Rng;
use std::sync::Arc;
use tracing::{info, warn};
use virke_commerce::cart::Cart;
use virke_commerce::quote::{
    year_of_unix, ContactInfo, Notification, NotificationKind, Quote, QuoteCustomer,
    QuoteHistoryEntry, QuoteLineItem, QuoteStatus, SimpleCustomer,
};
use virke_commerce::QuoteError;
use virke_store::{CustomerStore, IdentityService, NotificationStore, QuoteStore, Session};

use crate::cart_service::CartService;
use crate::error::WorkflowError;
use crate::fanout::notify_each;

/// Converts carts into persisted quotes.
pub struct SubmissionService {
    quotes: Arc<dyn QuoteStore>,
    customers: Arc<dyn CustomerStore>,
    notifications: Arc<dyn NotificationStore>,
    identity: Arc<dyn IdentityService>,
    carts: CartService,
}

impl SubmissionService {
    pub fn new(
        quotes: Arc<dyn QuoteStore>,
        customers: Arc<dyn CustomerStore>,
        notifications: Arc<dyn NotificationStore>,
        identity: Arc<dyn IdentityService>,
        carts: CartService,
    ) -> Self {
        Self {
            quotes,
            customers,
            notifications,
            identity,
            carts,
        }
    }

    /// Submit the cart as a quote.
    ///
    /// `is_draft` stores the quote as `draft` instead of `pending`.
    /// `contact_override` attaches a staff-supplied customer record
    /// instead of the session's account.
    ///
    /// On success the cart is cleared (remote rows or the device entry,
    /// per its owner). On failure the cart is left untouched so the
    /// caller can retry.
    pub async fn submit(
        &self,
        cart: &mut Cart,
        session: Option<&Session>,
        is_draft: bool,
        contact_override: Option<ContactInfo>,
    ) -> Result<(), WorkflowError> {
        if cart.is_empty() {
            return Err(QuoteError::EmptyQuote.into());
        }
        let session = session.ok_or(QuoteError::AuthRequired)?;

        let total = cart.calculate_total()?;
        let status = if is_draft {
            QuoteStatus::Draft
        } else {
            QuoteStatus::Pending
        };

        let customer = match contact_override {
            Some(contact) => {
                let record = SimpleCustomer::from_contact(contact);
                let id = record.id.clone();
                self.customers.insert(record).await?;
                QuoteCustomer::Simple(id)
            }
            None => QuoteCustomer::User(session.user_id.clone()),
        };

        let quote = Quote::new(customer, total, status)
            .with_quote_number(generate_quote_number());
        let quote_id = quote.id.clone();
        let quote_number = quote.quote_number.clone();

        self.quotes.insert_quote(quote).await?;

        let lines: Vec<QuoteLineItem> = cart
            .items
            .iter()
            .filter_map(|item| QuoteLineItem::from_cart_item(&quote_id, item))
            .collect();
        self.quotes.insert_line_items(lines).await?;

        self.quotes
            .append_history(
                QuoteHistoryEntry::new(quote_id.clone(), status).with_notes("Quote created"),
            )
            .await?;

        // Best-effort admin fan-out: a failed recipient never fails the
        // submission
        match self.identity.admin_user_ids().await {
            Ok(admins) => {
                notify_each(self.notifications.as_ref(), &admins, |admin| {
                    Notification::new(
                        admin.clone(),
                        NotificationKind::QuoteSubmitted,
                        format!("New quote {} submitted", quote_number),
                    )
                    .about_quote(quote_id.clone())
                })
                .await;
            }
            Err(e) => warn!(error = %e, "could not resolve admin recipients"),
        }

        self.carts.clear(cart).await?;
        info!(
            quote = quote_id.as_str(),
            number = quote_number.as_str(),
            status = status.as_str(),
            "quote submitted"
        );
        Ok(())
    }
}

/// Generate a quote number: `Q-<year>-<4-digit-zero-padded-random>`.
///
/// The limited random space makes collisions possible; the number is a
/// display label, not a key, so they are accepted rather than checked.
fn generate_quote_number() -> String {
    let now = current_timestamp();
    let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
    Quote::format_quote_number(year_of_unix(now), suffix)
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

    #[test]
    fn test_quote_number_shape() {
        let number = generate_quote_number();
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "Q");
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
    }
}
