//! The persisted quote entity and its status lifecycle.

use crate::cart::QuoteItem;
use crate::error::QuoteError;
use crate::ids::{CustomerId, ProductId, QuoteId, QuoteItemId, UserId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Quote status.
///
/// No formal transition table is enforced; the UI offers contextual next
/// actions via [`QuoteStatus::next_actions`], and staff may set any status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum QuoteStatus {
    /// Saved by the customer, not yet submitted for review.
    Draft,
    /// Submitted, awaiting staff review.
    #[default]
    Pending,
    /// Staff are working on the quote.
    Processing,
    /// Priced and ready to send.
    Ready,
    /// Sent to the customer.
    Sent,
    /// Accepted and fulfilled; stock has been decremented.
    Completed,
    /// Rejected by staff or customer.
    Rejected,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Pending => "pending",
            QuoteStatus::Processing => "processing",
            QuoteStatus::Ready => "ready",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Completed => "completed",
            QuoteStatus::Rejected => "rejected",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "Draft",
            QuoteStatus::Pending => "Pending",
            QuoteStatus::Processing => "Processing",
            QuoteStatus::Ready => "Ready",
            QuoteStatus::Sent => "Sent",
            QuoteStatus::Completed => "Completed",
            QuoteStatus::Rejected => "Rejected",
        }
    }

    /// Contextual next actions offered by the admin UI.
    pub fn next_actions(&self) -> &'static [QuoteStatus] {
        match self {
            QuoteStatus::Draft => &[QuoteStatus::Pending],
            QuoteStatus::Pending => &[QuoteStatus::Processing, QuoteStatus::Rejected],
            QuoteStatus::Processing => &[QuoteStatus::Ready, QuoteStatus::Rejected],
            QuoteStatus::Ready => &[QuoteStatus::Sent, QuoteStatus::Rejected],
            QuoteStatus::Sent => &[QuoteStatus::Completed, QuoteStatus::Rejected],
            QuoteStatus::Completed => &[],
            QuoteStatus::Rejected => &[],
        }
    }

    /// Check if the status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, QuoteStatus::Completed | QuoteStatus::Rejected)
    }
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for QuoteStatus {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(QuoteStatus::Draft),
            "pending" => Ok(QuoteStatus::Pending),
            "processing" => Ok(QuoteStatus::Processing),
            "ready" => Ok(QuoteStatus::Ready),
            "sent" => Ok(QuoteStatus::Sent),
            "completed" => Ok(QuoteStatus::Completed),
            "rejected" => Ok(QuoteStatus::Rejected),
            other => Err(QuoteError::ValidationError(format!(
                "unknown quote status: {other}"
            ))),
        }
    }
}

/// Who a quote belongs to.
///
/// Exactly one of an authenticated user or a staff-created simple
/// customer; the enum makes the mutual exclusion structural.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteCustomer {
    /// An authenticated account.
    User(UserId),
    /// A walk-in/offline customer record created by staff.
    Simple(CustomerId),
}

impl QuoteCustomer {
    /// The owning user ID, when the quote belongs to an account.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            QuoteCustomer::User(id) => Some(id),
            QuoteCustomer::Simple(_) => None,
        }
    }
}

/// A submitted, persisted quote.
///
/// Distinct from the in-memory cart: created by the submission workflow,
/// status mutated only by the admin lifecycle manager, never deleted by
/// normal lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    /// Unique quote identifier.
    pub id: QuoteId,
    /// Human-readable quote number, e.g. "Q-2026-0421". A display label,
    /// not a primary key; the limited random space makes collisions
    /// possible and accepted.
    pub quote_number: String,
    /// Current status.
    pub status: QuoteStatus,
    /// The customer this quote belongs to.
    pub customer: QuoteCustomer,
    /// Total after discount.
    pub total_amount: Money,
    /// Discount code, if one was applied.
    pub discount_code: Option<String>,
    /// Discount percent (0-100), if one was applied.
    pub discount_percent: Option<f64>,
    /// Free-text note.
    pub note: Option<String>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Quote {
    /// Create a new quote.
    pub fn new(customer: QuoteCustomer, total_amount: Money, status: QuoteStatus) -> Self {
        let now = current_timestamp();
        Self {
            id: QuoteId::generate(),
            quote_number: Self::format_quote_number(year_of_unix(now), 0),
            status,
            customer,
            total_amount,
            discount_code: None,
            discount_percent: None,
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Format a quote number: `Q-<year>-<4-digit-zero-padded suffix>`.
    pub fn format_quote_number(year: i64, suffix: u16) -> String {
        format!("Q-{}-{:04}", year, suffix % 10000)
    }

    /// Set the quote number (workflow supplies the random suffix).
    pub fn with_quote_number(mut self, quote_number: impl Into<String>) -> Self {
        self.quote_number = quote_number.into();
        self
    }

    /// Set a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Update the status.
    pub fn set_status(&mut self, status: QuoteStatus) {
        self.status = status;
        self.updated_at = current_timestamp();
    }

    /// Set a percent discount (0-100) for display/audit.
    pub fn set_percent_discount(
        &mut self,
        code: Option<String>,
        percent: f64,
    ) -> Result<(), QuoteError> {
        if !(0.0..=100.0).contains(&percent) {
            return Err(QuoteError::InvalidDiscountPercent(percent));
        }
        self.discount_code = code;
        self.discount_percent = Some(percent);
        self.updated_at = current_timestamp();
        Ok(())
    }

    /// Apply a flat discount amount to the total.
    ///
    /// Rejected when the new total would be negative; the total is left
    /// unchanged in that case. On success the quote moves to `ready`.
    /// Returns the new total.
    pub fn apply_flat_discount(&mut self, amount: Money) -> Result<Money, QuoteError> {
        let new_total =
            self.total_amount
                .try_subtract(&amount)
                .ok_or(QuoteError::CurrencyMismatch {
                    expected: self.total_amount.currency.code().to_string(),
                    got: amount.currency.code().to_string(),
                })?;
        if new_total.is_negative() {
            return Err(QuoteError::DiscountExceedsTotal {
                discount_cents: amount.amount_cents,
                total_cents: self.total_amount.amount_cents,
            });
        }
        self.total_amount = new_total;
        self.status = QuoteStatus::Ready;
        self.updated_at = current_timestamp();
        Ok(new_total)
    }
}

/// A persisted quote line item.
///
/// Carries the unit price and computed line total as they were at
/// submission time, never recomputed from the live product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteLineItem {
    /// Unique line item identifier.
    pub id: QuoteItemId,
    /// Owning quote.
    pub quote_id: QuoteId,
    /// Source product, if it still resolves.
    pub product_id: Option<ProductId>,
    /// Product name at submission time.
    pub product_name: String,
    /// Configured material.
    pub material: String,
    /// Configured length in millimetres.
    pub length_mm: i64,
    /// Planed or rough-sawn.
    pub is_planed: bool,
    /// Quantity.
    pub quantity: i64,
    /// Unit price at submission time.
    pub unit_price: Money,
    /// Line total at submission time.
    pub line_total: Money,
    /// Free-text note for this line.
    pub note: Option<String>,
}

impl QuoteLineItem {
    /// Build a persisted line from a cart line.
    ///
    /// Returns None for unresolved cart lines; the workflow skips those
    /// the same way totals do.
    pub fn from_cart_item(quote_id: &QuoteId, item: &QuoteItem) -> Option<Self> {
        let snapshot = item.product.as_ref()?;
        let line_total = item.line_total()?;
        Some(Self {
            id: QuoteItemId::generate(),
            quote_id: quote_id.clone(),
            product_id: Some(snapshot.product_id.clone()),
            product_name: snapshot.name.clone(),
            material: item.config.material.clone(),
            length_mm: item.config.length_mm,
            is_planed: item.config.is_planed,
            quantity: item.config.quantity,
            unit_price: snapshot.price_per_unit,
            line_total,
            note: item.config.note.clone(),
        })
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

/// Civil year of a Unix timestamp (UTC), via days-from-civil inversion.
pub fn year_of_unix(ts: i64) -> i64 {
    let days = ts.div_euclid(86_400);
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    if m <= 2 {
        y + 1
    } else {
        y
    }
}
