//! Persisted quotes: entity, status lifecycle, history, notifications.

mod customer;
mod history;
mod notification;
mod quote;

pub use customer::{ContactInfo, SimpleCustomer};
pub use history::QuoteHistoryEntry;
pub use notification::{Notification, NotificationKind, NotificationStatus};
pub use quote::{year_of_unix, Quote, QuoteCustomer, QuoteLineItem, QuoteStatus};
