//! Simple customer records for walk-in/offline quotes.

use crate::ids::CustomerId;
use serde::{Deserialize, Serialize};

/// Contact details supplied at submission time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactInfo {
    /// Customer name.
    pub name: String,
    /// Email address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
}

impl ContactInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            phone: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// A customer record not backed by an authenticated account.
///
/// Used when staff create quotes on behalf of walk-in customers, or when
/// a submission carries a contact-info override. Explicitly typed, with
/// no loosely typed table access.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimpleCustomer {
    /// Unique customer identifier.
    pub id: CustomerId,
    /// Customer name.
    pub name: String,
    /// Email address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Unix timestamp of creation.
    pub created_at: i64,
}

impl SimpleCustomer {
    /// Create a customer record from contact details.
    pub fn from_contact(contact: ContactInfo) -> Self {
        Self {
            id: CustomerId::generate(),
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
            created_at: current_timestamp(),
        }
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
