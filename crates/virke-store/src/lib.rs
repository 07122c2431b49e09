//! External collaborator contracts and reference backends for Virke.
//!
//! The quoting core talks to a hosted backend: identity, table-like
//! relational storage, blob storage, a remote search function, a realtime
//! notification channel, and device-local key-value storage for the
//! anonymous cart. This crate defines those seams as traits and ships
//! in-memory reference backends used by tests and local development.
//!
//! Persistence formats are owned by the backing service; everything here
//! is keyed by opaque IDs with equality/range filters and ordering only.

pub mod error;
pub mod memory;
pub mod session;
pub mod traits;

pub use error::StoreError;
pub use session::Session;
pub use traits::{
    BagStore, BlobStore, CategoryStore, CustomerStore, DeviceStorage, IdentityService,
    NotificationStore, ProductStore, QuoteStore, RealtimeChannel, SearchService,
};
