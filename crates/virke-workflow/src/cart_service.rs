//! Cart persistence: remote bag rows for signed-in users, device
//! storage for anonymous visitors.
//!
//! Signed-in carts are server-authoritative: every mutation writes the
//! remote rows and then refetches them, reconciling by refetch rather
//! than trusting local optimistic state. Anonymous carts live only on
//! the device: the whole cart is serialized as JSON under one fixed key
//! after every mutation.

use std::sync::Arc;
use tracing::debug;
use virke_commerce::cart::{Cart, CartOwner, ProductConfig};
use virke_commerce::catalog::ProductSnapshot;
use virke_commerce::{QuoteError, QuoteItemId, UserId};
use virke_store::{BagStore, DeviceStorage, Session};

use crate::error::WorkflowError;

/// Fixed device-storage key for the anonymous cart.
pub const CART_STORAGE_KEY: &str = "virke_cart";

/// Persists cart mutations to whichever backing the owner uses.
#[derive(Clone)]
pub struct CartService {
    bags: Arc<dyn BagStore>,
    device: Arc<dyn DeviceStorage>,
}

impl CartService {
    pub fn new(bags: Arc<dyn BagStore>, device: Arc<dyn DeviceStorage>) -> Self {
        Self { bags, device }
    }

    /// Load the cart for a session: remote rows for a signed-in user,
    /// the device-storage entry for an anonymous visitor.
    pub async fn load(&self, session: Option<&Session>) -> Result<Cart, WorkflowError> {
        match session {
            Some(session) => {
                let mut cart = Cart::for_user(session.user_id.clone());
                cart.items = self.bags.items_for_user(&session.user_id).await?;
                Ok(cart)
            }
            None => match self.device.get(CART_STORAGE_KEY)? {
                Some(json) => {
                    let cart: Cart =
                        serde_json::from_str(&json).map_err(QuoteError::from)?;
                    Ok(cart)
                }
                None => Ok(Cart::anonymous()),
            },
        }
    }

    /// Append a new line item and persist.
    pub async fn add_item(
        &self,
        cart: &mut Cart,
        product: ProductSnapshot,
        config: ProductConfig,
    ) -> Result<QuoteItemId, WorkflowError> {
        let id = cart.add_item(product, config)?;
        debug!(item = id.as_str(), "cart line added");

        match cart.owner.clone() {
            CartOwner::User(user_id) => {
                let item = cart
                    .get_item(&id)
                    .cloned()
                    .ok_or(QuoteError::ItemNotInCart(id.as_str().to_string()))?;
                self.bags.insert_item(&user_id, item).await?;
                self.refetch(cart, &user_id).await?;
            }
            CartOwner::Anonymous => self.persist_local(cart)?,
        }
        Ok(id)
    }

    /// Remove a line item and persist. Idempotent: a missing ID is a
    /// no-op.
    pub async fn remove_item(
        &self,
        cart: &mut Cart,
        id: &QuoteItemId,
    ) -> Result<bool, WorkflowError> {
        let removed = cart.remove_item(id);
        if !removed {
            return Ok(false);
        }
        debug!(item = id.as_str(), "cart line removed");

        match cart.owner.clone() {
            CartOwner::User(user_id) => {
                self.bags.delete_item(&user_id, id).await?;
                self.refetch(cart, &user_id).await?;
            }
            CartOwner::Anonymous => self.persist_local(cart)?,
        }
        Ok(true)
    }

    /// Replace a line item's configuration wholesale and persist.
    pub async fn update_item(
        &self,
        cart: &mut Cart,
        id: &QuoteItemId,
        config: ProductConfig,
    ) -> Result<bool, WorkflowError> {
        let updated = cart.update_item(id, config.clone())?;
        if !updated {
            return Ok(false);
        }
        debug!(item = id.as_str(), "cart line updated");

        match cart.owner.clone() {
            CartOwner::User(user_id) => {
                self.bags.update_item(&user_id, id, config).await?;
                self.refetch(cart, &user_id).await?;
            }
            CartOwner::Anonymous => self.persist_local(cart)?,
        }
        Ok(true)
    }

    /// Empty the cart and its persisted copy: remote rows are deleted
    /// for signed-in users, the device-storage entry is erased for
    /// anonymous visitors.
    pub async fn clear(&self, cart: &mut Cart) -> Result<(), WorkflowError> {
        cart.clear();
        debug!("cart cleared");

        match cart.owner.clone() {
            CartOwner::User(user_id) => self.bags.clear_for_user(&user_id).await?,
            CartOwner::Anonymous => self.device.remove(CART_STORAGE_KEY)?,
        }
        Ok(())
    }

    /// Rehydrate the cart from the server copy. The server is the
    /// source of truth for signed-in carts; concurrent writers are
    /// last-write-wins.
    async fn refetch(&self, cart: &mut Cart, user_id: &UserId) -> Result<(), WorkflowError> {
        cart.items = self.bags.items_for_user(user_id).await?;
        Ok(())
    }

    fn persist_local(&self, cart: &Cart) -> Result<(), WorkflowError> {
        let json = serde_json::to_string(cart).map_err(QuoteError::from)?;
        self.device.set(CART_STORAGE_KEY, &json)?;
        Ok(())
    }

    /// Re-insert every local line into the user's remote bag. Used when
    /// an anonymous visitor signs in with a non-empty device cart.
    pub async fn adopt_anonymous_cart(
        &self,
        session: &Session,
    ) -> Result<Cart, WorkflowError> {
        let local = self.load(None).await?;
        for item in &local.items {
            self.bags.insert_item(&session.user_id, item.clone()).await?;
        }
        self.device.remove(CART_STORAGE_KEY)?;
        self.load(Some(session)).await
    }
}
