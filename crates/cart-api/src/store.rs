//! # Cart Store
//!
//! In-memory carts keyed by id. One lock guards the whole map, so each
//! request sees a cart either before or after another request's mutation,
//! never half-way through. Carts live for the lifetime of the process.

use cart_core::{Cart, CartError, CartResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Shared, cloneable handle to the cart map
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    carts: Arc<RwLock<HashMap<Uuid, Cart>>>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty cart and return its id
    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.carts.write().await.insert(id, Cart::new());
        id
    }

    /// Read a cart
    pub async fn read<T>(&self, id: Uuid, f: impl FnOnce(&Cart) -> T) -> CartResult<T> {
        let carts = self.carts.read().await;
        let cart = carts.get(&id).ok_or_else(|| not_found(id))?;
        Ok(f(cart))
    }

    /// Mutate a cart under the write lock.
    ///
    /// `f` works on a copy that replaces the stored cart only if `f`
    /// succeeds, so a failed update leaves the cart as it was.
    pub async fn update<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Cart) -> CartResult<T>,
    ) -> CartResult<T> {
        let mut carts = self.carts.write().await;
        let cart = carts.get_mut(&id).ok_or_else(|| not_found(id))?;
        let mut staged = cart.clone();
        let value = f(&mut staged)?;
        *cart = staged;
        Ok(value)
    }

    /// Number of live carts
    pub async fn len(&self) -> usize {
        self.carts.read().await.len()
    }
}

fn not_found(id: Uuid) -> CartError {
    CartError::CartNotFound {
        cart_id: id.to_string(),
    }
}
