//! # Cart Count Store
//!
//! Pull-based mirror of the server-side cart size. Advisory only: a failed
//! fetch degrades to zero and never surfaces an error.

use crate::interceptor::SessionClient;
use serde::Deserialize;
use shop_core::{ApiRequest, CartCount};
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

/// Cart size endpoint
pub const CART_COUNT_PATH: &str = "/carts/count/";

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u32,
}

/// Shared cart count, refreshed on demand
#[derive(Clone)]
pub struct CartCountStore {
    client: SessionClient,
    count: CartCount,
}

impl CartCountStore {
    pub fn new(client: SessionClient) -> Self {
        Self {
            client,
            count: CartCount::default(),
        }
    }

    /// Last fetched count
    pub fn count(&self) -> u32 {
        self.count.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.count.subscribe()
    }

    /// Handle to the underlying value, without the ability to fetch
    pub fn counter(&self) -> CartCount {
        self.count.clone()
    }

    /// Re-read the count from the backend. Any failure sets it to 0.
    #[instrument(skip(self))]
    pub async fn fetch_count(&self) {
        match self
            .client
            .json::<CountResponse>(&ApiRequest::get(CART_COUNT_PATH))
            .await
        {
            Ok(resp) => {
                debug!(count = resp.count, "Cart count refreshed");
                self.count.set(resp.count);
            }
            Err(e) => {
                warn!("Cart count unavailable, showing 0: {}", e);
                self.count.set(0);
            }
        }
    }

    /// Forget the count without asking the backend (after logout)
    pub fn reset(&self) {
        self.count.set(0);
    }
}
