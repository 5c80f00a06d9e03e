//! # Session Refresh Interceptor
//!
//! [`SessionClient`] wraps a [`Transport`] and heals expired sessions
//! transparently. Per original request:
//!
//! ```text
//! Sent ──401──▶ RefreshAttempted ──ok──▶ Retried(once) ──▶ Done
//!                      │
//!                      └──failure──▶ RenewalFailed published, original 401 returned
//! ```
//!
//! The credential-issue and renewal endpoints are never renewed, and a
//! retried request is never intercepted again.
//!
//! Renewals are coalesced: each request remembers the renewal epoch it was
//! sent under, and a request failing after some other request already renewed
//! reuses that outcome instead of renewing again. At most one renewal call is
//! in flight at any time.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use shop_core::{
    ApiRequest, ApiResponse, BoxedTransport, SessionEvent, SessionEvents, ShopResult, Transport,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Credential-issue (login) endpoint
pub const TOKEN_PATH: &str = "/token/";

/// Silent renewal endpoint
pub const REFRESH_PATH: &str = "/token/refresh/";

#[derive(Debug, Default)]
struct Renewal {
    epoch: u64,
    succeeded: bool,
}

struct Inner {
    transport: BoxedTransport,
    events: SessionEvents,
    renewal: Mutex<Renewal>,
    /// Mirrors `renewal.epoch` so requests can read it without waiting
    epoch: AtomicU64,
}

/// The single authenticated client every surface shares.
///
/// Cheap to clone; clones share the transport, event bus and renewal state.
#[derive(Clone)]
pub struct SessionClient {
    inner: Arc<Inner>,
}

impl SessionClient {
    /// Create a client with its own event bus
    pub fn new(transport: BoxedTransport) -> Self {
        Self::with_events(transport, SessionEvents::new())
    }

    /// Create a client publishing on an existing event bus
    pub fn with_events(transport: BoxedTransport, events: SessionEvents) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                events,
                renewal: Mutex::new(Renewal::default()),
                epoch: AtomicU64::new(0),
            }),
        }
    }

    /// Bus on which `SessionEvent::RenewalFailed` is published
    pub fn events(&self) -> &SessionEvents {
        &self.inner.events
    }

    /// Send a request, renewing the session once on authorization failure.
    #[instrument(
        skip(self, request),
        fields(method = %request.method, path = %request.path, request_id = %uuid::Uuid::new_v4())
    )]
    pub async fn request(&self, request: &ApiRequest) -> ShopResult<ApiResponse> {
        let seen = self.inner.epoch.load(Ordering::Acquire);

        match self.inner.transport.send(request).await {
            Err(err) if err.is_auth_failure() && is_renewable(request) => {
                if self.renew(seen).await {
                    debug!("Retrying after renewal");
                    self.inner.transport.send(request).await
                } else {
                    Err(err)
                }
            }
            outcome => outcome,
        }
    }

    /// Send a request and decode the response body
    pub async fn json<T: DeserializeOwned>(&self, request: &ApiRequest) -> ShopResult<T> {
        self.request(request).await?.json()
    }

    /// Renew the session unless a renewal already completed since `seen`.
    ///
    /// Returns whether the session is usable again.
    async fn renew(&self, seen: u64) -> bool {
        let mut renewal = self.inner.renewal.lock().await;

        if renewal.epoch != seen {
            debug!(
                epoch = renewal.epoch,
                succeeded = renewal.succeeded,
                "Reusing concurrent renewal outcome"
            );
            return renewal.succeeded;
        }

        // Straight to the transport: the renewal call is never intercepted
        let result = self
            .inner
            .transport
            .send(&ApiRequest::post(REFRESH_PATH))
            .await;

        renewal.epoch += 1;
        renewal.succeeded = result.is_ok();
        self.inner.epoch.store(renewal.epoch, Ordering::Release);
        let succeeded = renewal.succeeded;
        drop(renewal);

        match result {
            Ok(_) => info!("Session renewed"),
            Err(e) => {
                warn!("Session renewal failed: {}", e);
                self.inner.events.publish(SessionEvent::RenewalFailed);
            }
        }

        succeeded
    }
}

#[async_trait]
impl Transport for SessionClient {
    async fn send(&self, request: &ApiRequest) -> ShopResult<ApiResponse> {
        self.request(request).await
    }
}

/// Requests to the login and renewal endpoints must not trigger renewal
fn is_renewable(request: &ApiRequest) -> bool {
    request.path != REFRESH_PATH && request.path != TOKEN_PATH
}
