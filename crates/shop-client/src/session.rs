//! # Session Store
//!
//! Owns the process-wide "is authenticated" flag and every transition of it:
//! restoring a session at start-up, login, logout, and the forced logout that
//! follows a failed silent renewal.

use crate::cart::CartCountStore;
use crate::interceptor::{SessionClient, TOKEN_PATH};
use serde::Serialize;
use shop_core::{
    ApiRequest, AuthState, BoxedNavigator, BoxedProfileCache, CartCount, ListenerId, Route,
    SessionEvent, SessionEvents, SessionListener, ShopResult, UserProfile,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Session verification endpoint (returns the user profile)
pub const VERIFY_PATH: &str = "/token/verify_login/";

/// Logout endpoint
pub const LOGOUT_PATH: &str = "/token/logout/";

/// Login form payload
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything needed to end a session client-side.
///
/// Registered on the event bus, so it must not hold the client itself.
struct SessionTeardown {
    auth: AuthState,
    cart_count: CartCount,
    profile: BoxedProfileCache,
    navigator: BoxedNavigator,
}

impl SessionTeardown {
    fn end_session(&self) {
        if let Err(e) = self.profile.clear() {
            warn!("Failed to clear cached profile: {}", e);
        }
        self.auth.set(false);
        self.cart_count.set(0);
        self.navigator.navigate(Route::Login);
    }
}

impl SessionListener for SessionTeardown {
    fn on_event(&self, event: SessionEvent) {
        match event {
            SessionEvent::RenewalFailed => {
                info!("Session could not be renewed, logging out");
                self.end_session();
            }
        }
    }
}

/// Keeps the teardown registered on the bus while any store clone is alive
struct TeardownRegistration {
    events: SessionEvents,
    id: ListenerId,
}

impl Drop for TeardownRegistration {
    fn drop(&mut self) {
        self.events.unsubscribe(self.id);
    }
}

/// Reactive authentication state plus the session lifecycle operations.
///
/// Cheap to clone; clones share the same flag. Once the last clone is
/// dropped the store stops listening for renewal failures.
#[derive(Clone)]
pub struct SessionStore {
    client: SessionClient,
    cart: CartCountStore,
    teardown: Arc<SessionTeardown>,
    _registration: Arc<TeardownRegistration>,
}

impl SessionStore {
    /// Create the store and subscribe it to renewal failures on `client`
    pub fn new(
        client: SessionClient,
        cart: CartCountStore,
        profile: BoxedProfileCache,
        navigator: BoxedNavigator,
    ) -> Self {
        let teardown = Arc::new(SessionTeardown {
            auth: AuthState::default(),
            cart_count: cart.counter(),
            profile,
            navigator,
        });
        let registration = TeardownRegistration {
            events: client.events().clone(),
            id: client.events().subscribe(teardown.clone()),
        };

        Self {
            client,
            cart,
            teardown,
            _registration: Arc::new(registration),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.teardown.auth.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.teardown.auth.subscribe()
    }

    /// Cached profile snapshot, for greeting UI
    pub fn profile(&self) -> Option<UserProfile> {
        self.teardown.profile.load()
    }

    pub fn cart(&self) -> &CartCountStore {
        &self.cart
    }

    /// The only way consumers change the flag. Becoming authenticated
    /// refreshes the cart count.
    pub async fn set_authenticated(&self, authenticated: bool) {
        let changed = self.teardown.auth.set(authenticated);
        if changed && authenticated {
            self.cart.fetch_count().await;
        }
    }

    /// Restore a previous session at start-up.
    ///
    /// Only a cached profile makes a verification call worthwhile. Any
    /// verification failure, network or auth, ends the session.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> bool {
        if self.teardown.profile.load().is_none() {
            debug!("No cached profile, starting anonymous");
            return false;
        }

        match self.client.request(&ApiRequest::post(VERIFY_PATH)).await {
            Ok(_) => {
                info!("Restored session");
                self.set_authenticated(true).await;
                true
            }
            Err(e) => {
                warn!("Session verification failed: {}", e);
                self.teardown.end_session();
                false
            }
        }
    }

    /// Obtain credentials, fetch and cache the profile, and go home.
    ///
    /// Failures are returned untouched for the login form and change no state.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> ShopResult<UserProfile> {
        self.client
            .request(&ApiRequest::post(TOKEN_PATH).with_json(credentials)?)
            .await?;

        let profile: UserProfile = self.client.json(&ApiRequest::post(VERIFY_PATH)).await?;

        if let Err(e) = self.teardown.profile.store(&profile) {
            warn!("Failed to cache profile: {}", e);
        }
        self.set_authenticated(true).await;
        self.teardown.navigator.navigate(Route::Home);

        info!("Logged in");
        Ok(profile)
    }

    /// Tell the backend (best effort) and end the session locally regardless.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Err(e) = self.client.request(&ApiRequest::post(LOGOUT_PATH)).await {
            debug!("Logout call failed, ending session locally: {}", e);
        }
        self.teardown.end_session();
        info!("Logged out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CART_COUNT_PATH;
    use crate::interceptor::REFRESH_PATH;
    use crate::testing::{failure, ok, unauthorized, unreachable, ScriptedTransport};
    use serde_json::json;
    use shop_core::{MemoryProfileCache, ProfileCache, RecordingNavigator, ShopError};

    struct Harness {
        transport: Arc<ScriptedTransport>,
        profile: Arc<MemoryProfileCache>,
        navigator: Arc<RecordingNavigator>,
        session: SessionStore,
    }

    fn harness(transport: ScriptedTransport, profile: MemoryProfileCache) -> Harness {
        let transport = Arc::new(transport);
        let profile = Arc::new(profile);
        let navigator = Arc::new(RecordingNavigator::new());
        let client = SessionClient::new(transport.clone());
        let session = SessionStore::new(
            client.clone(),
            CartCountStore::new(client),
            profile.clone(),
            navigator.clone(),
        );
        Harness {
            transport,
            profile,
            navigator,
            session,
        }
    }

    fn returning_user() -> MemoryProfileCache {
        MemoryProfileCache::with_profile(UserProfile::new("rex"))
    }

    #[tokio::test]
    async fn test_fresh_start_makes_no_calls() {
        let h = harness(ScriptedTransport::new(), MemoryProfileCache::new());

        assert!(!h.session.initialize().await);

        assert!(!h.session.is_authenticated());
        assert!(h.transport.requests().is_empty());
        assert!(h.navigator.history().is_empty());
    }

    #[tokio::test]
    async fn test_restore_with_cached_profile() {
        let h = harness(
            ScriptedTransport::new()
                .always(VERIFY_PATH, ok(json!({"username": "rex"})))
                .always(CART_COUNT_PATH, ok(json!({"count": 2}))),
            returning_user(),
        );

        assert!(h.session.initialize().await);

        assert!(h.session.is_authenticated());
        assert_eq!(h.transport.count(VERIFY_PATH), 1);
        assert_eq!(h.transport.count(CART_COUNT_PATH), 1);
        assert_eq!(h.session.cart().count(), 2);
        assert_eq!(h.session.profile().unwrap().username, "rex");
    }

    #[tokio::test]
    async fn test_failed_restore_ends_session() {
        for outcome in [failure(500), unreachable()] {
            let h = harness(
                ScriptedTransport::new().always(VERIFY_PATH, outcome),
                returning_user(),
            );

            assert!(!h.session.initialize().await);

            assert!(!h.session.is_authenticated());
            assert!(h.profile.load().is_none());
            assert_eq!(h.navigator.last(), Some(Route::Login));
            assert_eq!(h.transport.count(CART_COUNT_PATH), 0);
        }
    }

    #[tokio::test]
    async fn test_restore_with_expired_session_renews_first() {
        let h = harness(
            ScriptedTransport::new()
                .then(VERIFY_PATH, unauthorized())
                .then(VERIFY_PATH, ok(json!({"username": "rex"})))
                .always(REFRESH_PATH, ok(json!({})))
                .always(CART_COUNT_PATH, ok(json!({"count": 0}))),
            returning_user(),
        );

        assert!(h.session.initialize().await);
        assert_eq!(h.transport.count(REFRESH_PATH), 1);
        assert!(h.profile.load().is_some());
    }

    #[tokio::test]
    async fn test_restore_with_dead_refresh_credential() {
        let h = harness(
            ScriptedTransport::new()
                .always(VERIFY_PATH, unauthorized())
                .always(REFRESH_PATH, failure(401)),
            returning_user(),
        );

        assert!(!h.session.initialize().await);

        assert!(!h.session.is_authenticated());
        assert!(h.profile.load().is_none());
        assert_eq!(h.navigator.last(), Some(Route::Login));
    }

    #[tokio::test]
    async fn test_renewal_failure_anywhere_logs_out() {
        let h = harness(
            ScriptedTransport::new()
                .always(VERIFY_PATH, ok(json!({"username": "rex"})))
                .always(CART_COUNT_PATH, ok(json!({"count": 3})))
                .always("/orders/", unauthorized())
                .always(REFRESH_PATH, failure(401)),
            returning_user(),
        );
        h.session.initialize().await;
        assert!(h.session.is_authenticated());
        let mut rx = h.session.subscribe();

        let err = h
            .session
            .client
            .request(&ApiRequest::get("/orders/"))
            .await
            .unwrap_err();

        assert!(err.is_auth_failure());
        assert!(!h.session.is_authenticated());
        assert!(rx.has_changed().unwrap());
        assert!(!*rx.borrow_and_update());
        assert!(h.profile.load().is_none());
        assert_eq!(h.session.cart().count(), 0);
        assert_eq!(h.navigator.last(), Some(Route::Login));
    }

    #[tokio::test]
    async fn test_login_caches_profile_and_counts_cart() {
        let h = harness(
            ScriptedTransport::new()
                .always(TOKEN_PATH, ok(json!({})))
                .always(VERIFY_PATH, ok(json!({"username": "rex", "email": "rex@example.com"})))
                .always(CART_COUNT_PATH, ok(json!({"count": 1}))),
            MemoryProfileCache::new(),
        );

        let profile = h.session.login(&Credentials::new("rex", "bone")).await.unwrap();

        assert_eq!(profile.email.as_deref(), Some("rex@example.com"));
        assert_eq!(h.profile.load(), Some(profile));
        assert!(h.session.is_authenticated());
        assert_eq!(h.session.cart().count(), 1);
        assert_eq!(h.navigator.last(), Some(Route::Home));

        let login = &h.transport.requests()[0];
        assert_eq!(login.body, Some(json!({"username": "rex", "password": "bone"})));
    }

    #[tokio::test]
    async fn test_rejected_login_changes_nothing() {
        let h = harness(
            ScriptedTransport::new().always(
                TOKEN_PATH,
                Err(ShopError::from_status(
                    401,
                    json!({"detail": "No active account found with the given credentials"}),
                )),
            ),
            MemoryProfileCache::new(),
        );

        let err = h.session.login(&Credentials::new("rex", "wrong")).await.unwrap_err();

        assert!(err.is_auth_failure());
        assert_eq!(h.transport.count(REFRESH_PATH), 0);
        assert!(!h.session.is_authenticated());
        assert!(h.profile.load().is_none());
        assert!(h.navigator.history().is_empty());
    }

    #[tokio::test]
    async fn test_logout_ignores_backend_failure() {
        let h = harness(
            ScriptedTransport::new()
                .always(VERIFY_PATH, ok(json!({"username": "rex"})))
                .always(CART_COUNT_PATH, ok(json!({"count": 3})))
                .always(LOGOUT_PATH, failure(500)),
            returning_user(),
        );
        h.session.initialize().await;

        h.session.logout().await;

        assert_eq!(h.transport.count(LOGOUT_PATH), 1);
        assert!(!h.session.is_authenticated());
        assert!(h.profile.load().is_none());
        assert_eq!(h.session.cart().count(), 0);
        assert_eq!(h.navigator.last(), Some(Route::Login));
    }

    #[tokio::test]
    async fn test_setter_only_counts_on_transition() {
        let h = harness(
            ScriptedTransport::new().always(CART_COUNT_PATH, ok(json!({"count": 1}))),
            MemoryProfileCache::new(),
        );

        h.session.set_authenticated(true).await;
        h.session.set_authenticated(true).await;
        h.session.set_authenticated(false).await;

        assert_eq!(h.transport.count(CART_COUNT_PATH), 1);
        assert!(!h.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_dropped_store_stops_listening() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = SessionClient::new(transport);
        let navigator = Arc::new(RecordingNavigator::new());

        let first = SessionStore::new(
            client.clone(),
            CartCountStore::new(client.clone()),
            Arc::new(MemoryProfileCache::new()),
            navigator.clone(),
        );
        let clone = first.clone();
        assert_eq!(client.events().listener_count(), 1);

        drop(first);
        assert_eq!(client.events().listener_count(), 1);
        drop(clone);
        assert_eq!(client.events().listener_count(), 0);

        let _second = SessionStore::new(
            client.clone(),
            CartCountStore::new(client.clone()),
            Arc::new(MemoryProfileCache::new()),
            navigator.clone(),
        );
        client.events().publish(SessionEvent::RenewalFailed);

        assert_eq!(client.events().listener_count(), 1);
        assert_eq!(navigator.history(), vec![Route::Login]);
    }
}
