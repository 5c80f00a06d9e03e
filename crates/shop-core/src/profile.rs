//! # Profile Snapshot
//!
//! The locally cached user profile. It feeds greeting UI and tells the
//! session layer whether a previous login is worth verifying; it is never the
//! source of truth for authentication.

use crate::error::ShopResult;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

/// Fixed key the profile snapshot is stored under
pub const PROFILE_KEY: &str = "e-user";

/// Profile returned by the verify-login endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,

    #[serde(default)]
    pub email: Option<String>,

    /// Any additional fields the backend sends
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserProfile {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Local persistence for the profile snapshot
pub trait ProfileCache: Send + Sync {
    /// Cached profile, if any. Unreadable records count as absent.
    fn load(&self) -> Option<UserProfile>;

    fn store(&self, profile: &UserProfile) -> ShopResult<()>;

    /// Remove the snapshot. Removing an absent snapshot is not an error.
    fn clear(&self) -> ShopResult<()>;
}

/// Type alias for a shared profile cache
pub type BoxedProfileCache = Arc<dyn ProfileCache>;

/// In-process profile cache
#[derive(Debug, Default)]
pub struct MemoryProfileCache {
    slot: Mutex<Option<UserProfile>>,
}

impl MemoryProfileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache pre-populated with a snapshot (a returning user)
    pub fn with_profile(profile: UserProfile) -> Self {
        Self {
            slot: Mutex::new(Some(profile)),
        }
    }
}

impl ProfileCache for MemoryProfileCache {
    fn load(&self) -> Option<UserProfile> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store(&self, profile: &UserProfile) -> ShopResult<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(profile.clone());
        Ok(())
    }

    fn clear(&self) -> ShopResult<()> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }
}
