//! Scripted transport for unit tests.

use async_trait::async_trait;
use serde_json::Value;
use shop_core::{ApiRequest, ApiResponse, ShopError, ShopResult, Transport};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

/// Answers by path: queued one-shot outcomes first, then a standing outcome,
/// otherwise 404. Every request is logged.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    queued: Mutex<HashMap<String, VecDeque<ShopResult<ApiResponse>>>>,
    standing: Mutex<HashMap<String, ShopResult<ApiResponse>>>,
    log: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Next request to `path` gets `outcome`
    pub(crate) fn then(self, path: &str, outcome: ShopResult<ApiResponse>) -> Self {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(path.to_string())
            .or_default()
            .push_back(outcome);
        self
    }

    /// Every request to `path` (once the queue is drained) gets `outcome`
    pub(crate) fn always(self, path: &str, outcome: ShopResult<ApiResponse>) -> Self {
        self.standing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string(), outcome);
        self
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub(crate) fn count(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path == path).count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> ShopResult<ApiResponse> {
        // Suspend like a real network call so concurrent callers interleave
        tokio::task::yield_now().await;

        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let queued = self
            .queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&request.path)
            .and_then(VecDeque::pop_front);
        if let Some(outcome) = queued {
            return outcome;
        }

        self.standing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&request.path)
            .cloned()
            .unwrap_or_else(|| Err(ShopError::from_status(404, Value::Null)))
    }
}

pub(crate) fn ok(body: Value) -> ShopResult<ApiResponse> {
    Ok(ApiResponse::ok(body))
}

pub(crate) fn unauthorized() -> ShopResult<ApiResponse> {
    Err(ShopError::from_status(
        401,
        serde_json::json!({"detail": "Given token not valid for any token type"}),
    ))
}

pub(crate) fn failure(status: u16) -> ShopResult<ApiResponse> {
    Err(ShopError::from_status(status, Value::Null))
}

pub(crate) fn unreachable() -> ShopResult<ApiResponse> {
    Err(ShopError::Network("connection refused".to_string()))
}
