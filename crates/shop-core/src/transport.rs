//! # Transport Trait
//!
//! The seam between the session layer and the network. The HTTP
//! implementation lives in `shop-client`; tests plug in scripted transports.
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │              Transport (trait)             │
//! │  └── send(ApiRequest) -> ApiResponse       │
//! └────────────────────────────────────────────┘
//!                      ▲
//!          ┌───────────┴───────────┐
//!  ┌───────┴───────┐       ┌───────┴────────┐
//!  │ HttpTransport │       │ SessionClient  │
//!  │ (cookie jar)  │       │ (refresh, wraps│
//!  └───────────────┘       │  a Transport)  │
//!                          └────────────────┘
//! ```

use crate::error::{ShopError, ShopResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// HTTP methods used by the storefront backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request relative to the backend base address.
///
/// Requests are plain values so the refresh protocol can re-issue the exact
/// same method, path and body after a renewal.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base URL, e.g. `/carts/count/`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Sent as `multipart/form-data` instead of a JSON body
    pub upload: Option<FileUpload>,
    /// Attach the ambient session credential (default: true)
    pub with_credentials: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            upload: None,
            with_credentials: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Builder: attach a JSON body
    pub fn with_json<T: Serialize>(mut self, body: &T) -> ShopResult<Self> {
        let value =
            serde_json::to_value(body).map_err(|e| ShopError::Decode(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Builder: attach a file as a multipart form field
    pub fn with_file(mut self, upload: FileUpload) -> Self {
        self.upload = Some(upload);
        self
    }

    /// Builder: append a query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Builder: send without the ambient session credential
    pub fn anonymous(mut self) -> Self {
        self.with_credentials = false;
        self
    }
}

/// A file sent as one field of a multipart form
#[derive(Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Form field name
    pub field: String,
    pub file_name: String,
    /// MIME type, e.g. `image/png`
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(field: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl std::fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileUpload")
            .field("field", &self.field)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A successful (2xx) response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body, `Value::Null` when empty
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    /// Deserialize the body into a typed record
    pub fn json<T: DeserializeOwned>(&self) -> ShopResult<T> {
        T::deserialize(&self.body).map_err(|e| ShopError::Decode(e.to_string()))
    }
}

/// Something that can deliver an [`ApiRequest`] to the backend.
///
/// Implementations return `Ok` for 2xx responses only. Non-success statuses
/// come back as [`ShopError::from_status`], and a missing response as
/// [`ShopError::Network`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> ShopResult<ApiResponse>;
}

/// Type alias for a shared transport (dynamic dispatch)
pub type BoxedTransport = Arc<dyn Transport>;
