//! # HTTP Transport
//!
//! `reqwest`-backed [`Transport`]. The session credential travels in a cookie
//! store owned by the [`CredentialContext`]; call sites never see it.

use crate::config::ClientConfig;
use async_trait::async_trait;
use cookie_store::CookieStore;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use reqwest_cookie_store::CookieStoreMutex;
use serde_json::Value;
use shop_core::{ApiRequest, ApiResponse, Method, ShopError, ShopResult, Transport};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError};
use tracing::{debug, warn};

/// File under the profile directory holding persisted cookies
pub const COOKIE_FILE: &str = "cookies.json";

/// Opaque holder of the server-issued session credential.
///
/// Whatever the backend sets as cookies is replayed on every credentialed
/// request. The client never inspects the contents. A persistent context
/// also keeps them on disk, the way a browser keeps its cookie storage, so a
/// later process can resume the session.
#[derive(Clone)]
pub struct CredentialContext {
    store: Arc<CookieStoreMutex>,
    path: Option<PathBuf>,
}

impl Default for CredentialContext {
    fn default() -> Self {
        Self {
            store: Arc::new(CookieStoreMutex::new(CookieStore::default())),
            path: None,
        }
    }
}

impl std::fmt::Debug for CredentialContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialContext")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl CredentialContext {
    /// In-memory only; credentials end with the process
    pub fn new() -> Self {
        Self::default()
    }

    /// Backed by `path`. An unreadable file starts an empty store.
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let store = match File::open(&path) {
            Ok(file) => cookie_store::serde::json::load(BufReader::new(file)).unwrap_or_else(|e| {
                warn!("Ignoring unreadable cookie file {}: {}", path.display(), e);
                CookieStore::default()
            }),
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    warn!("Cannot open cookie file {}: {}", path.display(), e);
                }
                CookieStore::default()
            }
        };

        Self {
            store: Arc::new(CookieStoreMutex::new(store)),
            path: Some(path),
        }
    }

    /// Location on disk, if persistent
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the current cookies to disk. No-op for an in-memory context.
    pub fn save(&self) -> ShopResult<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| ShopError::Profile(e.to_string()))?;
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let file = options
            .open(path)
            .map_err(|e| ShopError::Profile(e.to_string()))?;

        let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        // Session cookies included: each CLI run is a fresh process
        let mut writer = BufWriter::new(file);
        cookie_store::serde::json::save_incl_expired_and_nonpersistent(&store, &mut writer)
            .map_err(|e| ShopError::Profile(e.to_string()))?;
        writer.flush().map_err(|e| ShopError::Profile(e.to_string()))
    }

    fn provider(&self) -> Arc<CookieStoreMutex> {
        Arc::clone(&self.store)
    }
}

/// Transport speaking JSON over HTTP to a fixed base address
pub struct HttpTransport {
    base_url: String,
    credentials: CredentialContext,
    /// Sends the ambient credential
    client: Client,
    /// For requests that explicitly opt out of credentials
    anonymous: Client,
}

impl HttpTransport {
    /// Create a transport for `config.api_base_url` using `credentials`
    pub fn new(config: &ClientConfig, credentials: CredentialContext) -> ShopResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .cookie_provider(credentials.provider())
            .build()
            .map_err(|e| ShopError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        let anonymous = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ShopError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url().to_string(),
            credentials,
            client,
            anonymous,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> ShopResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        let client = if request.with_credentials {
            &self.client
        } else {
            &self.anonymous
        };

        let mut builder = client.request(Self::method(request.method), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref upload) = request.upload {
            let mut part = Part::bytes(upload.bytes.clone()).file_name(upload.file_name.clone());
            if let Some(ref content_type) = upload.content_type {
                part = part.mime_str(content_type).map_err(|e| {
                    ShopError::Configuration(format!("Invalid content type {}: {}", content_type, e))
                })?;
            }
            builder = builder.multipart(Form::new().part(upload.field.clone(), part));
        } else if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!("{} {} unreachable: {}", request.method, request.path, e);
            ShopError::Network(e.to_string())
        })?;

        if request.with_credentials {
            if let Err(e) = self.credentials.save() {
                warn!("Failed to persist session cookies: {}", e);
            }
        }

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        debug!("{} {} -> {}", request.method, request.path, status);

        if !status.is_success() {
            return Err(ShopError::from_status(status.as_u16(), body));
        }

        Ok(ApiResponse::new(status.as_u16(), body))
    }
}
