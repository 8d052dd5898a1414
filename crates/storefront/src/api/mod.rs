//! Kasra REST API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`; every path is relative to the
//!   configured API root (`.../api/`)
//! - The bearer token is read from storage on every request, so a login in
//!   one place is seen by every clone of the client
//! - Catalog reads (products, categories, brands) are cached in memory via
//!   `moka`; catalog writes and session changes invalidate the cache
//!
//! # Example
//!
//! ```rust,ignore
//! use kasra_storefront::api::ApiClient;
//!
//! let api = ApiClient::new(&config, storage);
//!
//! let products = api.get_products(&ProductFilter::storefront()).await?;
//! let wallet = api.get_wallet().await?;
//! ```

mod admin;
mod auth;
mod cache;
mod catalog;
mod envelope;
mod error;
mod orders;

pub use auth::AuthPayload;
pub use error::{ApiError, DEFAULT_ERROR_MESSAGE};

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{Instrument, debug, error, info_span, warn};
use url::Url;
use uuid::Uuid;

use crate::config::StorefrontConfig;
use crate::storage::{StorageBridge, keys};

use cache::{CacheKey, CacheValue};

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

const CACHE_CAPACITY: u64 = 1000;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Kasra REST API.
///
/// Cheaply cloneable; clones share the HTTP connection pool, the token
/// storage and the catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    storage: StorageBridge,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(config: &StorefrontConfig, storage: StorageBridge) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url: config.api_base_url.clone(),
                storage,
                cache,
            }),
        }
    }

    /// API root every endpoint path is joined onto.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Drop every cached catalog response.
    pub fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
        debug!("Catalog cache invalidated");
    }

    fn token(&self) -> Option<String> {
        self.inner
            .storage
            .get_string(keys::TOKEN)
            .filter(|t| !t.is_empty())
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let mut builder = self.inner.client.request(method, self.url(path)?);
        if let Some(token) = self.token() {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    /// Send a request and decode the envelope payload.
    async fn execute<T>(&self, builder: RequestBuilder) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let request_id = Uuid::new_v4();
        let request = builder
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .build()?;

        let span = info_span!(
            "api_request",
            method = %request.method(),
            path = %request.url().path(),
            request_id = %request_id,
        );

        async move {
            let response = self.inner.client.execute(request).await.map_err(|e| {
                warn!(error = %e, "API request failed without a response");
                ApiError::Network(e)
            })?;

            let status = response.status();
            let body = response.text().await?;

            if !status.is_success() {
                let message = envelope::error_message(status, &body);
                if status.is_server_error() {
                    error!(
                        status = %status,
                        body = %body.chars().take(500).collect::<String>(),
                        "API returned server error"
                    );
                } else {
                    debug!(status = %status, message = %message, "API returned client error");
                }
                return Err(ApiError::Status {
                    status: status.as_u16(),
                    message,
                });
            }

            envelope::decode(status, &body).inspect_err(|e| {
                error!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to decode API response"
                );
            })
        }
        .instrument(span)
        .await
    }

    async fn get<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::GET, path)?).await
    }

    async fn get_with_query<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::GET, path)?.query(query))
            .await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::POST, path)?.json(body))
            .await
    }

    async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::PUT, path)?.json(body))
            .await
    }

    /// POST whose response payload is not needed.
    async fn post_ignored<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.post::<B, IgnoredAny>(path, body).await.map(|_| ())
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute::<IgnoredAny>(self.request(Method::DELETE, path)?)
            .await
            .map(|_| ())
    }
}
