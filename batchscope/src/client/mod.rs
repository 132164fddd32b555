//! HTTP client for the BatchData property endpoints.
//!
//! This module provides:
//! - `ApiClient` - one POST per action with bearer authentication
//! - `ClientConfig` / `ApiToken` - base URL, timeout and a redacted credential
//! - `RequestSlot` - generation counter that discards stale responses
//!
//! # Example
//! ```ignore
//! let client = ApiClient::new(ClientConfig::new(ApiToken::new(token)))?;
//! let request = SearchRequest::count(&criteria, "Phoenix", "AZ", None)?;
//! let outcome = client.count(&request).await?;
//! println!("{} properties", outcome.results_found);
//! ```

mod slot;

pub use slot::{RequestSlot, Ticket};

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::errors::{ExplorerError, ExplorerResult};
use crate::types::{
    ApiResponse, CountOutcome, LookupOutcome, LookupRequest, PropertyPage, SearchRequest, SkipTraceOutcome,
    SkipTraceRequest,
};

pub const DEFAULT_BASE_URL: &str = "https://api.batchdata.com/api/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Bearer token held in memory only. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().trim().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

/// The three endpoints the explorer talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    PropertySearch,
    PropertyLookup,
    SkipTrace,
}

impl Endpoint {
    pub const fn path(self) -> &'static str {
        match self {
            Endpoint::PropertySearch => "/property/search",
            Endpoint::PropertyLookup => "/property/lookup/all-attributes",
            Endpoint::SkipTrace => "/property/skip-trace",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub token: ApiToken,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(token: ApiToken) -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            token,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> ExplorerResult<Self> {
        self.base_url = Url::parse(base_url)
            .map_err(|err| ExplorerError::invalid_request(format!("Invalid base URL '{}': {}", base_url, err)))?;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// API client for the property endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    token: ApiToken,
}

impl ApiClient {
    /// Creates a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is blank or the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> ExplorerResult<Self> {
        if config.token.is_empty() {
            return Err(ExplorerError::invalid_request("Please enter your API token"));
        }
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url,
            token: config.token,
        })
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), endpoint.path())
    }

    /// POST `body` to `endpoint` and decode the response envelope.
    ///
    /// Non-2xx responses become [`ExplorerError::Api`] carrying the most specific message the
    /// body offers.
    pub async fn send<B: Serialize + ?Sized>(&self, endpoint: Endpoint, body: &B) -> ExplorerResult<ApiResponse> {
        let url = self.endpoint_url(endpoint);
        log::debug!("POST {}", url);

        let response = self.http.post(&url).bearer_auth(self.token.expose()).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        let payload: Option<Value> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            let envelope = payload
                .and_then(|value| serde_json::from_value::<ApiResponse>(value).ok())
                .unwrap_or_default();
            let message = envelope.error_message(status.as_u16());
            log::warn!("{} returned {}: {}", endpoint.path(), status.as_u16(), message);
            return Err(ExplorerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload = payload.ok_or(ExplorerError::UnexpectedResponse {
            message: "response body is not JSON".into(),
        })?;
        serde_json::from_value(payload).map_err(|err| ExplorerError::UnexpectedResponse {
            message: err.to_string().into(),
        })
    }

    pub async fn count(&self, request: &SearchRequest) -> ExplorerResult<CountOutcome> {
        self.send(Endpoint::PropertySearch, request).await?.into_count()
    }

    /// Fetch one page; the page number is derived from the request's `skip` and `take`.
    pub async fn list(&self, request: &SearchRequest) -> ExplorerResult<PropertyPage> {
        let take = request.options.take;
        let page = if take == 0 { 1 } else { request.options.skip / take + 1 };
        Ok(self.send(Endpoint::PropertySearch, request).await?.into_page(page, take))
    }

    pub async fn lookup(&self, request: &LookupRequest) -> ExplorerResult<LookupOutcome> {
        Ok(self.send(Endpoint::PropertyLookup, request).await?.into_lookup())
    }

    pub async fn skip_trace(&self, request: &SkipTraceRequest) -> ExplorerResult<SkipTraceOutcome> {
        self.send(Endpoint::SkipTrace, request).await?.into_skip_trace()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_redacted_in_debug() {
        let config = ClientConfig::new(ApiToken::new("secret-token"));
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("ApiToken(***)"));
    }

    #[test]
    fn endpoint_urls_join_cleanly() {
        let config = ClientConfig::new(ApiToken::new("t"))
            .with_base_url("http://localhost:8080/api/v1/")
            .unwrap();
        let client = ApiClient::new(config).unwrap();
        assert_eq!(
            client.endpoint_url(Endpoint::PropertyLookup),
            "http://localhost:8080/api/v1/property/lookup/all-attributes"
        );
    }

    #[test]
    fn blank_token_is_rejected() {
        let err = ApiClient::new(ClientConfig::new(ApiToken::new("  "))).unwrap_err();
        assert!(err.is_client_side());
    }

    #[test]
    fn bad_base_url_is_rejected() {
        assert!(ClientConfig::new(ApiToken::new("t")).with_base_url("not a url").is_err());
    }
}
