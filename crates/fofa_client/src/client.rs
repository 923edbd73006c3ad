//! HTTP client for the FOFA API.

use crate::models::{ApiStatus, SearchResponse};
use crate::{AccountInfo, FofaApiResult, SearchRequest, SearchResult, normalize_row};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use derive_builder::Builder;
use derive_getters::Getters;
use fofa_error::{FofaApiError, FofaApiErrorKind};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// Public FOFA endpoint.
pub const DEFAULT_BASE_URL: &str = "https://fofa.info";

/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const SEARCH_PATH: &str = "/api/v1/search/all";
const ACCOUNT_PATH: &str = "/api/v1/info/my";

/// Connection options for [`FofaClient`].
#[derive(Debug, Clone, Getters, Builder)]
#[builder(setter(into))]
pub struct ClientOptions {
    /// Scheme and host of the API, without trailing slash
    #[builder(default = "DEFAULT_BASE_URL.to_string()")]
    base_url: String,
    /// Optional HTTP or SOCKS proxy URL
    #[builder(default)]
    proxy: Option<String>,
    /// Request timeout
    #[builder(default = "DEFAULT_TIMEOUT")]
    timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            proxy: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientOptions {
    /// Create a builder.
    pub fn builder() -> ClientOptionsBuilder {
        ClientOptionsBuilder::default()
    }
}

/// FOFA API client bound to one API key.
#[derive(Debug, Clone)]
pub struct FofaClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FofaClient {
    /// Create a client for the public endpoint with default options.
    pub fn new(api_key: impl Into<String>) -> FofaApiResult<Self> {
        Self::with_options(api_key, &ClientOptions::default())
    }

    /// Create a client with explicit options.
    ///
    /// # Errors
    ///
    /// - [`FofaApiErrorKind::MissingApiKey`] if `api_key` is blank
    /// - [`FofaApiErrorKind::ClientCreation`] if the proxy URL is invalid
    pub fn with_options(api_key: impl Into<String>, options: &ClientOptions) -> FofaApiResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(FofaApiError::new(FofaApiErrorKind::MissingApiKey));
        }

        let mut builder = Client::builder().timeout(*options.timeout());
        if let Some(proxy) = options.proxy().as_deref().filter(|p| !p.is_empty()) {
            debug!(proxy = %proxy, "Routing FOFA requests through proxy");
            let proxy = reqwest::Proxy::all(proxy).map_err(|e| {
                FofaApiError::new(FofaApiErrorKind::ClientCreation(format!(
                    "invalid proxy {}: {}",
                    proxy, e
                )))
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|e| {
            FofaApiError::new(FofaApiErrorKind::ClientCreation(e.to_string()))
        })?;

        Ok(Self {
            client,
            api_key,
            base_url: options.base_url().trim_end_matches('/').to_string(),
        })
    }

    /// Check a key by fetching its account details.
    pub async fn verify_key(
        api_key: impl Into<String>,
        options: &ClientOptions,
    ) -> FofaApiResult<AccountInfo> {
        Self::with_options(api_key, options)?.account_info().await
    }

    /// Run a search.
    ///
    /// # Errors
    ///
    /// - [`FofaApiErrorKind::Transport`] when no response arrives
    /// - [`FofaApiErrorKind::Status`] on a non-success HTTP status
    /// - [`FofaApiErrorKind::Decode`] when the body is not the expected JSON
    /// - [`FofaApiErrorKind::Api`] when the service answers `error: true`
    #[instrument(skip(self, request), fields(query = %request.query(), size = request.size()))]
    pub async fn search(&self, request: &SearchRequest) -> FofaApiResult<SearchResult> {
        let qbase64 = STANDARD.encode(request.query().as_bytes());
        let page = request.page().to_string();
        let size = request.size().to_string();

        let mut params = vec![
            ("key", self.api_key.as_str()),
            ("qbase64", qbase64.as_str()),
            ("page", page.as_str()),
            ("size", size.as_str()),
            ("fields", request.fields().as_str()),
        ];
        if *request.full() {
            params.push(("full", "true"));
        }

        let response: SearchResponse = self.get_json(SEARCH_PATH, &params).await?;
        let rows: Vec<String> = response.results.iter().map(normalize_row).collect();

        debug!(total = response.size, downloaded = rows.len(), "Search completed");
        Ok(SearchResult::new(request.query().clone(), response.size, rows))
    }

    /// Fetch the account details of this client's key.
    #[instrument(skip(self))]
    pub async fn account_info(&self) -> FofaApiResult<AccountInfo> {
        self.get_json(ACCOUNT_PATH, &[("key", self.api_key.as_str())])
            .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> FofaApiResult<T> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, path, "FOFA request failed");
                FofaApiError::new(FofaApiErrorKind::Transport(transport_message(&e)))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            FofaApiError::new(FofaApiErrorKind::Transport(transport_message(&e)))
        })?;

        if !status.is_success() {
            // FOFA sometimes reports errors with a non-2xx status and a JSON body
            if let Some(api) = api_error(&body) {
                warn!(status = %status, errmsg = %api, "FOFA rejected request");
                return Err(FofaApiError::new(FofaApiErrorKind::Api(api)));
            }
            error!(status = %status, "FOFA returned error status");
            return Err(FofaApiError::new(FofaApiErrorKind::Status {
                status_code: status.as_u16(),
                message: if body.is_empty() {
                    status.canonical_reason().unwrap_or("unknown").to_string()
                } else {
                    body
                },
            }));
        }

        if let Some(api) = api_error(&body) {
            warn!(errmsg = %api, "FOFA rejected request");
            return Err(FofaApiError::new(FofaApiErrorKind::Api(api)));
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "Failed to decode FOFA response");
            FofaApiError::new(FofaApiErrorKind::Decode(e.to_string()))
        })
    }
}

fn api_error(body: &str) -> Option<String> {
    serde_json::from_str::<ApiStatus>(body)
        .ok()
        .filter(|status| status.error)
        .map(|status| status.errmsg)
}

fn transport_message(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {}", e)
    } else {
        e.to_string()
    }
}
