//! Microsoft Graph HTTP client with pagination and read retries.

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::{GraphConfig, GraphError, GraphResult, TokenCache};

/// `OData` error response from Microsoft Graph.
#[derive(Debug, Deserialize)]
pub struct ODataError {
    pub error: ODataErrorBody,
}

/// `OData` error body.
#[derive(Debug, Deserialize)]
pub struct ODataErrorBody {
    pub code: String,
    pub message: String,
    #[serde(rename = "innerError")]
    pub inner_error: Option<serde_json::Value>,
}

/// Response wrapper for paginated Graph collections.
#[derive(Debug, Deserialize)]
pub struct ODataResponse<T> {
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Microsoft Graph API client.
///
/// Reads retry on 429 and 502/503/504. Writes are sent exactly once.
#[derive(Debug)]
pub struct GraphClient {
    http_client: reqwest::Client,
    token_cache: Arc<TokenCache>,
    base_url: String,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl GraphClient {
    pub fn new(
        http_client: reqwest::Client,
        token_cache: Arc<TokenCache>,
        config: &GraphConfig,
    ) -> Self {
        Self {
            http_client,
            token_cache,
            base_url: config.base_url(),
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay,
        }
    }

    /// Builds the shared HTTP client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn http_client(config: &GraphConfig) -> GraphResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GraphError::Config(format!("Failed to create HTTP client: {e}")))
    }

    /// Returns the versioned Graph root.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Performs a GET and decodes the body.
    #[instrument(skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> GraphResult<T> {
        let response = self.execute(Method::GET, url, None::<&()>, true).await?;
        decode(response).await
    }

    /// Performs a GET, mapping 404 to `None`.
    #[instrument(skip(self))]
    pub async fn get_optional<T: DeserializeOwned>(&self, url: &str) -> GraphResult<Option<T>> {
        let response = self.execute(Method::GET, url, None::<&()>, true).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("Resource not found");
            return Ok(None);
        }
        decode(response).await.map(Some)
    }

    /// Performs a single POST whose success response has no body.
    #[instrument(skip(self, body))]
    pub async fn post_no_content<B: Serialize>(&self, url: &str, body: &B) -> GraphResult<()> {
        let response = self.execute(Method::POST, url, Some(body), false).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(api_error(response).await)
        }
    }

    /// Fetches all pages of a collection, following `@odata.nextLink`.
    #[instrument(skip(self))]
    pub async fn get_all<T: DeserializeOwned>(&self, initial_url: &str) -> GraphResult<Vec<T>> {
        let mut items = Vec::new();
        let mut url = initial_url.to_string();

        loop {
            debug!("Fetching page: {}", url);
            let page: ODataResponse<T> = self.get(&url).await?;
            items.extend(page.value);

            match page.next_link {
                Some(next) => url = next,
                None => return Ok(items),
            }
        }
    }

    /// Sends the request, retrying throttled or transient answers when `retry` is set.
    ///
    /// Any other status is returned to the caller untouched.
    async fn execute<B: Serialize>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        retry: bool,
    ) -> GraphResult<Response> {
        let mut retries = 0;
        let mut delay = self.retry_base_delay;

        loop {
            let token = self.token_cache.get_token().await?;

            let mut request = self
                .http_client
                .request(method.clone(), url)
                .bearer_auth(&token);
            if let Some(b) = body {
                request = request.json(b);
            }

            let response = request.send().await?;
            let status = response.status();

            if status == StatusCode::UNAUTHORIZED {
                self.token_cache.invalidate().await;
            }

            let transient = matches!(
                status,
                StatusCode::TOO_MANY_REQUESTS
                    | StatusCode::BAD_GATEWAY
                    | StatusCode::SERVICE_UNAVAILABLE
                    | StatusCode::GATEWAY_TIMEOUT
            );
            if !retry || !transient || retries >= self.max_retries {
                return Ok(response);
            }

            let wait = retry_after(&response).unwrap_or(delay);
            retries += 1;
            warn!(
                "Transient error {}, retry {}/{} after {:?}",
                status, retries, self.max_retries, wait
            );
            tokio::time::sleep(wait).await;
            delay *= 2;
        }
    }
}

/// Reads `Retry-After` in seconds.
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

async fn decode<T: DeserializeOwned>(response: Response) -> GraphResult<T> {
    if !response.status().is_success() {
        return Err(api_error(response).await);
    }
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Converts an error response into `GraphError::GraphApi`, keeping the OData detail.
async fn api_error(response: Response) -> GraphError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ODataError>(&body) {
        Ok(odata) => GraphError::GraphApi {
            status: status.as_u16(),
            code: odata.error.code,
            message: odata.error.message,
            inner_error: odata.error.inner_error.map(|v| v.to_string()),
        },
        Err(_) => GraphError::GraphApi {
            status: status.as_u16(),
            code: status
                .canonical_reason()
                .unwrap_or("HttpError")
                .to_string(),
            message: body,
            inner_error: None,
        },
    }
}
