//! OAuth2 client credentials token cache.

use chrono::{DateTime, Duration, Utc};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::{GraphConfig, GraphCredentials, GraphError, GraphResult};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Error body returned by the authority.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Returns true if the token is expired or will expire within the grace period.
    fn is_expired(&self, grace_period: Duration) -> bool {
        Utc::now() + grace_period >= self.expires_at
    }
}

/// Holds the app-only access token and refreshes it before expiry.
#[derive(Debug)]
pub struct TokenCache {
    credentials: GraphCredentials,
    token_url: String,
    scope: String,
    http_client: reqwest::Client,
    cached_token: RwLock<Option<CachedToken>>,
    /// Refresh this long before expiry (default: 5 minutes).
    grace_period: Duration,
}

impl TokenCache {
    pub fn new(
        credentials: GraphCredentials,
        config: &GraphConfig,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            credentials,
            token_url: config.token_url(),
            scope: config.scope(),
            http_client,
            cached_token: RwLock::new(None),
            grace_period: Duration::minutes(5),
        }
    }

    /// Gets a valid access token, refreshing if necessary.
    #[instrument(skip(self))]
    pub async fn get_token(&self) -> GraphResult<String> {
        {
            let cache = self.cached_token.read().await;
            if let Some(ref token) = *cache {
                if !token.is_expired(self.grace_period) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        debug!("Refreshing access token");
        let token = self.acquire_token().await?;
        let access_token = token.access_token.clone();
        *self.cached_token.write().await = Some(token);

        Ok(access_token)
    }

    async fn acquire_token(&self) -> GraphResult<CachedToken> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            (
                "client_secret",
                self.credentials.client_secret.expose_secret(),
            ),
            ("scope", self.scope.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| GraphError::Auth(format!("Token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {}", err.error, description),
                    None => err.error,
                },
                Err(_) => body,
            };
            return Err(GraphError::Auth(format!(
                "Token request failed with status {status}: {detail}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| GraphError::Auth(format!("Failed to parse token response: {e}")))?;

        let expires_at = Utc::now() + Duration::seconds(token_response.expires_in);
        debug!(
            "Acquired new token, expires at {}",
            expires_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        Ok(CachedToken {
            access_token: token_response.access_token,
            expires_at,
        })
    }

    /// Drops the cached token; the next call acquires a fresh one.
    pub async fn invalidate(&self) {
        *self.cached_token.write().await = None;
    }

    /// Returns true if a token is currently cached, expired or not.
    pub async fn is_cached(&self) -> bool {
        self.cached_token.read().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_token_expiry() {
        let token = CachedToken {
            access_token: "test".to_string(),
            expires_at: Utc::now() + Duration::minutes(10),
        };

        assert!(!token.is_expired(Duration::minutes(5)));
        assert!(token.is_expired(Duration::minutes(15)));
    }

    #[test]
    fn test_token_error_body_parsing() {
        let body = r#"{"error":"invalid_client","error_description":"AADSTS7000215: Invalid client secret provided."}"#;
        let parsed: TokenErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error, "invalid_client");
        assert!(parsed.error_description.unwrap().starts_with("AADSTS7000215"));
    }
}
