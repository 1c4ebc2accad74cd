//! Connector configuration.

use secrecy::SecretString;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::{GraphError, GraphResult};

/// National cloud hosting the tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphCloud {
    #[default]
    Global,
    UsGovernment,
    China,
}

impl GraphCloud {
    /// `OAuth2` authority host.
    #[must_use]
    pub fn login_endpoint(&self) -> &'static str {
        match self {
            Self::Global => "https://login.microsoftonline.com",
            Self::UsGovernment => "https://login.microsoftonline.us",
            Self::China => "https://login.chinacloudapi.cn",
        }
    }

    /// Microsoft Graph host.
    #[must_use]
    pub fn graph_endpoint(&self) -> &'static str {
        match self {
            Self::Global => "https://graph.microsoft.com",
            Self::UsGovernment => "https://graph.microsoft.us",
            Self::China => "https://microsoftgraph.chinacloudapi.cn",
        }
    }
}

impl FromStr for GraphCloud {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" | "commercial" | "public" => Ok(Self::Global),
            "usgov" | "us-government" | "usgovernment" => Ok(Self::UsGovernment),
            "china" => Ok(Self::China),
            other => Err(GraphError::Config(format!(
                "unknown cloud '{other}' (expected global, usgov or china)"
            ))),
        }
    }
}

impl fmt::Display for GraphCloud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Global => "global",
            Self::UsGovernment => "usgov",
            Self::China => "china",
        })
    }
}

/// App registration used for the client credentials flow.
#[derive(Debug)]
pub struct GraphCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

/// Connector settings. Build with [`GraphConfig::builder`].
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub tenant_id: String,
    pub cloud: GraphCloud,
    pub api_version: String,
    /// `$top` sent with list queries.
    pub page_size: u32,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries allowed per read.
    pub max_retries: u32,
    /// First backoff delay; doubles on each retry.
    pub retry_base_delay: Duration,
    graph_endpoint: Option<String>,
    login_endpoint: Option<String>,
}

impl GraphConfig {
    pub fn builder() -> GraphConfigBuilder {
        GraphConfigBuilder::default()
    }

    /// Graph host, honouring an override.
    #[must_use]
    pub fn graph_endpoint(&self) -> &str {
        self.graph_endpoint
            .as_deref()
            .unwrap_or_else(|| self.cloud.graph_endpoint())
    }

    /// Authority host, honouring an override.
    #[must_use]
    pub fn login_endpoint(&self) -> &str {
        self.login_endpoint
            .as_deref()
            .unwrap_or_else(|| self.cloud.login_endpoint())
    }

    /// Versioned Graph root, e.g. `https://graph.microsoft.com/v1.0`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("{}/{}", self.graph_endpoint(), self.api_version)
    }

    #[must_use]
    pub fn token_url(&self) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.login_endpoint(), self.tenant_id)
    }

    /// Scope requested for app-only Graph access.
    #[must_use]
    pub fn scope(&self) -> String {
        format!("{}/.default", self.graph_endpoint())
    }
}

#[derive(Debug, Default)]
pub struct GraphConfigBuilder {
    tenant_id: Option<String>,
    cloud: GraphCloud,
    api_version: Option<String>,
    page_size: Option<u32>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    retry_base_delay: Option<Duration>,
    graph_endpoint: Option<String>,
    login_endpoint: Option<String>,
}

impl GraphConfigBuilder {
    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn cloud(mut self, cloud: GraphCloud) -> Self {
        self.cloud = cloud;
        self
    }

    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = Some(delay);
        self
    }

    /// Overrides the Graph host (proxies, test servers).
    pub fn graph_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.graph_endpoint = Some(endpoint.into());
        self
    }

    /// Overrides the authority host.
    pub fn login_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.login_endpoint = Some(endpoint.into());
        self
    }

    /// Validates and builds the config.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::Config` for a missing tenant, an out-of-range
    /// page size or timeout, or an endpoint override that is not an http(s) URL.
    pub fn build(self) -> GraphResult<GraphConfig> {
        let tenant_id = self
            .tenant_id
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GraphError::Config("tenant_id is required".into()))?;

        let api_version = self.api_version.unwrap_or_else(|| "v1.0".to_string());
        if api_version.trim().is_empty() || api_version.contains('/') {
            return Err(GraphError::Config(format!(
                "invalid api_version '{api_version}'"
            )));
        }

        let page_size = self.page_size.unwrap_or(100);
        if !(1..=999).contains(&page_size) {
            return Err(GraphError::Config(format!(
                "page_size must be between 1 and 999, got {page_size}"
            )));
        }

        let timeout_secs = self.timeout_secs.unwrap_or(30);
        if timeout_secs == 0 {
            return Err(GraphError::Config("timeout_secs must be positive".into()));
        }

        Ok(GraphConfig {
            tenant_id,
            cloud: self.cloud,
            api_version,
            page_size,
            timeout: Duration::from_secs(timeout_secs),
            max_retries: self.max_retries.unwrap_or(3),
            retry_base_delay: self.retry_base_delay.unwrap_or(Duration::from_secs(1)),
            graph_endpoint: self.graph_endpoint.map(normalize_endpoint).transpose()?,
            login_endpoint: self.login_endpoint.map(normalize_endpoint).transpose()?,
        })
    }
}

fn normalize_endpoint(endpoint: String) -> GraphResult<String> {
    let url = Url::parse(endpoint.trim())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(GraphError::Config(format!(
            "endpoint '{endpoint}' must use http or https"
        )));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}
