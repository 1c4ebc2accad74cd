//! Environment configuration.

use devgroup_connector_graph::{GraphCloud, GraphConfig, GraphCredentials, GraphError};

pub const TENANT_ID: &str = "DEVGROUP_TENANT_ID";
pub const CLIENT_ID: &str = "DEVGROUP_CLIENT_ID";
pub const CLIENT_SECRET: &str = "DEVGROUP_CLIENT_SECRET";
pub const CLOUD: &str = "DEVGROUP_CLOUD";
pub const GRAPH_ENDPOINT: &str = "DEVGROUP_GRAPH_ENDPOINT";
pub const LOGIN_ENDPOINT: &str = "DEVGROUP_LOGIN_ENDPOINT";
pub const API_VERSION: &str = "DEVGROUP_API_VERSION";
pub const TIMEOUT_SECS: &str = "DEVGROUP_TIMEOUT_SECS";

/// Everything needed to open a Graph session.
#[derive(Debug)]
pub struct AppConfig {
    pub graph: GraphConfig,
    pub credentials: GraphCredentials,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// Blank values count as unset.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let get = |key: &str| {
            reader(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &str| get(key).ok_or_else(|| ConfigError::MissingVar(key.into()));

        let tenant_id = require(TENANT_ID)?;
        let client_id = require(CLIENT_ID)?;
        let client_secret = require(CLIENT_SECRET)?;

        let mut builder = GraphConfig::builder().tenant_id(tenant_id);

        if let Some(cloud) = get(CLOUD) {
            let cloud = cloud
                .parse::<GraphCloud>()
                .map_err(|e| invalid(CLOUD, e))?;
            builder = builder.cloud(cloud);
        }
        if let Some(version) = get(API_VERSION) {
            builder = builder.api_version(version);
        }
        if let Some(secs) = get(TIMEOUT_SECS) {
            let secs = secs
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidValue(TIMEOUT_SECS.into(), e.to_string()))?;
            builder = builder.timeout_secs(secs);
        }
        if let Some(endpoint) = get(GRAPH_ENDPOINT) {
            builder = builder.graph_endpoint(endpoint);
        }
        if let Some(endpoint) = get(LOGIN_ENDPOINT) {
            builder = builder.login_endpoint(endpoint);
        }

        let graph = builder.build().map_err(ConfigError::Graph)?;

        Ok(Self {
            graph,
            credentials: GraphCredentials {
                client_id,
                client_secret: client_secret.into(),
            },
        })
    }
}

fn invalid(key: &str, error: GraphError) -> ConfigError {
    ConfigError::InvalidValue(key.into(), error.to_string())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("{0}")]
    Graph(GraphError),
}
