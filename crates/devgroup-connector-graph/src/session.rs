//! Session lifecycle around a [`GraphDirectory`].

use tracing::{info, instrument};

use crate::{GraphConfig, GraphCredentials, GraphDirectory, GraphResult};

/// An authenticated Graph session.
///
/// `connect` acquires the first token so that bad credentials or an
/// unreachable authority fail before any directory query.
#[derive(Debug)]
pub struct GraphSession {
    directory: GraphDirectory,
}

impl GraphSession {
    /// Builds the directory and acquires a token.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::Auth` if the token request fails, or a config
    /// error if the HTTP client cannot be created.
    #[instrument(skip_all, fields(tenant_id = %config.tenant_id, cloud = %config.cloud))]
    pub async fn connect(config: GraphConfig, credentials: GraphCredentials) -> GraphResult<Self> {
        let directory = GraphDirectory::new(config, credentials)?;
        directory.token_cache().get_token().await?;
        info!("Connected to Microsoft Graph");
        Ok(Self { directory })
    }

    #[must_use]
    pub fn directory(&self) -> &GraphDirectory {
        &self.directory
    }

    /// Drops the cached token. Never fails.
    pub async fn disconnect(self) {
        self.directory.token_cache().invalidate().await;
        info!("Disconnected from Microsoft Graph");
    }
}
