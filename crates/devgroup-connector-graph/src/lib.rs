//! Microsoft Graph directory client for devgroup
//!
//! Implements [`devgroup_core::DirectoryClient`] against Microsoft Graph:
//! Intune managed devices on the inventory side and Entra ID device and
//! group objects on the identity side.
//!
//! # Features
//!
//! - `OAuth2` client credentials authentication with a cached token
//! - Read retries on throttling (429) and transient gateway errors
//! - `@odata.nextLink` pagination
//! - Multi-cloud support (Global, US Government, China)
//!
//! # Example
//!
//! ```no_run
//! use devgroup_connector_graph::{GraphConfig, GraphCredentials, GraphSession};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GraphConfig::builder()
//!     .tenant_id("your-tenant-id")
//!     .build()?;
//!
//! let credentials = GraphCredentials {
//!     client_id: "your-client-id".to_string(),
//!     client_secret: "your-client-secret".to_string().into(),
//! };
//!
//! let session = GraphSession::connect(config, credentials).await?;
//! let directory = session.directory();
//! // ... run the workflow against `directory` ...
//! session.disconnect().await;
//! # Ok(())
//! # }
//! ```

mod auth;
mod config;
mod connector;
mod devices;
mod error;
mod graph_client;
mod groups;
mod membership;
mod session;

pub use auth::TokenCache;
pub use config::{GraphCloud, GraphConfig, GraphConfigBuilder, GraphCredentials};
pub use connector::GraphDirectory;
pub use error::{GraphError, GraphResult};
pub use graph_client::GraphClient;
pub use session::GraphSession;
