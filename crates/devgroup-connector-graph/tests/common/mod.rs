//! Common test utilities for devgroup-connector-graph integration tests.

#![allow(dead_code)]

use devgroup_connector_graph::{GraphConfig, GraphCredentials, GraphDirectory, GraphSession};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TENANT_ID: &str = "test-tenant";

/// Test data factory for Intune managed devices.
pub fn create_managed_device(id: &str, device_name: &str, owner: &str, aad_id: &str) -> Value {
    json!({
        "id": id,
        "deviceName": device_name,
        "managedDeviceName": format!("{}_Windows", owner),
        "manufacturer": "Contoso",
        "model": "Surface Laptop",
        "operatingSystem": "Windows",
        "azureADDeviceId": aad_id,
        "userPrincipalName": owner,
        "userId": format!("user-{}", id)
    })
}

/// Test data factory for Entra device objects.
pub fn create_device_object(id: &str, device_id: &str) -> Value {
    json!({
        "id": id,
        "deviceId": device_id,
        "displayName": "LAPTOP"
    })
}

/// Test data factory for security groups.
pub fn create_test_group(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "displayName": name,
        "description": format!("Test group: {}", name),
        "securityEnabled": true,
        "mailEnabled": false,
        "groupTypes": []
    })
}

/// Wraps items in an OData response format.
pub fn create_odata_response(items: Vec<Value>, next_link: Option<&str>) -> Value {
    let mut response = json!({ "value": items });
    if let Some(link) = next_link {
        response["@odata.nextLink"] = json!(link);
    }
    response
}

/// Creates an OData error response.
pub fn create_odata_error(code: &str, message: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message
        }
    })
}

/// Creates a mock OAuth token response.
pub fn create_token_response(access_token: &str, expires_in: u64) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": expires_in
    })
}

/// Mock server standing in for both the authority and Graph.
pub struct MockGraphServer {
    pub server: MockServer,
}

impl MockGraphServer {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Sets up the OAuth token endpoint.
    pub async fn mock_token_endpoint(&self) {
        Mock::given(method("POST"))
            .and(path(format!("/{}/oauth2/v2.0/token", TENANT_ID)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_token_response("mock-access-token", 3600)),
            )
            .mount(&self.server)
            .await;
    }

    /// Config pointing both endpoints at this server, with fast retries.
    pub fn config(&self) -> GraphConfig {
        GraphConfig::builder()
            .tenant_id(TENANT_ID)
            .graph_endpoint(self.url())
            .login_endpoint(self.url())
            .page_size(50)
            .max_retries(2)
            .retry_base_delay(Duration::from_millis(10))
            .build()
            .expect("valid test config")
    }

    pub fn directory(&self) -> GraphDirectory {
        GraphDirectory::new(self.config(), credentials()).expect("directory")
    }

    pub async fn session(&self) -> GraphSession {
        GraphSession::connect(self.config(), credentials())
            .await
            .expect("session")
    }
}

pub fn credentials() -> GraphCredentials {
    GraphCredentials {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string().into(),
    }
}
