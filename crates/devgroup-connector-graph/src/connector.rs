//! `DirectoryClient` over Microsoft Graph.

use async_trait::async_trait;
use devgroup_core::{
    DeviceRecord, DirectoryClient, DirectoryResult, GroupCandidate, IdentityDeviceObject,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::devices::{DeviceObject, ManagedDevice, DEVICE_OBJECT_SELECT, MANAGED_DEVICE_SELECT};
use crate::groups::{group_from_json, GROUP_SELECT};
use crate::membership::{member_reference, members_ref_url};
use crate::{GraphClient, GraphConfig, GraphCredentials, GraphResult, TokenCache};

/// Graph-backed directory.
///
/// Managed devices come from Intune (`deviceManagement/managedDevices`);
/// device and group objects come from Entra ID.
#[derive(Debug)]
pub struct GraphDirectory {
    config: GraphConfig,
    client: GraphClient,
    token_cache: Arc<TokenCache>,
}

impl GraphDirectory {
    /// Creates the directory. No request is made until first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: GraphConfig, credentials: GraphCredentials) -> GraphResult<Self> {
        let http_client = GraphClient::http_client(&config)?;
        let token_cache = Arc::new(TokenCache::new(credentials, &config, http_client.clone()));
        let client = GraphClient::new(http_client, Arc::clone(&token_cache), &config);

        Ok(Self {
            config,
            client,
            token_cache,
        })
    }

    #[must_use]
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub(crate) fn token_cache(&self) -> &TokenCache {
        &self.token_cache
    }

    fn collection_url(&self, collection: &str, filter: &str, select: &str) -> String {
        format!(
            "{}/{}?$filter={}&$select={}&$top={}",
            self.client.base_url(),
            collection,
            urlencoding::encode(filter),
            select,
            self.config.page_size
        )
    }
}

#[async_trait]
impl DirectoryClient for GraphDirectory {
    #[instrument(skip(self))]
    async fn find_managed_devices(&self, filter: &str) -> DirectoryResult<Vec<DeviceRecord>> {
        let url = self.collection_url(
            "deviceManagement/managedDevices",
            filter,
            MANAGED_DEVICE_SELECT,
        );
        let devices: Vec<ManagedDevice> = self.client.get_all(&url).await?;
        debug!("{} managed device(s) returned", devices.len());
        Ok(devices.into_iter().map(DeviceRecord::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_managed_device(
        &self,
        inventory_id: &str,
    ) -> DirectoryResult<Option<DeviceRecord>> {
        let url = format!(
            "{}/deviceManagement/managedDevices/{}?$select={}",
            self.client.base_url(),
            urlencoding::encode(inventory_id),
            MANAGED_DEVICE_SELECT
        );
        let device: Option<ManagedDevice> = self.client.get_optional(&url).await?;
        Ok(device.map(DeviceRecord::from))
    }

    #[instrument(skip(self))]
    async fn find_device_objects(
        &self,
        filter: &str,
    ) -> DirectoryResult<Vec<IdentityDeviceObject>> {
        let url = self.collection_url("devices", filter, DEVICE_OBJECT_SELECT);
        let objects: Vec<DeviceObject> = self.client.get_all(&url).await?;
        Ok(objects.into_iter().map(IdentityDeviceObject::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_groups(&self, filter: &str) -> DirectoryResult<Vec<GroupCandidate>> {
        let url = self.collection_url("groups", filter, GROUP_SELECT);
        let raw: Vec<serde_json::Value> = self.client.get_all(&url).await?;
        let groups = raw
            .iter()
            .map(group_from_json)
            .collect::<GraphResult<Vec<_>>>()?;
        Ok(groups)
    }

    #[instrument(skip(self))]
    async fn add_group_member(
        &self,
        group_id: &str,
        member_object_id: &str,
    ) -> DirectoryResult<()> {
        let url = members_ref_url(self.client.base_url(), group_id);
        let body = member_reference(self.client.base_url(), member_object_id);

        self.client.post_no_content(&url, &body).await?;

        info!("Added {} to group {}", member_object_id, group_id);
        Ok(())
    }
}
