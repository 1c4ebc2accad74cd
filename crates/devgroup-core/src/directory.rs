//! Directory query client seam.

use async_trait::async_trait;

use crate::error::DirectoryResult;
use crate::model::{DeviceRecord, GroupCandidate, IdentityDeviceObject};

/// Read queries against the inventory and identity directories, plus the
/// one write the workflow performs.
///
/// Filters are OData expressions already built and escaped by the caller
/// (see [`crate::filter`]). Implementations send them as-is.
///
/// The session behind an implementation is established before the first
/// call and torn down after the last; neither is the client's concern here.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Lists inventory devices matching `filter`.
    async fn find_managed_devices(&self, filter: &str) -> DirectoryResult<Vec<DeviceRecord>>;

    /// Fetches one inventory device by identifier. `None` if it does not exist.
    async fn get_managed_device(&self, inventory_id: &str)
        -> DirectoryResult<Option<DeviceRecord>>;

    /// Lists identity-directory device objects matching `filter`.
    async fn find_device_objects(&self, filter: &str)
        -> DirectoryResult<Vec<IdentityDeviceObject>>;

    /// Lists identity-directory groups matching `filter`.
    async fn find_groups(&self, filter: &str) -> DirectoryResult<Vec<GroupCandidate>>;

    /// Adds `member_object_id` to `group_id`.
    async fn add_group_member(&self, group_id: &str, member_object_id: &str)
        -> DirectoryResult<()>;
}
