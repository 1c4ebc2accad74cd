//! Device resolution against the inventory directory.

use tracing::{debug, instrument};

use crate::directory::DirectoryClient;
use crate::error::{DirectoryError, DirectoryResult};
use crate::filter;
use crate::model::{DeviceRecord, DeviceSelector};

/// Produces the candidate inventory devices for a selector.
pub struct DeviceResolver<'a> {
    directory: &'a dyn DirectoryClient,
}

impl<'a> DeviceResolver<'a> {
    pub fn new(directory: &'a dyn DirectoryClient) -> Self {
        Self { directory }
    }

    /// Builds the inventory filter for owner and name lookups.
    ///
    /// Identifier lookups are direct fetches and have no filter.
    pub fn filter_for(selector: &DeviceSelector) -> Option<String> {
        match selector {
            DeviceSelector::Owner(upn) => Some(filter::eq(filter::OWNER_PRINCIPAL_NAME, upn)),
            DeviceSelector::Name(part) => Some(filter::contains(filter::DEVICE_NAME, part)),
            DeviceSelector::Identifier(_) => None,
        }
    }

    /// Returns every inventory device matching `selector`.
    ///
    /// An empty vector means nothing matched. Errors are remote failures,
    /// or a blank criterion refused before querying.
    #[instrument(skip(self), fields(mode = ?selector.mode()))]
    pub async fn resolve(&self, selector: &DeviceSelector) -> DirectoryResult<Vec<DeviceRecord>> {
        let criterion = selector.criterion();
        if criterion.trim().is_empty() {
            return Err(DirectoryError::InvalidRequest(
                "device search criterion must not be blank".into(),
            ));
        }

        let devices = match Self::filter_for(selector) {
            Some(filter) => self.directory.find_managed_devices(&filter).await?,
            None => self
                .directory
                .get_managed_device(criterion.trim())
                .await?
                .into_iter()
                .collect(),
        };

        debug!("Resolved {} candidate device(s)", devices.len());
        Ok(devices)
    }
}
