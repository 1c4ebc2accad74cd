//! Inventory → identity directory identifier translation.

use tracing::{debug, instrument, warn};

use crate::directory::DirectoryClient;
use crate::error::DirectoryError;
use crate::filter;
use crate::model::IdentityDeviceObject;

/// Cross-directory identifier the inventory reports for devices that were
/// never joined to the identity directory.
const UNJOINED_DEVICE_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Outcome of a translation.
///
/// `NotFound` is a normal answer (stale or unjoined device). `Failed` means
/// the lookup itself did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    Found(IdentityDeviceObject),
    NotFound,
    Failed(DirectoryError),
}

/// Maps an inventory device's cross-directory identifier to its
/// identity-directory object.
pub struct IdentifierTranslator<'a> {
    directory: &'a dyn DirectoryClient,
}

impl<'a> IdentifierTranslator<'a> {
    pub fn new(directory: &'a dyn DirectoryClient) -> Self {
        Self { directory }
    }

    /// Looks up the identity object whose device id equals `cross_directory_id`.
    #[instrument(skip(self))]
    pub async fn translate(&self, cross_directory_id: &str) -> Translation {
        let device_id = cross_directory_id.trim();
        if device_id.is_empty() || device_id == UNJOINED_DEVICE_ID {
            debug!("Device has no usable cross-directory identifier");
            return Translation::NotFound;
        }

        let filter = filter::eq(filter::DEVICE_ID, device_id);
        let objects = match self.directory.find_device_objects(&filter).await {
            Ok(objects) => objects,
            Err(e) => return Translation::Failed(e),
        };

        if objects.len() > 1 {
            warn!(
                "{} identity objects share device id {}, using the first",
                objects.len(),
                device_id
            );
        }

        match objects.into_iter().next() {
            Some(object) => Translation::Found(object),
            None => Translation::NotFound,
        }
    }
}
