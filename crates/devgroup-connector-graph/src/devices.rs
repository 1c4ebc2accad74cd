//! Managed device and device object mapping.

use devgroup_core::{DeviceRecord, IdentityDeviceObject};
use serde::Deserialize;

/// `$select` for Intune managed devices.
pub(crate) const MANAGED_DEVICE_SELECT: &str = "id,deviceName,managedDeviceName,manufacturer,model,operatingSystem,azureADDeviceId,userPrincipalName,userId";

/// `$select` for Entra device objects.
pub(crate) const DEVICE_OBJECT_SELECT: &str = "id,deviceId,displayName";

/// Intune `managedDevice` as returned by Graph.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ManagedDevice {
    id: String,
    device_name: Option<String>,
    managed_device_name: Option<String>,
    manufacturer: Option<String>,
    model: Option<String>,
    operating_system: Option<String>,
    #[serde(rename = "azureADDeviceId")]
    azure_ad_device_id: Option<String>,
    user_principal_name: Option<String>,
    user_id: Option<String>,
}

impl From<ManagedDevice> for DeviceRecord {
    fn from(device: ManagedDevice) -> Self {
        Self {
            inventory_id: device.id,
            managed_device_name: non_empty(device.managed_device_name),
            display_name: non_empty(device.device_name),
            manufacturer: non_empty(device.manufacturer),
            model: non_empty(device.model),
            operating_system: non_empty(device.operating_system),
            cross_directory_id: non_empty(device.azure_ad_device_id),
            owner_principal_name: non_empty(device.user_principal_name),
            owner_id: non_empty(device.user_id),
        }
    }
}

/// Entra `device` object.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeviceObject {
    id: String,
    device_id: Option<String>,
    display_name: Option<String>,
}

impl From<DeviceObject> for IdentityDeviceObject {
    fn from(object: DeviceObject) -> Self {
        Self {
            object_id: object.id,
            device_id: object.device_id.unwrap_or_default(),
            display_name: non_empty(object.display_name),
        }
    }
}

/// Intune reports unset properties as empty strings.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
