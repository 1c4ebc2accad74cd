//! Directory records handled during one run.
//!
//! Nothing here is persisted. Records are built from query results, owned
//! by the step that fetched them and dropped when the run ends.

use serde::Serialize;
use std::fmt;

/// Inventory-side view of a managed device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceRecord {
    /// Inventory identifier; the key operators pick a device by.
    pub inventory_id: String,
    /// Name assigned by the management service.
    pub managed_device_name: Option<String>,
    /// Device (host) display name.
    pub display_name: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub operating_system: Option<String>,
    /// Identifier shared with the identity directory's device object.
    pub cross_directory_id: Option<String>,
    /// Principal name of the owning identity.
    pub owner_principal_name: Option<String>,
    /// Object identifier of the owning identity.
    pub owner_id: Option<String>,
}

impl DeviceRecord {
    /// Creates a record with only the inventory identifier set.
    pub fn new(inventory_id: impl Into<String>) -> Self {
        Self {
            inventory_id: inventory_id.into(),
            managed_device_name: None,
            display_name: None,
            manufacturer: None,
            model: None,
            operating_system: None,
            cross_directory_id: None,
            owner_principal_name: None,
            owner_id: None,
        }
    }

    /// Best available name for messages.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.managed_device_name.as_deref())
            .unwrap_or(&self.inventory_id)
    }
}

/// Identity-directory projection of a physical device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityDeviceObject {
    /// Identity-directory object identifier; the member added to a group.
    pub object_id: String,
    /// Native device identifier, equal to the inventory's cross-directory id.
    pub device_id: String,
    pub display_name: Option<String>,
}

/// Identity-directory group projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCandidate {
    pub object_id: String,
    pub display_name: String,
    pub description: Option<String>,
    /// Raw group-type flags, e.g. `Unified` or `DynamicMembership`.
    pub group_types: Vec<String>,
    pub mail_enabled: bool,
    pub security_enabled: bool,
}

impl GroupCandidate {
    /// Returns true if membership is computed by a rule rather than assigned.
    pub fn is_dynamic(&self) -> bool {
        self.group_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case("DynamicMembership"))
    }
}

/// The single membership add a run performs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MembershipRequest {
    pub group_id: String,
    pub member_object_id: String,
}

impl MembershipRequest {
    pub fn new(group: &GroupCandidate, device: &IdentityDeviceObject) -> Self {
        Self {
            group_id: group.object_id.clone(),
            member_object_id: device.object_id.clone(),
        }
    }
}

/// How candidate devices are looked up. Exactly one strategy per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "criterion", rename_all = "snake_case")]
pub enum DeviceSelector {
    /// Owner principal name, matched exactly.
    Owner(String),
    /// Substring of the device display name.
    Name(String),
    /// Inventory identifier.
    Identifier(String),
}

impl DeviceSelector {
    /// Builds the selector for `mode` around `criterion`.
    pub fn new(mode: SelectionMode, criterion: impl Into<String>) -> Self {
        let criterion = criterion.into();
        match mode {
            SelectionMode::Owner => Self::Owner(criterion),
            SelectionMode::Name => Self::Name(criterion),
            SelectionMode::Identifier => Self::Identifier(criterion),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        match self {
            Self::Owner(_) => SelectionMode::Owner,
            Self::Name(_) => SelectionMode::Name,
            Self::Identifier(_) => SelectionMode::Identifier,
        }
    }

    pub fn criterion(&self) -> &str {
        match self {
            Self::Owner(c) | Self::Name(c) | Self::Identifier(c) => c,
        }
    }
}

impl fmt::Display for DeviceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner(c) => write!(f, "owner '{c}'"),
            Self::Name(c) => write!(f, "name containing '{c}'"),
            Self::Identifier(c) => write!(f, "inventory identifier '{c}'"),
        }
    }
}

/// The three device lookup strategies, as offered in the mode menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    Owner,
    Name,
    Identifier,
}

impl SelectionMode {
    /// Menu order; the menu number is the index plus one.
    pub const ALL: [SelectionMode; 3] = [Self::Owner, Self::Name, Self::Identifier];

    /// Menu line text.
    pub fn label(self) -> &'static str {
        match self {
            Self::Owner => "Search by owner principal name",
            Self::Name => "Search by device name",
            Self::Identifier => "Use an inventory device identifier",
        }
    }

    /// Prompt used to ask for the criterion of this mode.
    pub fn criterion_prompt(self) -> &'static str {
        match self {
            Self::Owner => "Owner principal name",
            Self::Name => "Device name (or part of it)",
            Self::Identifier => "Inventory device identifier",
        }
    }

    /// Parses a menu answer: `1`, `2` or `3`.
    pub fn from_menu_choice(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::Owner),
            "2" => Some(Self::Name),
            "3" => Some(Self::Identifier),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(types: &[&str]) -> GroupCandidate {
        GroupCandidate {
            object_id: "g-1".into(),
            display_name: "Secure-Laptops".into(),
            description: None,
            group_types: types.iter().map(|t| t.to_string()).collect(),
            mail_enabled: false,
            security_enabled: true,
        }
    }

    #[test]
    fn test_menu_choice_accepts_exactly_three_options() {
        assert_eq!(SelectionMode::from_menu_choice("1"), Some(SelectionMode::Owner));
        assert_eq!(SelectionMode::from_menu_choice(" 2 "), Some(SelectionMode::Name));
        assert_eq!(
            SelectionMode::from_menu_choice("3"),
            Some(SelectionMode::Identifier)
        );
        assert_eq!(SelectionMode::from_menu_choice("0"), None);
        assert_eq!(SelectionMode::from_menu_choice("4"), None);
        assert_eq!(SelectionMode::from_menu_choice("owner"), None);
        assert_eq!(SelectionMode::from_menu_choice(""), None);
    }

    #[test]
    fn test_selector_round_trips_mode() {
        for mode in SelectionMode::ALL {
            let selector = DeviceSelector::new(mode, "x");
            assert_eq!(selector.mode(), mode);
            assert_eq!(selector.criterion(), "x");
        }
    }

    #[test]
    fn test_dynamic_flag_is_case_insensitive() {
        assert!(group(&["DynamicMembership"]).is_dynamic());
        assert!(group(&["Unified", "dynamicmembership"]).is_dynamic());
        assert!(!group(&["Unified"]).is_dynamic());
        assert!(!group(&[]).is_dynamic());
    }

    #[test]
    fn test_device_label_falls_back_to_identifier() {
        let mut device = DeviceRecord::new("inv-1");
        assert_eq!(device.label(), "inv-1");
        device.managed_device_name = Some("alice_Windows_1/1/2024".into());
        assert_eq!(device.label(), "alice_Windows_1/1/2024");
        device.display_name = Some("LAPTOP-01".into());
        assert_eq!(device.label(), "LAPTOP-01");
    }

    #[test]
    fn test_membership_request_takes_both_identifiers() {
        let object = IdentityDeviceObject {
            object_id: "obj-1".into(),
            device_id: "dev-1".into(),
            display_name: None,
        };
        let request = MembershipRequest::new(&group(&[]), &object);
        assert_eq!(request.group_id, "g-1");
        assert_eq!(request.member_object_id, "obj-1");
    }
}
