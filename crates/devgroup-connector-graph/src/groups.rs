//! Group mapping from Graph JSON.

use devgroup_core::GroupCandidate;

use crate::{GraphError, GraphResult};

/// `$select` for group lookups; the flags the eligibility rules need.
pub(crate) const GROUP_SELECT: &str =
    "id,displayName,description,groupTypes,mailEnabled,securityEnabled";

/// Parses a group from the Graph API JSON response.
///
/// Missing flags read as `false`, which makes such a group ineligible.
pub(crate) fn group_from_json(value: &serde_json::Value) -> GraphResult<GroupCandidate> {
    let group_types = value
        .get("groupTypes")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str())
                .map(String::from)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let security_enabled = value
        .get("securityEnabled")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    let mail_enabled = value
        .get("mailEnabled")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    Ok(GroupCandidate {
        object_id: value
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| GraphError::InvalidResponse("Missing group id".into()))?
            .to_string(),
        display_name: value
            .get("displayName")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        description: value
            .get("description")
            .and_then(|v| v.as_str())
            .map(String::from),
        group_types,
        mail_enabled,
        security_enabled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_security_group() {
        let group = group_from_json(&json!({
            "id": "g-1",
            "displayName": "Secure-Laptops",
            "description": null,
            "groupTypes": [],
            "mailEnabled": false,
            "securityEnabled": true
        }))
        .unwrap();

        assert_eq!(group.object_id, "g-1");
        assert!(group.security_enabled);
        assert!(!group.is_dynamic());
        assert_eq!(group.description, None);
    }

    #[test]
    fn test_dynamic_m365_group() {
        let group = group_from_json(&json!({
            "id": "g-2",
            "displayName": "All Staff",
            "groupTypes": ["Unified", "DynamicMembership"],
            "mailEnabled": true,
            "securityEnabled": false
        }))
        .unwrap();

        assert!(group.is_dynamic());
        assert!(group.mail_enabled);
        assert_eq!(group.group_types, vec!["Unified", "DynamicMembership"]);
    }

    #[test]
    fn test_missing_flags_default_to_false() {
        let group = group_from_json(&json!({"id": "g-3"})).unwrap();
        assert!(!group.security_enabled);
        assert!(!group.mail_enabled);
        assert_eq!(group.display_name, "");
    }

    #[test]
    fn test_missing_id_is_an_error() {
        assert!(group_from_json(&json!({"displayName": "x"})).is_err());
    }
}
