//! Group membership writes.

use serde_json::{json, Value};

/// `$ref` body pointing at a directory object.
pub(crate) fn member_reference(base_url: &str, object_id: &str) -> Value {
    json!({
        "@odata.id": format!("{}/directoryObjects/{}", base_url, urlencoding::encode(object_id))
    })
}

/// `members/$ref` collection of a group.
pub(crate) fn members_ref_url(base_url: &str, group_id: &str) -> String {
    format!(
        "{}/groups/{}/members/$ref",
        base_url,
        urlencoding::encode(group_id)
    )
}
