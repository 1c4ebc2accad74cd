//! OData filter expressions.
//!
//! Free-text criteria end up inside single-quoted string literals. A quote in
//! the criterion is doubled so it stays part of the literal.

/// Inventory: owning identity principal name.
pub const OWNER_PRINCIPAL_NAME: &str = "userPrincipalName";
/// Inventory: device display name.
pub const DEVICE_NAME: &str = "deviceName";
/// Identity directory: native device identifier.
pub const DEVICE_ID: &str = "deviceId";
/// Identity directory: group display name.
pub const DISPLAY_NAME: &str = "displayName";

/// Escapes a value for use inside an OData string literal.
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// `property eq 'value'`
pub fn eq(property: &str, value: &str) -> String {
    format!("{property} eq '{}'", escape_literal(value))
}

/// `contains(property,'value')`
pub fn contains(property: &str, value: &str) -> String {
    format!("contains({property},'{}')", escape_literal(value))
}
