//! relacl parsing

use super::Permission;

/// One `grantee=flags/grantor` item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclItem {
    /// Empty grantee in the catalog means PUBLIC
    pub grantee: String,
    pub permissions: Vec<Permission>,
    pub grantor: String,
}

/// Parse a relacl array literal such as `{postgres=arwdDxt/postgres,=r/postgres}`.
///
/// Returns the offending entry when an item does not have the
/// `grantee=flags/grantor` shape.
pub fn parse_acl(acl: &str) -> Result<Vec<AclItem>, String> {
    let cleaned = acl
        .trim_start_matches('{')
        .trim_end_matches('}')
        .replace('"', "");

    let mut items = Vec::new();
    for entry in cleaned.split(',') {
        if entry.is_empty() {
            continue;
        }

        let (grantee, rest) = entry.split_once('=').ok_or_else(|| entry.to_string())?;
        let (flags, grantor) = rest.split_once('/').ok_or_else(|| entry.to_string())?;

        let grantee = if grantee.is_empty() {
            "PUBLIC".to_string()
        } else {
            grantee.to_string()
        };

        items.push(AclItem {
            grantee,
            permissions: flags.chars().map(Permission::from_flag).collect(),
            grantor: grantor.to_string(),
        });
    }

    Ok(items)
}
