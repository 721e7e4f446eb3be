//! Permission resolver over the static role table.
//!
//! An absent role resolves to [`Role::Opj`]. Unrecognized role strings never
//! reach this module: they are converted to [`Role::Opj`] by
//! [`Role::from_transport`] where session data is deserialized.

use opj_capture_domain::{Capability, PermissionSet, Role};

/// Returns the role used for every policy decision.
#[must_use]
pub fn effective_role(role: Option<Role>) -> Role {
    role.unwrap_or_default()
}

/// Returns the permission set for `role`, least privilege when absent.
#[must_use]
pub fn resolve(role: Option<Role>) -> &'static PermissionSet {
    effective_role(role).permissions()
}

/// Returns whether `role` carries `capability`.
#[must_use]
pub fn has_capability(role: Option<Role>, capability: Capability) -> bool {
    resolve(role).allows(capability)
}
