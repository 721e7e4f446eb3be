//! Per-action decisions used to offer or refuse mutations.

use opj_capture_core::ActorId;
use opj_capture_domain::{OwnedRecord, Role};

use crate::access_policy::{effective_role, resolve};

/// Returns whether the actor may delete this record.
///
/// The delete flag for the record kind must be set and the role must not be
/// OPJ: officers never delete, even records they own. Other roles holding
/// the flag may delete any record; ownership is not consulted.
#[must_use]
pub fn can_delete_entity<R>(record: &R, role: Option<Role>, _actor_id: Option<ActorId>) -> bool
where
    R: OwnedRecord + ?Sized,
{
    if !resolve(role).allows(record.kind().delete_capability()) {
        return false;
    }

    effective_role(role) != Role::Opj
}

/// Returns whether the role may validate or reject captures.
#[must_use]
pub fn can_validate(role: Option<Role>) -> bool {
    resolve(role).can_validate_capture
}

/// Returns whether the role may add, approve and reject infractions.
///
/// Both the create and the validate flags are required.
#[must_use]
pub fn can_manage_infractions(role: Option<Role>) -> bool {
    let permissions = resolve(role);
    permissions.can_create_infraction && permissions.can_validate_infraction
}

/// Returns the title of the capture list screen.
#[must_use]
pub fn capture_list_title(role: Option<Role>) -> &'static str {
    match role {
        Some(Role::Admin) => "Toutes les Captures",
        _ => "Mes Captures",
    }
}
