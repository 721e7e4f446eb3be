//! List filters narrowing server collections to what the actor may see.
//!
//! Filters never mutate their inputs and preserve input order. Missing actor
//! identity yields an empty list rather than a guess.

use opj_capture_core::ActorId;
use opj_capture_domain::{Bandit, Capture, CaptureId, OwnedRecord, Role};
use tracing::debug;

use crate::access_policy::{effective_role, resolve};

/// Returns the bandits visible to the actor.
///
/// Roles that view every bandit get the full list. An OPJ sees bandits they
/// own plus bandits appearing in any capture listed in `owned_capture_ids`,
/// so suspects from their cases stay visible even when another officer
/// registered them.
#[must_use]
pub fn filter_bandits(
    bandits: &[Bandit],
    role: Option<Role>,
    actor_id: Option<ActorId>,
    owned_capture_ids: &[CaptureId],
) -> Vec<Bandit> {
    if resolve(role).can_view_all_bandits {
        return bandits.to_vec();
    }

    let (Role::Opj, Some(actor_id)) = (effective_role(role), actor_id) else {
        debug!(role = ?role, "no actor identity, hiding every bandit");
        return Vec::new();
    };

    let visible: Vec<Bandit> = bandits
        .iter()
        .filter(|bandit| {
            bandit.ownership().is_owned_by(actor_id) || bandit.appears_in_any(owned_capture_ids)
        })
        .cloned()
        .collect();

    debug!(
        actor_id = %actor_id,
        owned_capture_count = owned_capture_ids.len(),
        total = bandits.len(),
        visible = visible.len(),
        "filtered bandits for OPJ"
    );

    visible
}

/// Returns the captures visible to the actor.
///
/// Unlike [`filter_bandits`], an OPJ sees only captures they own directly.
#[must_use]
pub fn filter_captures(
    captures: &[Capture],
    role: Option<Role>,
    actor_id: Option<ActorId>,
) -> Vec<Capture> {
    if resolve(role).can_view_all_captures {
        return captures.to_vec();
    }

    let (Role::Opj, Some(actor_id)) = (effective_role(role), actor_id) else {
        return Vec::new();
    };

    captures
        .iter()
        .filter(|capture| capture.ownership().is_owned_by(actor_id))
        .cloned()
        .collect()
}

/// Returns the ids of captures the actor took part in.
///
/// This is the `owned_capture_ids` input of [`filter_bandits`].
#[must_use]
pub fn owned_capture_ids(captures: &[Capture], actor_id: Option<ActorId>) -> Vec<CaptureId> {
    let Some(actor_id) = actor_id else {
        return Vec::new();
    };

    captures
        .iter()
        .filter(|capture| capture.involves(actor_id))
        .map(Capture::id)
        .collect()
}

/// Returns captures a supervisor has validated, in input order.
#[must_use]
pub fn validated_captures(captures: &[Capture]) -> Vec<Capture> {
    captures
        .iter()
        .filter(|capture| capture.is_validated())
        .cloned()
        .collect()
}
