//! Record ownership normalised from the upstream data shapes.

use opj_capture_core::ActorId;
use serde::{Deserialize, Serialize};

use crate::Capability;

/// Actor ids that the upstream data names as owners of one record.
///
/// Older API versions report ownership as `createdBy`, `userId` or a nested
/// `user.id`. These are synonyms: the record is owned by an actor when any of
/// them names it. The set is built once when a payload is converted into a
/// domain record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ownership(Vec<ActorId>);

impl Ownership {
    /// Builds an ownership set from optional synonym values.
    #[must_use]
    pub fn from_candidates(candidates: impl IntoIterator<Item = Option<ActorId>>) -> Self {
        let mut owners: Vec<ActorId> = candidates.into_iter().flatten().collect();
        owners.sort_unstable();
        owners.dedup();
        Self(owners)
    }

    /// Builds an ownership set naming a single actor.
    #[must_use]
    pub fn single(owner: ActorId) -> Self {
        Self(vec![owner])
    }

    /// Returns whether `actor_id` is one of the owners.
    #[must_use]
    pub fn is_owned_by(&self, actor_id: ActorId) -> bool {
        self.0.contains(&actor_id)
    }

    /// Returns the distinct owner ids in ascending order.
    #[must_use]
    pub fn owners(&self) -> &[ActorId] {
        self.0.as_slice()
    }

    /// Returns whether no owner is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Kinds of records subject to per-instance action gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Suspect record.
    Bandit,
    /// Arrest record.
    Capture,
    /// Offense type.
    Infraction,
}

impl EntityKind {
    /// Returns the stable name of this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bandit => "bandit",
            Self::Capture => "capture",
            Self::Infraction => "infraction",
        }
    }

    /// Returns the capability that gates deleting a record of this kind.
    #[must_use]
    pub fn delete_capability(&self) -> Capability {
        match self {
            Self::Bandit => Capability::CanDeleteBandit,
            Self::Capture => Capability::CanDeleteCapture,
            Self::Infraction => Capability::CanDeleteInfraction,
        }
    }
}

/// Domain record carrying normalised ownership.
pub trait OwnedRecord {
    /// Returns the record kind.
    fn kind(&self) -> EntityKind;

    /// Returns the record's server id.
    fn record_id(&self) -> i64;

    /// Returns the owners named by the upstream data.
    fn ownership(&self) -> &Ownership;
}
