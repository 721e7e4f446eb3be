//! Offense types and their approval workflow state.

use opj_capture_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::{EntityKind, InfractionId, OwnedRecord, Ownership};

/// Input payload for building an [`Infraction`] from server data.
#[derive(Debug, Clone, Default)]
pub struct InfractionInput {
    /// Server id.
    pub id: InfractionId,
    /// Short title.
    pub libelle: String,
    /// Longer description.
    pub description: Option<String>,
    /// Whether a supervisor approved the infraction.
    pub is_approved: bool,
    /// Display name of the approver.
    pub approved_by: Option<String>,
    /// Normalised owners.
    pub ownership: Ownership,
}

/// Classified offense type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Infraction {
    id: InfractionId,
    libelle: String,
    description: Option<String>,
    is_approved: bool,
    approved_by: Option<String>,
    ownership: Ownership,
}

impl Infraction {
    /// Creates an infraction record from server data.
    #[must_use]
    pub fn new(input: InfractionInput) -> Self {
        Self {
            id: input.id,
            libelle: input.libelle.trim().to_owned(),
            description: input.description,
            is_approved: input.is_approved,
            approved_by: input.approved_by,
            ownership: input.ownership,
        }
    }

    /// Returns the server id.
    #[must_use]
    pub fn id(&self) -> InfractionId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn libelle(&self) -> &str {
        self.libelle.as_str()
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns whether the infraction is approved.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.is_approved
    }

    /// Returns the approver's display name.
    #[must_use]
    pub fn approved_by(&self) -> Option<&str> {
        self.approved_by.as_deref()
    }
}

impl OwnedRecord for Infraction {
    fn kind(&self) -> EntityKind {
        EntityKind::Infraction
    }

    fn record_id(&self) -> i64 {
        self.id.get()
    }

    fn ownership(&self) -> &Ownership {
        &self.ownership
    }
}

/// Validated content of the create/edit infraction form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfractionDraft {
    libelle: NonEmptyString,
    description: String,
}

impl InfractionDraft {
    /// Creates a draft, rejecting an empty title.
    pub fn new(libelle: impl Into<String>, description: impl Into<String>) -> AppResult<Self> {
        let libelle = libelle.into();
        let libelle = NonEmptyString::new(libelle.trim()).map_err(|_| {
            AppError::Validation("infraction title (libelle) is required".to_owned())
        })?;

        Ok(Self {
            libelle,
            description: description.into().trim().to_owned(),
        })
    }

    /// Returns the title.
    #[must_use]
    pub fn libelle(&self) -> &str {
        self.libelle.as_str()
    }

    /// Returns the description, possibly empty.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }
}
