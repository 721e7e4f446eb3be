//! Suspect records and the bandit form.

use chrono::NaiveDate;
use opj_capture_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::{BanditId, CaptureId, EntityKind, InfractionId, OwnedRecord, Ownership};

/// Recorded sex of a bandit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sexe {
    /// Male, transport value `M`.
    #[default]
    #[serde(rename = "M")]
    Masculin,
    /// Female, transport value `F`.
    #[serde(rename = "F")]
    Feminin,
}

impl Sexe {
    /// Returns the transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Masculin => "M",
            Self::Feminin => "F",
        }
    }

    /// Returns the French display label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Masculin => "Masculin",
            Self::Feminin => "Féminin",
        }
    }

    /// Parses a transport value, `None` for anything else.
    #[must_use]
    pub fn from_transport(value: &str) -> Option<Self> {
        match value.trim() {
            "M" => Some(Self::Masculin),
            "F" => Some(Self::Feminin),
            _ => None,
        }
    }

    /// Parses a display label, defaulting to [`Sexe::Masculin`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Féminin" => Self::Feminin,
            _ => Self::Masculin,
        }
    }
}

/// Input payload for building a [`Bandit`] from server data.
#[derive(Debug, Clone, Default)]
pub struct BanditInput {
    /// Server id.
    pub id: BanditId,
    /// Family name.
    pub nom: String,
    /// Alias.
    pub surnom: Option<String>,
    /// Photo as URL or data URI.
    pub photo: Option<String>,
    /// Date the record was added.
    pub date_ajout: Option<String>,
    /// Date of birth.
    pub date_naissance: Option<NaiveDate>,
    /// Recorded sex.
    pub sexe: Option<Sexe>,
    /// Free-form state ("recherché", "arrêté", ...).
    pub etat: Option<String>,
    /// Linked infraction ids.
    pub infraction_ids: Vec<InfractionId>,
    /// Normalised owners.
    pub ownership: Ownership,
    /// Ids of captures this bandit appears in.
    pub capture_ids: Vec<CaptureId>,
}

/// Tracked suspect record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bandit {
    id: BanditId,
    nom: String,
    surnom: Option<String>,
    photo: Option<String>,
    date_ajout: Option<String>,
    date_naissance: Option<NaiveDate>,
    sexe: Option<Sexe>,
    etat: Option<String>,
    infraction_ids: Vec<InfractionId>,
    ownership: Ownership,
    capture_ids: Vec<CaptureId>,
}

impl Bandit {
    /// Creates a bandit record from server data.
    #[must_use]
    pub fn new(input: BanditInput) -> Self {
        let mut capture_ids = input.capture_ids;
        capture_ids.sort_unstable();
        capture_ids.dedup();

        Self {
            id: input.id,
            nom: input.nom.trim().to_owned(),
            surnom: trimmed(input.surnom),
            photo: trimmed(input.photo),
            date_ajout: trimmed(input.date_ajout),
            date_naissance: input.date_naissance,
            sexe: input.sexe,
            etat: trimmed(input.etat),
            infraction_ids: input.infraction_ids,
            ownership: input.ownership,
            capture_ids,
        }
    }

    /// Returns the server id.
    #[must_use]
    pub fn id(&self) -> BanditId {
        self.id
    }

    /// Returns the family name.
    #[must_use]
    pub fn nom(&self) -> &str {
        self.nom.as_str()
    }

    /// Returns the alias.
    #[must_use]
    pub fn surnom(&self) -> Option<&str> {
        self.surnom.as_deref()
    }

    /// Returns the photo reference.
    #[must_use]
    pub fn photo(&self) -> Option<&str> {
        self.photo.as_deref()
    }

    /// Returns the date the record was added.
    #[must_use]
    pub fn date_ajout(&self) -> Option<&str> {
        self.date_ajout.as_deref()
    }

    /// Returns the date of birth.
    #[must_use]
    pub fn date_naissance(&self) -> Option<NaiveDate> {
        self.date_naissance
    }

    /// Returns the recorded sex.
    #[must_use]
    pub fn sexe(&self) -> Option<Sexe> {
        self.sexe
    }

    /// Returns the free-form state.
    #[must_use]
    pub fn etat(&self) -> Option<&str> {
        self.etat.as_deref()
    }

    /// Returns linked infraction ids.
    #[must_use]
    pub fn infraction_ids(&self) -> &[InfractionId] {
        self.infraction_ids.as_slice()
    }

    /// Returns the ids of captures this bandit appears in.
    #[must_use]
    pub fn capture_ids(&self) -> &[CaptureId] {
        self.capture_ids.as_slice()
    }

    /// Returns whether the bandit appears in at least one of `capture_ids`.
    #[must_use]
    pub fn appears_in_any(&self, capture_ids: &[CaptureId]) -> bool {
        self.capture_ids
            .iter()
            .any(|capture_id| capture_ids.contains(capture_id))
    }

    /// Returns whether the search query matches the name or alias.
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        self.nom.to_lowercase().contains(query.as_str())
            || self
                .surnom
                .as_deref()
                .is_some_and(|surnom| surnom.to_lowercase().contains(query.as_str()))
    }
}

impl OwnedRecord for Bandit {
    fn kind(&self) -> EntityKind {
        EntityKind::Bandit
    }

    fn record_id(&self) -> i64 {
        self.id.get()
    }

    fn ownership(&self) -> &Ownership {
        &self.ownership
    }
}

/// Validated content of the create/edit bandit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BanditDraft {
    nom: NonEmptyString,
    surnom: Option<String>,
    date_naissance: Option<NaiveDate>,
    sexe: Sexe,
    etat: Option<String>,
    photo: Option<String>,
    infractions: Vec<InfractionId>,
}

impl BanditDraft {
    /// Creates a draft, rejecting an empty name.
    pub fn new(nom: impl Into<String>) -> AppResult<Self> {
        let nom = nom.into();
        let nom = NonEmptyString::new(nom.trim())
            .map_err(|_| AppError::Validation("bandit name (nom) is required".to_owned()))?;

        Ok(Self {
            nom,
            surnom: None,
            date_naissance: None,
            sexe: Sexe::default(),
            etat: None,
            photo: None,
            infractions: Vec::new(),
        })
    }

    /// Sets the alias.
    #[must_use]
    pub fn with_surnom(mut self, surnom: impl Into<String>) -> Self {
        self.surnom = trimmed(Some(surnom.into()));
        self
    }

    /// Sets the date of birth.
    #[must_use]
    pub fn with_date_naissance(mut self, date_naissance: NaiveDate) -> Self {
        self.date_naissance = Some(date_naissance);
        self
    }

    /// Sets the recorded sex.
    #[must_use]
    pub fn with_sexe(mut self, sexe: Sexe) -> Self {
        self.sexe = sexe;
        self
    }

    /// Sets the free-form state.
    #[must_use]
    pub fn with_etat(mut self, etat: impl Into<String>) -> Self {
        self.etat = trimmed(Some(etat.into()));
        self
    }

    /// Sets the photo reference.
    #[must_use]
    pub fn with_photo(mut self, photo: impl Into<String>) -> Self {
        self.photo = trimmed(Some(photo.into()));
        self
    }

    /// Selects the infraction if absent, deselects it otherwise.
    pub fn toggle_infraction(&mut self, infraction_id: InfractionId) {
        if let Some(position) = self
            .infractions
            .iter()
            .position(|value| *value == infraction_id)
        {
            self.infractions.remove(position);
        } else {
            self.infractions.push(infraction_id);
        }
    }

    /// Returns the name.
    #[must_use]
    pub fn nom(&self) -> &str {
        self.nom.as_str()
    }

    /// Returns the alias.
    #[must_use]
    pub fn surnom(&self) -> Option<&str> {
        self.surnom.as_deref()
    }

    /// Returns the date of birth.
    #[must_use]
    pub fn date_naissance(&self) -> Option<NaiveDate> {
        self.date_naissance
    }

    /// Returns the recorded sex.
    #[must_use]
    pub fn sexe(&self) -> Sexe {
        self.sexe
    }

    /// Returns the free-form state.
    #[must_use]
    pub fn etat(&self) -> Option<&str> {
        self.etat.as_deref()
    }

    /// Returns the photo reference.
    #[must_use]
    pub fn photo(&self) -> Option<&str> {
        self.photo.as_deref()
    }

    /// Returns the selected infraction ids in selection order.
    #[must_use]
    pub fn infractions(&self) -> &[InfractionId] {
        self.infractions.as_slice()
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim().to_owned();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}

#[cfg(test)]
mod tests {
    use opj_capture_core::ActorId;

    use super::{Bandit, BanditDraft, BanditInput, Sexe};
    use crate::{BanditId, CaptureId, InfractionId, OwnedRecord, Ownership};

    #[test]
    fn draft_requires_a_name() {
        assert!(BanditDraft::new("  ").is_err());
        assert!(BanditDraft::new(" Kasongo ").is_ok());
    }

    #[test]
    fn toggle_infraction_adds_then_removes() {
        let draft = BanditDraft::new("Kasongo");
        assert!(draft.is_ok());
        let mut draft = draft.unwrap_or_else(|_| unreachable!());

        draft.toggle_infraction(InfractionId::new(4));
        draft.toggle_infraction(InfractionId::new(7));
        assert_eq!(
            draft.infractions(),
            &[InfractionId::new(4), InfractionId::new(7)]
        );

        draft.toggle_infraction(InfractionId::new(4));
        assert_eq!(draft.infractions(), &[InfractionId::new(7)]);
    }

    #[test]
    fn sexe_labels_and_defaults() {
        assert_eq!(Sexe::Feminin.label(), "Féminin");
        assert_eq!(Sexe::from_label("Féminin"), Sexe::Feminin);
        assert_eq!(Sexe::from_label("Autre"), Sexe::Masculin);
        assert_eq!(Sexe::from_transport("X"), None);
    }

    #[test]
    fn capture_membership_and_search() {
        let bandit = Bandit::new(BanditInput {
            id: BanditId::new(2),
            nom: "Ilunga".to_owned(),
            surnom: Some("Le Renard".to_owned()),
            ownership: Ownership::single(ActorId::new(9)),
            capture_ids: vec![CaptureId::new(100)],
            ..BanditInput::default()
        });

        assert!(bandit.appears_in_any(&[CaptureId::new(100), CaptureId::new(5)]));
        assert!(!bandit.appears_in_any(&[]));
        assert!(bandit.matches_query("renard"));
        assert!(!bandit.matches_query("lion"));
        assert!(bandit.ownership().is_owned_by(ActorId::new(9)));
    }
}
