//! Arrest records and their validation status.

use opj_capture_core::{ActorId, AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::{BanditId, CaptureId, EntityKind, InfractionId, OwnedRecord, Ownership};

/// Normalised validation state of a capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// Awaiting supervisor review.
    #[default]
    Pending,
    /// Accepted by a supervisor.
    Validated,
    /// Rejected by a supervisor.
    Rejected,
}

impl ValidationStatus {
    /// Returns the transport value the API uses for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "en_attente",
            Self::Validated => "validé",
            Self::Rejected => "rejeté",
        }
    }

    /// Classifies one raw status marker, case-insensitively.
    ///
    /// The API has reported validation as `VALIDEE`, `validé` or `validée`
    /// and rejection as `REJETEE`, `rejeté` or `rejetée`.
    #[must_use]
    pub fn classify(marker: &str) -> Option<Self> {
        match marker.trim().to_lowercase().as_str() {
            "validee" | "validée" | "validé" | "valide" => Some(Self::Validated),
            "rejetee" | "rejetée" | "rejeté" | "rejete" => Some(Self::Rejected),
            "en_attente" | "en attente" | "pending" => Some(Self::Pending),
            _ => None,
        }
    }

    /// Folds the several status markers a capture payload may carry.
    ///
    /// Any validated marker wins, then any rejected marker; otherwise the
    /// capture is pending.
    #[must_use]
    pub fn from_markers<'a>(markers: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        let classified: Vec<Self> = markers
            .into_iter()
            .flatten()
            .filter_map(Self::classify)
            .collect();

        if classified.contains(&Self::Validated) {
            Self::Validated
        } else if classified.contains(&Self::Rejected) {
            Self::Rejected
        } else {
            Self::Pending
        }
    }
}

/// Input payload for building a [`Capture`] from server data.
#[derive(Debug, Clone, Default)]
pub struct CaptureInput {
    /// Server id.
    pub id: CaptureId,
    /// Captured bandit, when the payload links one.
    pub bandit_id: Option<BanditId>,
    /// Captured bandit's name for list display.
    pub bandit_nom: Option<String>,
    /// Owners from `createdBy` / `userId`.
    pub ownership: Ownership,
    /// Officers involved, from `opj.id`, `responsable.id` and `createdBy`.
    pub involved_officers: Ownership,
    /// Officer display name.
    pub officer_name: Option<String>,
    /// Capture date as sent by the API.
    pub date_capture: Option<String>,
    /// Capture location.
    pub lieu_capture: Option<String>,
    /// Supervisor or officer comment.
    pub commentaire: Option<String>,
    /// Normalised validation state.
    pub status: ValidationStatus,
}

/// Arrest record linking an officer, a bandit and evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    id: CaptureId,
    bandit_id: Option<BanditId>,
    bandit_nom: Option<String>,
    ownership: Ownership,
    involved_officers: Ownership,
    officer_name: Option<String>,
    date_capture: Option<String>,
    lieu_capture: Option<String>,
    commentaire: Option<String>,
    status: ValidationStatus,
}

impl Capture {
    /// Creates a capture record from server data.
    #[must_use]
    pub fn new(input: CaptureInput) -> Self {
        Self {
            id: input.id,
            bandit_id: input.bandit_id,
            bandit_nom: input.bandit_nom,
            ownership: input.ownership,
            involved_officers: input.involved_officers,
            officer_name: input.officer_name,
            date_capture: input.date_capture,
            lieu_capture: input.lieu_capture,
            commentaire: input.commentaire,
            status: input.status,
        }
    }

    /// Returns the server id.
    #[must_use]
    pub fn id(&self) -> CaptureId {
        self.id
    }

    /// Returns the captured bandit id.
    #[must_use]
    pub fn bandit_id(&self) -> Option<BanditId> {
        self.bandit_id
    }

    /// Returns the captured bandit's name.
    #[must_use]
    pub fn bandit_nom(&self) -> Option<&str> {
        self.bandit_nom.as_deref()
    }

    /// Returns the officer display name.
    #[must_use]
    pub fn officer_name(&self) -> Option<&str> {
        self.officer_name.as_deref()
    }

    /// Returns the capture date.
    #[must_use]
    pub fn date_capture(&self) -> Option<&str> {
        self.date_capture.as_deref()
    }

    /// Returns the capture location.
    #[must_use]
    pub fn lieu_capture(&self) -> Option<&str> {
        self.lieu_capture.as_deref()
    }

    /// Returns the comment.
    #[must_use]
    pub fn commentaire(&self) -> Option<&str> {
        self.commentaire.as_deref()
    }

    /// Returns the validation state.
    #[must_use]
    pub fn status(&self) -> ValidationStatus {
        self.status
    }

    /// Returns whether a supervisor validated this capture.
    #[must_use]
    pub fn is_validated(&self) -> bool {
        self.status == ValidationStatus::Validated
    }

    /// Returns whether the actor took part in this capture, as assigned
    /// officer or as the one who recorded it.
    #[must_use]
    pub fn involves(&self, actor_id: ActorId) -> bool {
        self.involved_officers.is_owned_by(actor_id)
    }
}

impl OwnedRecord for Capture {
    fn kind(&self) -> EntityKind {
        EntityKind::Capture
    }

    fn record_id(&self) -> i64 {
        self.id.get()
    }

    fn ownership(&self) -> &Ownership {
        &self.ownership
    }
}

/// Where an arrest took place.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureLocation {
    /// GPS fix in decimal degrees.
    Coordinates {
        /// Latitude, -90 to 90.
        latitude: f64,
        /// Longitude, -180 to 180.
        longitude: f64,
    },
    /// Free-form address typed by the officer.
    Address(String),
}

/// Validated content of the new-capture form.
///
/// A capture names one bandit and one infraction and carries a description.
/// The photo, when present, is an already encoded `data:image/...` URI.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureDraft {
    bandit_id: BanditId,
    infraction_id: InfractionId,
    description: NonEmptyString,
    photo: Option<String>,
    location: Option<CaptureLocation>,
}

impl CaptureDraft {
    /// Creates a draft, rejecting unset references and a blank description.
    pub fn new(
        bandit_id: BanditId,
        infraction_id: InfractionId,
        description: impl Into<String>,
    ) -> AppResult<Self> {
        if bandit_id.get() <= 0 {
            return Err(AppError::Validation("a bandit must be selected".to_owned()));
        }
        if infraction_id.get() <= 0 {
            return Err(AppError::Validation(
                "an infraction must be selected".to_owned(),
            ));
        }

        let description = description.into();
        let description = NonEmptyString::new(description.trim())
            .map_err(|_| AppError::Validation("capture description is required".to_owned()))?;

        Ok(Self {
            bandit_id,
            infraction_id,
            description,
            photo: None,
            location: None,
        })
    }

    /// Attaches an encoded photo.
    pub fn with_photo(mut self, photo: impl Into<String>) -> AppResult<Self> {
        let photo = photo.into().trim().to_owned();
        if !photo.starts_with("data:image/") || !photo.contains(";base64,") {
            return Err(AppError::Validation(
                "photo must be a base64 data:image URI".to_owned(),
            ));
        }

        self.photo = Some(photo);
        Ok(self)
    }

    /// Records a GPS position.
    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> AppResult<Self> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::Validation(format!(
                "coordinates out of range: {latitude}, {longitude}"
            )));
        }

        self.location = Some(CaptureLocation::Coordinates {
            latitude,
            longitude,
        });
        Ok(self)
    }

    /// Records a typed address. A blank address leaves the location unset.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        let address = address.into().trim().to_owned();
        self.location = (!address.is_empty()).then_some(CaptureLocation::Address(address));
        self
    }

    /// Returns the captured bandit.
    #[must_use]
    pub fn bandit_id(&self) -> BanditId {
        self.bandit_id
    }

    /// Returns the infraction charged.
    #[must_use]
    pub fn infraction_id(&self) -> InfractionId {
        self.infraction_id
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the encoded photo.
    #[must_use]
    pub fn photo(&self) -> Option<&str> {
        self.photo.as_deref()
    }

    /// Returns the location, if any was recorded.
    #[must_use]
    pub fn location(&self) -> Option<&CaptureLocation> {
        self.location.as_ref()
    }
}
