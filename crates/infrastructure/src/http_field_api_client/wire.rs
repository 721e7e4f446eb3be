//! JSON payloads exchanged with the field-operations API.
//!
//! The server has shipped several shapes for the same resource over time.
//! Everything tolerated here is folded into domain records once, so the
//! rest of the workspace only sees one representation.

use chrono::NaiveDate;
use opj_capture_core::{ActorId, AppError, AppResult};
use opj_capture_domain::{
    Bandit, BanditDraft, BanditId, BanditInput, Capture, CaptureDraft, CaptureId, CaptureInput,
    CaptureLocation, Infraction,
    InfractionDraft, InfractionId, InfractionInput, Ownership, PasswordChange, Sexe,
    ValidationStatus,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const TOKEN_KEYS: [&str; 4] = ["token", "access_token", "accessToken", "access-token"];

/// Returns the records of a list response and the collection size the
/// server reported.
///
/// Accepts a bare array, or an object carrying the array under
/// `hydra:member`, `data` or the resource-specific key. Anything else is an
/// empty collection. The size is read from `hydra:totalItems`, which API
/// Platform sends alongside a paginated `hydra:member`.
pub(super) fn extract_collection(
    document: Value,
    resource_key: &str,
) -> (Vec<Value>, Option<usize>) {
    match document {
        Value::Array(items) => (items, None),
        Value::Object(mut object) => {
            let total_items = object
                .get("hydra:totalItems")
                .and_then(Value::as_u64)
                .and_then(|total| usize::try_from(total).ok());
            let items = ["hydra:member", "data", resource_key]
                .into_iter()
                .find_map(|key| match object.remove(key) {
                    Some(Value::Array(items)) => Some(items),
                    _ => None,
                })
                .unwrap_or_default();
            (items, total_items)
        }
        _ => (Vec::new(), None),
    }
}

/// Splits a login response into the user object and the bearer token.
pub(super) fn extract_login(document: Value) -> AppResult<(Value, String)> {
    let Value::Object(mut object) = document else {
        return Err(AppError::Internal(
            "/api/login returned a non-object body".to_owned(),
        ));
    };

    let user = ["user", "data"]
        .iter()
        .find_map(|key| match object.remove(*key) {
            Some(user @ Value::Object(_)) => Some(user),
            _ => None,
        })
        .ok_or_else(|| AppError::Internal("/api/login response has no user".to_owned()))?;

    let token = TOKEN_KEYS
        .iter()
        .find_map(|key| match object.remove(*key) {
            Some(Value::String(token)) if !token.trim().is_empty() => Some(token),
            _ => None,
        })
        .ok_or_else(|| AppError::Internal("/api/login response has no token".to_owned()))?;

    Ok((user, token))
}

/// Extracts the human-readable message from an error body.
pub(super) fn response_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(object)) => ["message", "error", "detail", "hydra:description"]
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_str))
            .map(str::to_owned)
            .or_else(|| Some(trimmed.to_owned())),
        _ => Some(trimmed.to_owned()),
    }
}

/// Resolves a reference the API may send as a number, a numeric string, an
/// IRI such as `/api/users/3`, or an embedded object with an `id`.
fn reference_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text
            .trim()
            .rsplit('/')
            .next()
            .and_then(|segment| segment.parse().ok()),
        Value::Object(object) => object.get("id").and_then(reference_id),
        _ => None,
    }
}

fn actor_reference(value: Option<&Value>) -> Option<ActorId> {
    value.and_then(reference_id).map(ActorId::new)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    let date = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

fn person_name(value: &Value) -> Option<String> {
    match value {
        Value::String(name) => non_blank(Some(name.clone())),
        Value::Object(object) => {
            let name = ["prenom", "nom"]
                .iter()
                .filter_map(|key| object.get(*key).and_then(Value::as_str))
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            non_blank(Some(name))
        }
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BanditPayload {
    id: i64,
    #[serde(default)]
    nom: Option<String>,
    #[serde(default)]
    surnom: Option<String>,
    #[serde(default)]
    photo: Option<String>,
    #[serde(default)]
    date_ajout: Option<String>,
    #[serde(default)]
    date_naissance: Option<String>,
    #[serde(default)]
    sexe: Option<String>,
    #[serde(default)]
    etat: Option<String>,
    #[serde(default)]
    infractions: Option<Vec<Value>>,
    #[serde(default)]
    captures: Option<Vec<Value>>,
    #[serde(default)]
    created_by: Option<Value>,
    #[serde(default)]
    user_id: Option<Value>,
    #[serde(default)]
    user: Option<Value>,
}

impl BanditPayload {
    pub(super) fn into_bandit(self) -> Bandit {
        let ownership = Ownership::from_candidates([
            actor_reference(self.created_by.as_ref()),
            actor_reference(self.user_id.as_ref()),
            actor_reference(self.user.as_ref()),
        ]);

        Bandit::new(BanditInput {
            id: BanditId::new(self.id),
            nom: self.nom.unwrap_or_default(),
            surnom: non_blank(self.surnom),
            photo: non_blank(self.photo),
            date_ajout: non_blank(self.date_ajout),
            date_naissance: parse_date(self.date_naissance.as_deref()),
            sexe: self.sexe.as_deref().and_then(Sexe::from_transport),
            etat: non_blank(self.etat),
            infraction_ids: self
                .infractions
                .unwrap_or_default()
                .iter()
                .filter_map(reference_id)
                .map(InfractionId::new)
                .collect(),
            ownership,
            capture_ids: self
                .captures
                .unwrap_or_default()
                .iter()
                .filter_map(reference_id)
                .map(CaptureId::new)
                .collect(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CapturePayload {
    id: i64,
    #[serde(default)]
    bandit: Option<Value>,
    #[serde(default)]
    opj: Option<Value>,
    #[serde(default)]
    responsable: Option<Value>,
    #[serde(default)]
    created_by: Option<Value>,
    #[serde(default)]
    user_id: Option<Value>,
    #[serde(default)]
    date_capture: Option<String>,
    #[serde(default)]
    date_capture_formatted: Option<String>,
    #[serde(default)]
    lieu_capture: Option<String>,
    #[serde(default)]
    commentaire: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    etat: Option<String>,
    #[serde(default)]
    validation: Option<Value>,
}

impl CapturePayload {
    pub(super) fn into_capture(self) -> Capture {
        let created_by = actor_reference(self.created_by.as_ref());

        let validation_marker = match &self.validation {
            Some(Value::String(marker)) => Some(marker.as_str()),
            Some(Value::Object(object)) => object.get("statut").and_then(Value::as_str),
            _ => None,
        };
        let status = ValidationStatus::from_markers([
            self.status.as_deref(),
            self.etat.as_deref(),
            validation_marker,
        ]);

        let bandit_nom = match &self.bandit {
            Some(Value::Object(object)) => object
                .get("nom")
                .and_then(Value::as_str)
                .map(str::to_owned),
            _ => None,
        };

        Capture::new(CaptureInput {
            id: CaptureId::new(self.id),
            bandit_id: self.bandit.as_ref().and_then(reference_id).map(BanditId::new),
            bandit_nom: non_blank(bandit_nom),
            ownership: Ownership::from_candidates([
                created_by,
                actor_reference(self.user_id.as_ref()),
            ]),
            involved_officers: Ownership::from_candidates([
                actor_reference(self.opj.as_ref()),
                actor_reference(self.responsable.as_ref()),
                created_by,
            ]),
            officer_name: self.opj.as_ref().and_then(person_name),
            date_capture: non_blank(self.date_capture_formatted)
                .or_else(|| non_blank(self.date_capture)),
            lieu_capture: non_blank(self.lieu_capture),
            commentaire: non_blank(self.commentaire),
            status,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct InfractionPayload {
    id: i64,
    libelle: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    is_approved: Option<bool>,
    #[serde(default)]
    approved_by: Option<Value>,
    #[serde(default)]
    created_by: Option<Value>,
    #[serde(default)]
    user_id: Option<Value>,
    #[serde(default)]
    user: Option<Value>,
}

impl InfractionPayload {
    pub(super) fn into_infraction(self) -> Infraction {
        Infraction::new(InfractionInput {
            id: InfractionId::new(self.id),
            libelle: self.libelle,
            description: non_blank(self.description),
            is_approved: self.is_approved.unwrap_or(false),
            approved_by: self.approved_by.as_ref().and_then(person_name),
            ownership: Ownership::from_candidates([
                actor_reference(self.created_by.as_ref()),
                actor_reference(self.user_id.as_ref()),
                actor_reference(self.user.as_ref()),
            ]),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BanditRequest<'a> {
    nom: &'a str,
    surnom: &'a str,
    date_naissance: String,
    sexe: &'static str,
    etat: &'a str,
    photo: &'a str,
    infractions: &'a [InfractionId],
}

impl<'a> From<&'a BanditDraft> for BanditRequest<'a> {
    fn from(draft: &'a BanditDraft) -> Self {
        Self {
            nom: draft.nom(),
            surnom: draft.surnom().unwrap_or_default(),
            date_naissance: draft
                .date_naissance()
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            sexe: draft.sexe().as_str(),
            etat: draft.etat().unwrap_or_default(),
            photo: draft.photo().unwrap_or_default(),
            infractions: draft.infractions(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CaptureRequest<'a> {
    description: &'a str,
    bandit: BanditId,
    infraction: InfractionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    photo: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lieu_capture: Option<&'a str>,
}

impl<'a> From<&'a CaptureDraft> for CaptureRequest<'a> {
    fn from(draft: &'a CaptureDraft) -> Self {
        let (latitude, longitude, lieu_capture) = match draft.location() {
            Some(CaptureLocation::Coordinates {
                latitude,
                longitude,
            }) => (Some(*latitude), Some(*longitude), None),
            Some(CaptureLocation::Address(address)) => (None, None, Some(address.as_str())),
            None => (None, None, None),
        };

        Self {
            description: draft.description(),
            bandit: draft.bandit_id(),
            infraction: draft.infraction_id(),
            photo: draft.photo(),
            latitude,
            longitude,
            lieu_capture,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct InfractionRequest<'a> {
    libelle: &'a str,
    description: &'a str,
}

impl<'a> From<&'a InfractionDraft> for InfractionRequest<'a> {
    fn from(draft: &'a InfractionDraft) -> Self {
        Self {
            libelle: draft.libelle(),
            description: draft.description(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PasswordChangeRequest<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

impl<'a> From<&'a PasswordChange> for PasswordChangeRequest<'a> {
    fn from(change: &'a PasswordChange) -> Self {
        Self {
            current_password: change.current_password(),
            new_password: change.new_password(),
        }
    }
}
