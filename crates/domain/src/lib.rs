//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod actor;
mod bandit;
mod capture;
mod ids;
mod infraction;
mod ownership;
mod security;
mod user;

pub use actor::Actor;
pub use bandit::{Bandit, BanditDraft, BanditInput, Sexe};
pub use capture::{Capture, CaptureDraft, CaptureInput, CaptureLocation, ValidationStatus};
pub use ids::{BanditId, CaptureId, InfractionId};
pub use infraction::{Infraction, InfractionDraft, InfractionInput};
pub use ownership::{EntityKind, OwnedRecord, Ownership};
pub use security::{Capability, PermissionSet, Role};
pub use user::{PASSWORD_MIN_LENGTH, PasswordChange};
