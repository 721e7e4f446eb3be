use opj_capture_core::ActorId;
use serde::{Deserialize, Serialize};

use crate::{PermissionSet, Role};

/// The authenticated user as cached in the session after login.
///
/// The role is converted leniently: a missing or unrecognized role becomes
/// [`Role::Opj`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    id: ActorId,
    #[serde(default)]
    role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prenom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    matricule: Option<String>,
}

impl Actor {
    /// Creates an actor without profile details.
    #[must_use]
    pub fn new(id: ActorId, role: Role) -> Self {
        Self {
            id,
            role,
            email: None,
            nom: None,
            prenom: None,
            matricule: None,
        }
    }

    /// Attaches profile details shown on the settings screen.
    #[must_use]
    pub fn with_profile(
        mut self,
        email: Option<String>,
        nom: Option<String>,
        prenom: Option<String>,
        matricule: Option<String>,
    ) -> Self {
        self.email = email;
        self.nom = nom;
        self.prenom = prenom;
        self.matricule = matricule;
        self
    }

    /// Returns the server id.
    #[must_use]
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// Returns the role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the permission set of the actor's role.
    #[must_use]
    pub fn permissions(&self) -> &'static PermissionSet {
        self.role.permissions()
    }

    /// Returns the email, if the server returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the registration number, if any.
    #[must_use]
    pub fn matricule(&self) -> Option<&str> {
        self.matricule.as_deref()
    }

    /// Returns "prenom nom", falling back to the email and then the id.
    #[must_use]
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.prenom.as_deref(), self.nom.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        if !parts.is_empty() {
            return parts.join(" ");
        }

        self.email
            .clone()
            .unwrap_or_else(|| format!("utilisateur #{}", self.id))
    }
}
