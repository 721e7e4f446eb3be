//! Roles, capability flags and the per-role permission table.
//!
//! The table is static data: every [`Role`] maps to exactly one
//! [`PermissionSet`] and nothing mutates it after compilation.

use std::str::FromStr;

use opj_capture_core::AppError;
use serde::{Deserialize, Serialize};

/// Closed set of roles issued by the authentication server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "&'static str")]
pub enum Role {
    /// Field officer ("Officier de Police Judiciaire"), the most restricted role.
    #[default]
    Opj,
    /// Supervisor validating captures and managing infractions.
    Superviseur,
    /// Administrator with every capability.
    Admin,
}

impl Role {
    /// Returns the stable transport value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opj => "ROLE_OPJ",
            Self::Superviseur => "ROLE_SUPERVISEUR",
            Self::Admin => "ROLE_ADMIN",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[Role::Opj, Role::Superviseur, Role::Admin];

        ALL
    }

    /// Converts an untrusted transport value into a role.
    ///
    /// Unrecognized values fall back to [`Role::Opj`], the least privileged
    /// role. Use [`Role::from_str`] where an unknown value must be rejected.
    #[must_use]
    pub fn from_transport(value: &str) -> Self {
        Self::from_str(value).unwrap_or_default()
    }

    /// Returns the permission set granted to this role.
    #[must_use]
    pub fn permissions(self) -> &'static PermissionSet {
        match self {
            Self::Opj => &OPJ_PERMISSIONS,
            Self::Superviseur => &SUPERVISEUR_PERMISSIONS,
            Self::Admin => &ADMIN_PERMISSIONS,
        }
    }

    /// Returns the French display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Opj => "Agent OPJ",
            Self::Superviseur => "Superviseur",
            Self::Admin => "Administrateur",
        }
    }

    /// Returns the Material icon name used next to the label.
    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::Opj => "badge",
            Self::Superviseur => "supervisor-account",
            Self::Admin => "admin-panel-settings",
        }
    }

    /// Returns the label for an optional role, `Utilisateur` when absent.
    #[must_use]
    pub fn label_for(role: Option<Self>) -> &'static str {
        role.map_or("Utilisateur", Self::label)
    }

    /// Returns the icon for an optional role, `person` when absent.
    #[must_use]
    pub fn icon_for(role: Option<Self>) -> &'static str {
        role.map_or("person", Self::icon)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "ROLE_OPJ" | "OPJ" => Ok(Self::Opj),
            "ROLE_SUPERVISEUR" | "SUPERVISEUR" => Ok(Self::Superviseur),
            "ROLE_ADMIN" | "ADMIN" => Ok(Self::Admin),
            _ => Err(AppError::Validation(format!("unknown role value '{value}'"))),
        }
    }
}

impl From<Option<String>> for Role {
    fn from(value: Option<String>) -> Self {
        value
            .as_deref()
            .map(Self::from_transport)
            .unwrap_or_default()
    }
}

impl From<Role> for &'static str {
    fn from(value: Role) -> Self {
        value.as_str()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One named capability flag of a [`PermissionSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    /// See every bandit record.
    CanViewAllBandits,
    /// See bandits the actor registered or is involved with.
    CanViewOwnBandits,
    /// Register a bandit.
    CanCreateBandit,
    /// Edit a bandit.
    CanEditBandit,
    /// Delete a bandit.
    CanDeleteBandit,
    /// See every capture.
    CanViewAllCaptures,
    /// See captures the actor owns.
    CanViewOwnCaptures,
    /// Record a capture.
    CanCreateCapture,
    /// Edit a capture.
    CanEditCapture,
    /// Delete a capture.
    CanDeleteCapture,
    /// Validate or reject a capture.
    CanValidateCapture,
    /// See the infraction catalogue.
    CanViewAllInfractions,
    /// Add an infraction.
    CanCreateInfraction,
    /// Edit an infraction.
    CanEditInfraction,
    /// Delete an infraction.
    CanDeleteInfraction,
    /// Approve or reject an infraction.
    CanValidateInfraction,
    /// Access reports.
    CanViewReports,
    /// Manage user accounts.
    CanManageUsers,
    /// Access application settings.
    CanAccessSettings,
}

impl Capability {
    /// Returns the stable transport name of this capability.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CanViewAllBandits => "canViewAllBandits",
            Self::CanViewOwnBandits => "canViewOwnBandits",
            Self::CanCreateBandit => "canCreateBandit",
            Self::CanEditBandit => "canEditBandit",
            Self::CanDeleteBandit => "canDeleteBandit",
            Self::CanViewAllCaptures => "canViewAllCaptures",
            Self::CanViewOwnCaptures => "canViewOwnCaptures",
            Self::CanCreateCapture => "canCreateCapture",
            Self::CanEditCapture => "canEditCapture",
            Self::CanDeleteCapture => "canDeleteCapture",
            Self::CanValidateCapture => "canValidateCapture",
            Self::CanViewAllInfractions => "canViewAllInfractions",
            Self::CanCreateInfraction => "canCreateInfraction",
            Self::CanEditInfraction => "canEditInfraction",
            Self::CanDeleteInfraction => "canDeleteInfraction",
            Self::CanValidateInfraction => "canValidateInfraction",
            Self::CanViewReports => "canViewReports",
            Self::CanManageUsers => "canManageUsers",
            Self::CanAccessSettings => "canAccessSettings",
        }
    }

    /// Returns all known capabilities in table order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Capability] = &[
            Capability::CanViewAllBandits,
            Capability::CanViewOwnBandits,
            Capability::CanCreateBandit,
            Capability::CanEditBandit,
            Capability::CanDeleteBandit,
            Capability::CanViewAllCaptures,
            Capability::CanViewOwnCaptures,
            Capability::CanCreateCapture,
            Capability::CanEditCapture,
            Capability::CanDeleteCapture,
            Capability::CanValidateCapture,
            Capability::CanViewAllInfractions,
            Capability::CanCreateInfraction,
            Capability::CanEditInfraction,
            Capability::CanDeleteInfraction,
            Capability::CanValidateInfraction,
            Capability::CanViewReports,
            Capability::CanManageUsers,
            Capability::CanAccessSettings,
        ];

        ALL
    }
}

impl FromStr for Capability {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|capability| capability.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown capability value '{value}'")))
    }
}

/// Capability flags granted to one role.
///
/// Flags are independent; no cross-field consistency is implied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSet {
    /// See [`Capability::CanViewAllBandits`].
    pub can_view_all_bandits: bool,
    /// See [`Capability::CanViewOwnBandits`].
    pub can_view_own_bandits: bool,
    /// See [`Capability::CanCreateBandit`].
    pub can_create_bandit: bool,
    /// See [`Capability::CanEditBandit`].
    pub can_edit_bandit: bool,
    /// See [`Capability::CanDeleteBandit`].
    pub can_delete_bandit: bool,
    /// See [`Capability::CanViewAllCaptures`].
    pub can_view_all_captures: bool,
    /// See [`Capability::CanViewOwnCaptures`].
    pub can_view_own_captures: bool,
    /// See [`Capability::CanCreateCapture`].
    pub can_create_capture: bool,
    /// See [`Capability::CanEditCapture`].
    pub can_edit_capture: bool,
    /// See [`Capability::CanDeleteCapture`].
    pub can_delete_capture: bool,
    /// See [`Capability::CanValidateCapture`].
    pub can_validate_capture: bool,
    /// See [`Capability::CanViewAllInfractions`].
    pub can_view_all_infractions: bool,
    /// See [`Capability::CanCreateInfraction`].
    pub can_create_infraction: bool,
    /// See [`Capability::CanEditInfraction`].
    pub can_edit_infraction: bool,
    /// See [`Capability::CanDeleteInfraction`].
    pub can_delete_infraction: bool,
    /// See [`Capability::CanValidateInfraction`].
    pub can_validate_infraction: bool,
    /// See [`Capability::CanViewReports`].
    pub can_view_reports: bool,
    /// See [`Capability::CanManageUsers`].
    pub can_manage_users: bool,
    /// See [`Capability::CanAccessSettings`].
    pub can_access_settings: bool,
}

impl PermissionSet {
    /// Returns whether the flag for `capability` is set.
    #[must_use]
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::CanViewAllBandits => self.can_view_all_bandits,
            Capability::CanViewOwnBandits => self.can_view_own_bandits,
            Capability::CanCreateBandit => self.can_create_bandit,
            Capability::CanEditBandit => self.can_edit_bandit,
            Capability::CanDeleteBandit => self.can_delete_bandit,
            Capability::CanViewAllCaptures => self.can_view_all_captures,
            Capability::CanViewOwnCaptures => self.can_view_own_captures,
            Capability::CanCreateCapture => self.can_create_capture,
            Capability::CanEditCapture => self.can_edit_capture,
            Capability::CanDeleteCapture => self.can_delete_capture,
            Capability::CanValidateCapture => self.can_validate_capture,
            Capability::CanViewAllInfractions => self.can_view_all_infractions,
            Capability::CanCreateInfraction => self.can_create_infraction,
            Capability::CanEditInfraction => self.can_edit_infraction,
            Capability::CanDeleteInfraction => self.can_delete_infraction,
            Capability::CanValidateInfraction => self.can_validate_infraction,
            Capability::CanViewReports => self.can_view_reports,
            Capability::CanManageUsers => self.can_manage_users,
            Capability::CanAccessSettings => self.can_access_settings,
        }
    }

    /// Returns the granted capabilities in table order.
    #[must_use]
    pub fn granted(&self) -> Vec<Capability> {
        Capability::all()
            .iter()
            .copied()
            .filter(|capability| self.allows(*capability))
            .collect()
    }
}

static OPJ_PERMISSIONS: PermissionSet = PermissionSet {
    can_view_all_bandits: false,
    can_view_own_bandits: true,
    can_create_bandit: true,
    can_edit_bandit: true,
    can_delete_bandit: false,
    can_view_all_captures: false,
    can_view_own_captures: true,
    can_create_capture: true,
    can_edit_capture: true,
    can_delete_capture: true,
    can_validate_capture: false,
    can_view_all_infractions: true,
    can_create_infraction: false,
    can_edit_infraction: false,
    can_delete_infraction: false,
    can_validate_infraction: false,
    can_view_reports: false,
    can_manage_users: false,
    can_access_settings: false,
};

static SUPERVISEUR_PERMISSIONS: PermissionSet = PermissionSet {
    can_view_all_bandits: true,
    can_view_own_bandits: true,
    can_create_bandit: true,
    can_edit_bandit: true,
    can_delete_bandit: true,
    can_view_all_captures: true,
    can_view_own_captures: true,
    can_create_capture: true,
    can_edit_capture: true,
    can_delete_capture: true,
    can_validate_capture: true,
    can_view_all_infractions: true,
    can_create_infraction: true,
    can_edit_infraction: true,
    can_delete_infraction: true,
    can_validate_infraction: true,
    can_view_reports: true,
    can_manage_users: false,
    can_access_settings: false,
};

static ADMIN_PERMISSIONS: PermissionSet = PermissionSet {
    can_view_all_bandits: true,
    can_view_own_bandits: true,
    can_create_bandit: true,
    can_edit_bandit: true,
    can_delete_bandit: true,
    can_view_all_captures: true,
    can_view_own_captures: true,
    can_create_capture: true,
    can_edit_capture: true,
    can_delete_capture: true,
    can_validate_capture: true,
    can_view_all_infractions: true,
    can_create_infraction: true,
    can_edit_infraction: true,
    can_delete_infraction: true,
    can_validate_infraction: true,
    can_view_reports: true,
    can_manage_users: true,
    can_access_settings: true,
};
