//! Account maintenance rules.

use opj_capture_core::{AppError, AppResult};

/// Minimum length of a new password.
pub const PASSWORD_MIN_LENGTH: usize = 6;

/// Validated password change request.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordChange {
    current_password: String,
    new_password: String,
}

impl PasswordChange {
    /// Validates the change form: every field filled, confirmation matching,
    /// and the new password at least [`PASSWORD_MIN_LENGTH`] characters.
    pub fn new(
        current_password: impl Into<String>,
        new_password: impl Into<String>,
        confirmation: impl Into<String>,
    ) -> AppResult<Self> {
        let current_password = current_password.into();
        let new_password = new_password.into();
        let confirmation = confirmation.into();

        if current_password.is_empty() || new_password.is_empty() || confirmation.is_empty() {
            return Err(AppError::Validation(
                "current, new and confirmation passwords are required".to_owned(),
            ));
        }

        if new_password != confirmation {
            return Err(AppError::Validation(
                "new password and confirmation do not match".to_owned(),
            ));
        }

        if new_password.chars().count() < PASSWORD_MIN_LENGTH {
            return Err(AppError::Validation(format!(
                "password must be at least {PASSWORD_MIN_LENGTH} characters"
            )));
        }

        Ok(Self {
            current_password,
            new_password,
        })
    }

    /// Returns the current password.
    #[must_use]
    pub fn current_password(&self) -> &str {
        self.current_password.as_str()
    }

    /// Returns the new password.
    #[must_use]
    pub fn new_password(&self) -> &str {
        self.new_password.as_str()
    }
}

impl std::fmt::Debug for PasswordChange {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("PasswordChange(<redacted>)")
    }
}
