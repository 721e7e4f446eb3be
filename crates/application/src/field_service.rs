use std::sync::Arc;

use opj_capture_core::{AppError, AppResult};
use opj_capture_domain::{Actor, Bandit, Infraction, PasswordChange};
use tracing::{info, warn};

use crate::{AuthenticatedSession, FieldApiRepository, SessionStore};

mod listing;
mod mutations;

#[cfg(test)]
mod tests;

/// Bandit screen content: visible bandits plus the infraction catalogue used
/// by the bandit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanditListing {
    /// Bandits visible to the actor.
    pub bandits: Vec<Bandit>,
    /// Infractions selectable in the form.
    pub infractions: Vec<Infraction>,
}

/// Dashboard counters as reported by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    /// Number of captures.
    pub capture_count: usize,
    /// Number of validated captures.
    pub validated_capture_count: usize,
    /// Number of bandits.
    pub bandit_count: usize,
}

/// Use-cases behind the field screens.
///
/// Every mutation checks the local action gate first and fails with
/// [`AppError::Forbidden`] without contacting the server when it denies.
#[derive(Clone)]
pub struct FieldService {
    api: Arc<dyn FieldApiRepository>,
    sessions: Arc<dyn SessionStore>,
}

impl FieldService {
    /// Creates a service over an API adapter and a session store.
    #[must_use]
    pub fn new(api: Arc<dyn FieldApiRepository>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { api, sessions }
    }

    /// Authenticates and caches the session.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<Actor> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "email and password are required".to_owned(),
            ));
        }

        let session = self.api.login(email, password).await?;
        self.sessions.save(&session).await?;

        info!(
            actor_id = %session.actor.id(),
            role = %session.actor.role(),
            "session opened"
        );

        Ok(session.actor)
    }

    /// Drops the cached session.
    pub async fn logout(&self) -> AppResult<()> {
        self.sessions.clear().await?;
        info!("session cleared");
        Ok(())
    }

    /// Returns the cached session or [`AppError::Unauthorized`].
    pub async fn current_session(&self) -> AppResult<AuthenticatedSession> {
        self.sessions
            .load()
            .await?
            .ok_or_else(|| AppError::Unauthorized("no active session, log in first".to_owned()))
    }

    /// Returns the authenticated actor.
    pub async fn current_actor(&self) -> AppResult<Actor> {
        Ok(self.current_session().await?.actor)
    }

    /// Changes the current user's password.
    pub async fn change_password(&self, change: &PasswordChange) -> AppResult<()> {
        let session = self.current_session().await?;
        self.api.change_password(&session.token, change).await?;
        info!(actor_id = %session.actor.id(), "password changed");
        Ok(())
    }
}

fn denied(actor: &Actor, action: &str) -> AppError {
    warn!(
        actor_id = %actor.id(),
        role = %actor.role(),
        action,
        "action denied by role policy"
    );

    AppError::Forbidden(format!(
        "role '{}' is not allowed to {action}",
        actor.role().as_str()
    ))
}
